use trolley_catalog::Catalog;
use trolley_core::DomainResult;

use crate::cart::Cart;
use crate::command::CartCommand;

/// Executes commands and keeps the LIFO undo history.
///
/// Only commands whose `execute` succeeded enter the history, so every entry
/// is reversible. Undo is one-shot: a popped command is handed back to the
/// caller and never re-pushed (there is no redo stack).
#[derive(Debug, Default)]
pub struct CommandInvoker {
    history: Vec<CartCommand>,
}

impl CommandInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `command` against the given state and record it on success.
    ///
    /// On `Err` nothing is recorded and, per the command contract, nothing
    /// was mutated.
    pub fn execute(
        &mut self,
        cart: &mut Cart,
        catalog: &mut Catalog,
        mut command: CartCommand,
    ) -> DomainResult<()> {
        command.execute(cart, catalog)?;
        self.history.push(command);
        Ok(())
    }

    /// Undo the most recent command and return it; `Ok(None)` when the
    /// history is empty.
    ///
    /// A failing undo propagates its error; the popped command is dropped
    /// either way.
    pub fn undo_last(
        &mut self,
        cart: &mut Cart,
        catalog: &mut Catalog,
    ) -> DomainResult<Option<CartCommand>> {
        let Some(command) = self.history.pop() else {
            return Ok(None);
        };
        command.undo(cart, catalog)?;
        Ok(Some(command))
    }

    /// Forget the history without undoing anything.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// The executed commands, oldest first.
    pub fn history(&self) -> &[CartCommand] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
