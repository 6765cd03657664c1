use serde::{Deserialize, Serialize};

use trolley_catalog::Catalog;
use trolley_core::{DomainError, DomainResult, ItemId};

use crate::cart::Cart;

/// Command: AddItem. Reverses by removing the same quantity and returning it
/// to stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item_id: ItemId,
    pub quantity: u64,
}

/// Command: ChangeQuantity.
///
/// Stock moves by the difference between the old and new reserved quantity,
/// not by remove-then-re-add. `previous_quantity` stays `None` until
/// `execute` captures the line quantity it replaced; undo restores that
/// capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQuantity {
    pub item_id: ItemId,
    pub new_quantity: u64,
    pub previous_quantity: Option<u64>,
}

/// Command: RemoveItem.
///
/// `previous_quantity` is captured at `execute` time; `Some(0)` means the
/// line was already absent and there is nothing to reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub item_id: ItemId,
    pub previous_quantity: Option<u64>,
}

/// Discriminant of a [`CartCommand`], for history inspection and event
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    AddItem,
    ChangeQuantity,
    RemoveItem,
}

impl core::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            CommandKind::AddItem => "add_item",
            CommandKind::ChangeQuantity => "change_quantity",
            CommandKind::RemoveItem => "remove_item",
        };
        f.write_str(name)
    }
}

/// Every cart mutation, as a value.
///
/// The enum is closed on purpose: dispatch is a `match`, and the compiler
/// proves every variant has both an `execute` and an `undo` arm. Commands
/// are plain data; the state they act on is borrowed per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    ChangeQuantity(ChangeQuantity),
    RemoveItem(RemoveItem),
}

impl CartCommand {
    /// Reserve `quantity` more units of `item_id`.
    pub fn add(item_id: ItemId, quantity: u64) -> Self {
        Self::AddItem(AddItem { item_id, quantity })
    }

    /// Set the line for `item_id` to exactly `new_quantity` (0 clears it).
    pub fn change_quantity(item_id: ItemId, new_quantity: u64) -> Self {
        Self::ChangeQuantity(ChangeQuantity {
            item_id,
            new_quantity,
            previous_quantity: None,
        })
    }

    /// Drop the line for `item_id` and return its units to stock.
    pub fn remove(item_id: ItemId) -> Self {
        Self::RemoveItem(RemoveItem {
            item_id,
            previous_quantity: None,
        })
    }

    pub fn item_id(&self) -> &ItemId {
        match self {
            CartCommand::AddItem(cmd) => &cmd.item_id,
            CartCommand::ChangeQuantity(cmd) => &cmd.item_id,
            CartCommand::RemoveItem(cmd) => &cmd.item_id,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            CartCommand::AddItem(_) => CommandKind::AddItem,
            CartCommand::ChangeQuantity(_) => CommandKind::ChangeQuantity,
            CartCommand::RemoveItem(_) => CommandKind::RemoveItem,
        }
    }

    /// Apply the command to the session state.
    ///
    /// The catalog side runs first because it is the only step that can
    /// fail; the cart mutation cannot. An `Err` therefore means neither
    /// catalog nor cart was touched. On `Ok` the command has captured
    /// whatever it needs to reverse itself.
    pub fn execute(&mut self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        match self {
            CartCommand::AddItem(cmd) => cmd.execute(cart, catalog),
            CartCommand::ChangeQuantity(cmd) => cmd.execute(cart, catalog),
            CartCommand::RemoveItem(cmd) => cmd.execute(cart, catalog),
        }
    }

    /// Reverse a previously executed command.
    ///
    /// Undo follows the same ordering rule as `execute`, so a failed undo
    /// also leaves both sides untouched. Undoing a command that never ran
    /// is an invariant violation.
    pub fn undo(&self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        match self {
            CartCommand::AddItem(cmd) => cmd.undo(cart, catalog),
            CartCommand::ChangeQuantity(cmd) => cmd.undo(cart, catalog),
            CartCommand::RemoveItem(cmd) => cmd.undo(cart, catalog),
        }
    }
}

fn insufficient(catalog: &Catalog, item_id: &ItemId, requested: u64) -> DomainError {
    DomainError::insufficient_stock(item_id.clone(), requested, catalog.available(item_id))
}

fn return_failed(item_id: &ItemId, quantity: u64) -> DomainError {
    DomainError::invariant(format!(
        "could not return {quantity} units of `{item_id}` to stock"
    ))
}

impl AddItem {
    fn execute(&mut self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        if !catalog.reduce_stock(&self.item_id, self.quantity) {
            return Err(insufficient(catalog, &self.item_id, self.quantity));
        }
        cart.add_raw(&self.item_id, self.quantity);
        Ok(())
    }

    fn undo(&self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        if !catalog.increase_stock(&self.item_id, self.quantity) {
            return Err(return_failed(&self.item_id, self.quantity));
        }
        cart.remove_raw(&self.item_id, self.quantity);
        Ok(())
    }
}

impl ChangeQuantity {
    fn execute(&mut self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        let previous = cart.quantity(&self.item_id);

        if self.new_quantity > previous {
            let extra = self.new_quantity - previous;
            if !catalog.reduce_stock(&self.item_id, extra) {
                return Err(insufficient(catalog, &self.item_id, extra));
            }
        } else if self.new_quantity < previous {
            let returned = previous - self.new_quantity;
            if !catalog.increase_stock(&self.item_id, returned) {
                return Err(return_failed(&self.item_id, returned));
            }
        }
        // Equal quantities move no stock but the command still succeeds.

        cart.set_raw(&self.item_id, self.new_quantity);
        self.previous_quantity = Some(previous);
        Ok(())
    }

    fn undo(&self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        let Some(previous) = self.previous_quantity else {
            return Err(DomainError::invariant(
                "cannot undo a change_quantity command that never executed",
            ));
        };

        if previous > self.new_quantity {
            let reclaimed = previous - self.new_quantity;
            if !catalog.reduce_stock(&self.item_id, reclaimed) {
                return Err(insufficient(catalog, &self.item_id, reclaimed));
            }
        } else if previous < self.new_quantity {
            let returned = self.new_quantity - previous;
            if !catalog.increase_stock(&self.item_id, returned) {
                return Err(return_failed(&self.item_id, returned));
            }
        }

        cart.set_raw(&self.item_id, previous);
        Ok(())
    }
}

impl RemoveItem {
    fn execute(&mut self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        let previous = cart.quantity(&self.item_id);
        if previous > 0 {
            if !catalog.increase_stock(&self.item_id, previous) {
                return Err(return_failed(&self.item_id, previous));
            }
            cart.remove_raw(&self.item_id, previous);
        }
        self.previous_quantity = Some(previous);
        Ok(())
    }

    fn undo(&self, cart: &mut Cart, catalog: &mut Catalog) -> DomainResult<()> {
        let Some(previous) = self.previous_quantity else {
            return Err(DomainError::invariant(
                "cannot undo a remove_item command that never executed",
            ));
        };
        if previous == 0 {
            return Ok(());
        }
        if !catalog.reduce_stock(&self.item_id, previous) {
            return Err(insufficient(catalog, &self.item_id, previous));
        }
        cart.add_raw(&self.item_id, previous);
        Ok(())
    }
}
