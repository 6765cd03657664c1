use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use trolley_catalog::Catalog;
use trolley_core::{DomainError, DomainResult, ItemId, SessionId};
use trolley_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};

use crate::cart::Cart;
use crate::command::CartCommand;
use crate::event::{CartEvent, ItemAdded, ItemRemoved, OperationUndone, QuantityChanged};
use crate::invoker::CommandInvoker;

/// One shopping session: a cart, the catalog backing it, and the undo
/// history.
///
/// The session is the composition root. It owns all state, runs every
/// mutation through the [`CommandInvoker`], and publishes a [`CartEvent`]
/// after each mutation that changed something. Nothing here is global; the
/// catalog is injected at construction.
#[derive(Debug)]
pub struct CartSession {
    id: SessionId,
    catalog: Catalog,
    cart: Cart,
    invoker: CommandInvoker,
    bus: InMemoryEventBus<EventEnvelope<CartEvent>>,
    next_sequence: u64,
}

impl CartSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            id: SessionId::new(),
            catalog,
            cart: Cart::new(),
            invoker: CommandInvoker::new(),
            bus: InMemoryEventBus::new(),
            next_sequence: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Reserve `quantity` units of `item_id` into the cart.
    ///
    /// Zero is rejected up front; "add nothing" is not a command.
    pub fn add(&mut self, item_id: &ItemId, quantity: u64) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        self.invoker.execute(
            &mut self.cart,
            &mut self.catalog,
            CartCommand::add(item_id.clone(), quantity),
        )?;
        debug!(session = %self.id, item = %item_id, quantity, "item added");
        self.publish(CartEvent::ItemAdded(ItemAdded {
            item_id: item_id.clone(),
            quantity,
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Set the cart line for `item_id` to exactly `new_quantity`; 0 clears
    /// the line. Stock moves by the difference.
    pub fn change_quantity(&mut self, item_id: &ItemId, new_quantity: u64) -> DomainResult<()> {
        let previous = self.cart.quantity(item_id);
        self.invoker.execute(
            &mut self.cart,
            &mut self.catalog,
            CartCommand::change_quantity(item_id.clone(), new_quantity),
        )?;
        if new_quantity != previous {
            debug!(
                session = %self.id,
                item = %item_id,
                previous,
                new = new_quantity,
                "quantity changed"
            );
            self.publish(CartEvent::QuantityChanged(QuantityChanged {
                item_id: item_id.clone(),
                previous_quantity: previous,
                new_quantity,
                occurred_at: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Drop the cart line for `item_id`, returning its units to stock.
    /// Removing an absent item succeeds and changes nothing.
    pub fn remove(&mut self, item_id: &ItemId) -> DomainResult<()> {
        let previous = self.cart.quantity(item_id);
        self.invoker.execute(
            &mut self.cart,
            &mut self.catalog,
            CartCommand::remove(item_id.clone()),
        )?;
        if previous > 0 {
            debug!(session = %self.id, item = %item_id, quantity = previous, "item removed");
            self.publish(CartEvent::ItemRemoved(ItemRemoved {
                item_id: item_id.clone(),
                quantity: previous,
                occurred_at: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Undo the most recent operation. `Ok(false)` when there was nothing
    /// to undo.
    pub fn undo_last(&mut self) -> DomainResult<bool> {
        match self.invoker.undo_last(&mut self.cart, &mut self.catalog)? {
            Some(command) => {
                debug!(
                    session = %self.id,
                    kind = %command.kind(),
                    item = %command.item_id(),
                    "operation undone"
                );
                self.publish(CartEvent::OperationUndone(OperationUndone {
                    kind: command.kind(),
                    item_id: command.item_id().clone(),
                    occurred_at: Utc::now(),
                }));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read-only snapshot of the cart lines, in id order.
    pub fn cart(&self) -> BTreeMap<ItemId, u64> {
        self.cart.items()
    }

    /// Read-only view of the backing catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Executed commands, oldest first.
    pub fn history(&self) -> &[CartCommand] {
        self.invoker.history()
    }

    /// Forget the history. Past operations become permanent.
    pub fn clear_history(&mut self) {
        self.invoker.clear();
    }

    /// Cart total in the smallest currency unit.
    pub fn total(&self) -> DomainResult<u64> {
        let mut total: u64 = 0;
        for (item_id, quantity) in self.cart.iter() {
            let entry = self.catalog.entry(item_id).ok_or_else(|| {
                DomainError::invariant(format!("cart line `{item_id}` has no catalog entry"))
            })?;
            let line = entry
                .unit_price()
                .checked_mul(quantity)
                .ok_or_else(|| DomainError::invariant("cart line total overflow"))?;
            total = total
                .checked_add(line)
                .ok_or_else(|| DomainError::invariant("cart total overflow"))?;
        }
        Ok(total)
    }

    /// Subscribe to this session's event stream. Only events published after
    /// the call are delivered.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<CartEvent>> {
        self.bus.subscribe()
    }

    fn publish(&mut self, event: CartEvent) {
        let envelope = EventEnvelope::new(Uuid::now_v7(), self.id, self.next_sequence, event);
        self.next_sequence += 1;
        if let Err(error) = self.bus.publish(envelope) {
            warn!(session = %self.id, ?error, "event publish failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trolley_catalog::CatalogEntry;

    fn item(id: &str) -> ItemId {
        ItemId::new(id).unwrap()
    }

    fn test_catalog() -> Catalog {
        Catalog::seed([
            CatalogEntry::new(item("apple"), "Apple", 500, 100).unwrap(),
            CatalogEntry::new(item("banana"), "Banana", 300, 50).unwrap(),
            CatalogEntry::new(item("orange"), "Orange", 400, 75).unwrap(),
        ])
        .unwrap()
    }

    fn test_session() -> CartSession {
        CartSession::new(test_catalog())
    }

    #[test]
    fn a_new_session_starts_empty() {
        let session = test_session();
        assert!(session.cart().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.total().unwrap(), 0);
    }

    #[test]
    fn add_reserves_stock_and_publishes_an_event() {
        let mut session = test_session();
        let subscription = session.subscribe();

        session.add(&item("apple"), 3).unwrap();

        assert_eq!(session.cart().get(&item("apple")), Some(&3));
        assert_eq!(session.catalog().available(&item("apple")), 97);

        let envelopes = subscription.drain();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].session_id(), session.id());
        assert_eq!(envelopes[0].sequence_number(), 0);
        match envelopes[0].payload() {
            CartEvent::ItemAdded(e) => {
                assert_eq!(e.item_id, item("apple"));
                assert_eq!(e.quantity, 3);
            }
            other => panic!("expected ItemAdded, got {other:?}"),
        }
    }

    #[test]
    fn add_rejects_a_zero_quantity() {
        let mut session = test_session();
        let subscription = session.subscribe();

        let err = session.add(&item("apple"), 0).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(session.history().is_empty());
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn failed_add_changes_nothing_and_publishes_nothing() {
        let mut session = test_session();
        let subscription = session.subscribe();

        let err = session.add(&item("apple"), 1000).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 1000);
                assert_eq!(available, 100);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert!(session.cart().is_empty());
        assert_eq!(session.catalog().available(&item("apple")), 100);
        assert!(session.history().is_empty());
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn change_to_the_same_quantity_enters_history_but_publishes_nothing() {
        let mut session = test_session();
        session.add(&item("banana"), 2).unwrap();
        let subscription = session.subscribe();

        session.change_quantity(&item("banana"), 2).unwrap();

        assert_eq!(session.history().len(), 2);
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn removing_an_absent_item_publishes_nothing() {
        let mut session = test_session();
        let subscription = session.subscribe();

        session.remove(&item("orange")).unwrap();

        assert_eq!(session.history().len(), 1);
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn undo_publishes_operation_undone() {
        let mut session = test_session();
        session.add(&item("apple"), 2).unwrap();
        let subscription = session.subscribe();

        assert!(session.undo_last().unwrap());

        let envelopes = subscription.drain();
        assert_eq!(envelopes.len(), 1);
        match envelopes[0].payload() {
            CartEvent::OperationUndone(e) => {
                assert_eq!(e.item_id, item("apple"));
            }
            other => panic!("expected OperationUndone, got {other:?}"),
        }
    }

    #[test]
    fn undo_on_an_empty_history_returns_false() {
        let mut session = test_session();
        assert!(!session.undo_last().unwrap());
    }

    #[test]
    fn clear_history_makes_operations_permanent() {
        let mut session = test_session();
        session.add(&item("apple"), 5).unwrap();
        session.clear_history();

        assert!(!session.undo_last().unwrap());
        assert_eq!(session.cart().get(&item("apple")), Some(&5));
        assert_eq!(session.catalog().available(&item("apple")), 95);
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let mut session = test_session();
        session.add(&item("apple"), 2).unwrap();
        session.add(&item("banana"), 3).unwrap();

        // 2 * 500 + 3 * 300
        assert_eq!(session.total().unwrap(), 1900);
    }

    #[test]
    fn sequence_numbers_increase_across_operations() {
        let mut session = test_session();
        let subscription = session.subscribe();

        session.add(&item("apple"), 1).unwrap();
        session.add(&item("banana"), 2).unwrap();
        session.undo_last().unwrap();

        let sequences: Vec<u64> = subscription
            .drain()
            .iter()
            .map(|envelope| envelope.sequence_number())
            .collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}
