//! Black-box scenarios driven only through the public `CartSession` API.

use trolley_cart::{CartEvent, CartSession, CommandKind};
use trolley_catalog::{Catalog, CatalogEntry};
use trolley_core::{DomainError, ItemId};

fn item(id: &str) -> ItemId {
    ItemId::new(id).unwrap()
}

fn seeded_catalog() -> Catalog {
    Catalog::seed([
        CatalogEntry::new(item("apple"), "Apple", 500, 100).unwrap(),
        CatalogEntry::new(item("banana"), "Banana", 300, 50).unwrap(),
        CatalogEntry::new(item("orange"), "Orange", 400, 75).unwrap(),
    ])
    .unwrap()
}

fn seeded_session() -> CartSession {
    CartSession::new(seeded_catalog())
}

#[test]
fn adding_an_item_reserves_its_stock() {
    let mut session = seeded_session();

    session.add(&item("apple"), 3).unwrap();

    assert_eq!(session.cart().get(&item("apple")), Some(&3));
    assert_eq!(session.catalog().available(&item("apple")), 97);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn changing_a_quantity_moves_stock_by_the_difference() {
    let mut session = seeded_session();

    session.add(&item("banana"), 2).unwrap();
    session.change_quantity(&item("banana"), 5).unwrap();

    assert_eq!(session.cart().get(&item("banana")), Some(&5));
    assert_eq!(session.catalog().available(&item("banana")), 45);
}

#[test]
fn removing_an_item_restores_the_seeded_stock() {
    let mut session = seeded_session();

    session.add(&item("orange"), 4).unwrap();
    session.remove(&item("orange")).unwrap();

    assert!(!session.cart().contains_key(&item("orange")));
    assert_eq!(session.catalog().available(&item("orange")), 75);
}

#[test]
fn undoing_an_add_erases_it_completely() {
    let mut session = seeded_session();

    session.add(&item("apple"), 2).unwrap();
    assert!(session.undo_last().unwrap());

    assert!(!session.cart().contains_key(&item("apple")));
    assert_eq!(session.catalog().available(&item("apple")), 100);
    assert!(session.history().is_empty());
}

#[test]
fn undo_walks_back_in_lifo_order() {
    let mut session = seeded_session();

    session.add(&item("apple"), 1).unwrap();
    session.add(&item("banana"), 2).unwrap();
    session.change_quantity(&item("banana"), 5).unwrap();

    assert!(session.undo_last().unwrap());
    assert!(session.undo_last().unwrap());

    let cart = session.cart();
    assert_eq!(cart.get(&item("apple")), Some(&1));
    assert!(!cart.contains_key(&item("banana")));
    assert_eq!(session.catalog().available(&item("banana")), 50);
    assert_eq!(session.catalog().available(&item("apple")), 99);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn an_oversized_add_fails_atomically() {
    let mut session = seeded_session();
    session.add(&item("banana"), 2).unwrap();
    let cart_before = session.cart();
    let history_before = session.history().len();

    let err = session.add(&item("apple"), 1000).unwrap_err();

    match err {
        DomainError::InsufficientStock {
            item_id,
            requested,
            available,
        } => {
            assert_eq!(item_id, item("apple"));
            assert_eq!(requested, 1000);
            assert_eq!(available, 100);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(session.cart(), cart_before);
    assert_eq!(session.catalog().available(&item("apple")), 100);
    assert_eq!(session.history().len(), history_before);

    // The session keeps working after a refused command.
    session.add(&item("apple"), 1).unwrap();
    assert_eq!(session.catalog().available(&item("apple")), 99);
}

#[test]
fn a_full_session_emits_the_expected_event_stream() {
    let mut session = seeded_session();
    let subscription = session.subscribe();

    session.add(&item("apple"), 2).unwrap();
    session.add(&item("banana"), 3).unwrap();
    session.change_quantity(&item("banana"), 5).unwrap();
    session.remove(&item("apple")).unwrap();
    session.undo_last().unwrap();

    let envelopes = subscription.drain();
    let kinds: Vec<&'static str> = envelopes
        .iter()
        .map(|envelope| match envelope.payload() {
            CartEvent::ItemAdded(_) => "added",
            CartEvent::QuantityChanged(_) => "changed",
            CartEvent::ItemRemoved(_) => "removed",
            CartEvent::OperationUndone(_) => "undone",
        })
        .collect();
    assert_eq!(kinds, vec!["added", "added", "changed", "removed", "undone"]);

    for (expected, envelope) in envelopes.iter().enumerate() {
        assert_eq!(envelope.sequence_number(), expected as u64);
        assert_eq!(envelope.session_id(), session.id());
    }

    match envelopes[4].payload() {
        CartEvent::OperationUndone(e) => {
            assert_eq!(e.kind, CommandKind::RemoveItem);
            assert_eq!(e.item_id, item("apple"));
        }
        other => panic!("expected OperationUndone, got {other:?}"),
    }
}

#[test]
fn conservation_holds_across_a_mixed_session() {
    let mut session = seeded_session();

    session.add(&item("apple"), 10).unwrap();
    session.add(&item("banana"), 5).unwrap();
    session.change_quantity(&item("apple"), 3).unwrap();
    session.remove(&item("banana")).unwrap();
    session.undo_last().unwrap();
    session.change_quantity(&item("banana"), 1).unwrap();

    for (id, seeded) in [(item("apple"), 100), (item("banana"), 50), (item("orange"), 75)] {
        let reserved = session.cart().get(&id).copied().unwrap_or(0);
        assert_eq!(reserved + session.catalog().available(&id), seeded);
    }
}
