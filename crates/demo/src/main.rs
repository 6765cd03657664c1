//! Console walkthrough of one reversible cart session.
//!
//! Seeds a small catalog, runs a series of cart operations, walks them back
//! with undo, and finally shows a refused oversized reservation. Every state
//! change and published event is logged.

use anyhow::{Context, Result};

use trolley_cart::CartSession;
use trolley_catalog::{Catalog, CatalogEntry};
use trolley_core::ItemId;
use trolley_events::Event;

fn main() -> Result<()> {
    trolley_observability::init();

    let apple = ItemId::new("apple")?;
    let banana = ItemId::new("banana")?;
    let orange = ItemId::new("orange")?;

    let catalog = Catalog::seed([
        CatalogEntry::new(apple.clone(), "Apple", 500, 100)?,
        CatalogEntry::new(banana.clone(), "Banana", 300, 50)?,
        CatalogEntry::new(orange.clone(), "Orange", 400, 75)?,
    ])
    .context("seeding the catalog")?;

    let mut session = CartSession::new(catalog);
    let subscription = session.subscribe();

    tracing::info!(session = %session.id(), "cart session started");

    session.add(&apple, 2).context("adding apples")?;
    log_cart(&session)?;

    session.add(&banana, 3).context("adding bananas")?;
    log_cart(&session)?;

    session
        .change_quantity(&banana, 5)
        .context("changing banana quantity")?;
    log_cart(&session)?;

    session.remove(&apple).context("removing apples")?;
    log_cart(&session)?;

    // Walk the last three operations back: the remove, the quantity change,
    // and the banana add.
    for _ in 0..3 {
        session.undo_last().context("undoing")?;
        log_cart(&session)?;
    }

    // An oversized reservation is refused; nothing changes.
    match session.add(&apple, 1000) {
        Err(error) => tracing::warn!(%error, "reservation refused"),
        Ok(()) => anyhow::bail!("an oversized add unexpectedly succeeded"),
    }
    log_cart(&session)?;

    let total = session.total().context("totalling the cart")?;
    tracing::info!(total_cents = total, history = session.history().len(), "session finished");

    for envelope in subscription.drain() {
        tracing::info!(
            event = envelope.payload().event_type(),
            sequence = envelope.sequence_number(),
            "published"
        );
    }

    Ok(())
}

fn log_cart(session: &CartSession) -> Result<()> {
    let snapshot = serde_json::to_string(&session.cart())?;
    tracing::info!(cart = %snapshot, "cart state");
    Ok(())
}
