use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trolley_core::ItemId;
use trolley_events::Event;

use crate::command::CommandKind;

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub item_id: ItemId,
    pub previous_quantity: u64,
    pub new_quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OperationUndone.
///
/// Reports which kind of command was reversed rather than synthesizing the
/// inverse event; consumers that mirror cart state should re-read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationUndone {
    pub kind: CommandKind,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityChanged(QuantityChanged),
    ItemRemoved(ItemRemoved),
    OperationUndone(OperationUndone),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item.added",
            CartEvent::QuantityChanged(_) => "cart.item.quantity_changed",
            CartEvent::ItemRemoved(_) => "cart.item.removed",
            CartEvent::OperationUndone(_) => "cart.operation.undone",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::OperationUndone(e) => e.occurred_at,
        }
    }
}
