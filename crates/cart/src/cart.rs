use std::collections::BTreeMap;

use trolley_core::ItemId;

/// The shopping cart: item id mapped to reserved quantity.
///
/// The cart holds no business rules of its own. Mutation happens only through
/// the crate-internal raw operations driven by the command layer; code
/// outside this crate can only read. A line with quantity 0 is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeMap<ItemId, u64>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity reserved for `id`; 0 when absent.
    pub fn quantity(&self, id: &ItemId) -> u64 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate the lines in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u64)> {
        self.items.iter().map(|(id, quantity)| (id, *quantity))
    }

    /// Snapshot of the current lines, in id order.
    pub fn items(&self) -> BTreeMap<ItemId, u64> {
        self.items.clone()
    }

    /// Add `quantity` units to the line, creating it if needed.
    pub(crate) fn add_raw(&mut self, id: &ItemId, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let line = self.items.entry(id.clone()).or_insert(0);
        *line = line.saturating_add(quantity);
    }

    /// Subtract up to `quantity` units; the line disappears at zero.
    pub(crate) fn remove_raw(&mut self, id: &ItemId, quantity: u64) {
        if let Some(line) = self.items.get_mut(id) {
            *line = line.saturating_sub(quantity);
            if *line == 0 {
                self.items.remove(id);
            }
        }
    }

    /// Overwrite the line quantity; 0 removes the line.
    pub(crate) fn set_raw(&mut self, id: &ItemId, quantity: u64) {
        if quantity == 0 {
            self.items.remove(id);
        } else {
            self.items.insert(id.clone(), quantity);
        }
    }
}
