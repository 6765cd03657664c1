use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use trolley_core::{DomainError, DomainResult, ItemId};

/// One priced, stock-counted catalog line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    id: ItemId,
    name: String,
    /// Unit price in the smallest currency unit (cents).
    unit_price: u64,
    stock: u64,
}

impl CatalogEntry {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        unit_price: u64,
        stock: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("entry name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            unit_price,
            stock,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }
}

/// Inventory-backed product catalog.
///
/// Owns the per-item stock counters. After seeding, stock moves only through
/// [`Catalog::reduce_stock`] and [`Catalog::increase_stock`]; both check and
/// mutate as a single operation and report failure as `false`, in which case
/// nothing was mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<ItemId, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from seed entries. Duplicate ids are a conflict.
    pub fn seed(entries: impl IntoIterator<Item = CatalogEntry>) -> DomainResult<Self> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) -> DomainResult<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(DomainError::conflict(format!(
                "duplicate catalog id `{}`",
                entry.id
            )));
        }
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn entry(&self, id: &ItemId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// All entries in id order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current stock for `id`. Unknown ids report 0.
    pub fn available(&self, id: &ItemId) -> u64 {
        self.entries.get(id).map_or(0, |entry| entry.stock)
    }

    /// True iff the item exists and at least `quantity` units are on hand.
    pub fn is_in_stock(&self, id: &ItemId, quantity: u64) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.stock >= quantity)
    }

    /// Take `quantity` units out of stock.
    ///
    /// `false` (nothing mutated) when the item is unknown or holds fewer than
    /// `quantity` units. The check and the subtraction are one operation.
    #[must_use]
    pub fn reduce_stock(&mut self, id: &ItemId, quantity: u64) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        match entry.stock.checked_sub(quantity) {
            Some(remaining) => {
                entry.stock = remaining;
                true
            }
            None => false,
        }
    }

    /// Return `quantity` units to stock.
    ///
    /// `false` (nothing mutated) when the item is unknown or the counter
    /// would overflow.
    #[must_use]
    pub fn increase_stock(&mut self, id: &ItemId, quantity: u64) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        match entry.stock.checked_add(quantity) {
            Some(total) => {
                entry.stock = total;
                true
            }
            None => false,
        }
    }
}
