use std::collections::HashMap;

use crate::error::CompareError;
use crate::model::{CatalogEntry, Store};

/// One store's products keyed by name.
///
/// Nameless records are dropped. Iteration follows arrival order, and a
/// repeated name keeps its first position while taking the newer record.
#[derive(Debug, Clone)]
pub struct Catalog {
    store: Store,
    entries: Vec<(String, CatalogEntry)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_entries(store: Store, entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::new(store);
        catalog.extend(entries);
        catalog
    }

    /// Combine several scraped batches (e.g. one per category). Later batches
    /// win on duplicate names.
    pub fn from_batches<I>(store: Store, batches: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = CatalogEntry>,
    {
        let mut catalog = Self::new(store);
        for batch in batches {
            catalog.extend(batch);
        }
        catalog
    }

    /// Parse a JSON array of scraped records.
    pub fn from_json(store: Store, json: &str) -> Result<Self, CompareError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| CompareError::CatalogParse(format!("{store}: {e}")))?;
        Ok(Self::from_entries(store, entries))
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) {
        let mut dropped = 0usize;
        for entry in entries {
            if !self.insert(entry) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::debug!("{}: dropped {dropped} record(s) without a name", self.store);
        }
    }

    /// Insert one record. Returns `false` if it was dropped for lacking a name.
    pub fn insert(&mut self, entry: CatalogEntry) -> bool {
        let name = match entry.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return false,
        };
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, entry));
            }
        }
        true
    }

    pub fn store(&self) -> Store {
        self.store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_nameless_records() {
        let entries = vec![
            CatalogEntry::new("Milk"),
            CatalogEntry::default().with_price("$1.00"),
            CatalogEntry::new("   "),
        ];
        let catalog = Catalog::from_entries(Store::Coles, entries);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("Milk").is_some());
    }

    #[test]
    fn last_duplicate_wins() {
        let entries = vec![
            CatalogEntry::new("Bread").with_price("$3.00 per 1ea"),
            CatalogEntry::new("Eggs").with_price("$6.00 per 12ea"),
            CatalogEntry::new("Bread").with_price("$3.50 per 1ea"),
        ];
        let catalog = Catalog::from_entries(Store::Coles, entries);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Bread").unwrap().price.as_deref(), Some("$3.50 per 1ea"));
    }

    #[test]
    fn arrival_order_iteration() {
        let entries = vec![
            CatalogEntry::new("Zucchini").with_unit_price("$4.00 / 1kg"),
            CatalogEntry::new("Apples").with_unit_price("$5.00 / 1kg"),
            CatalogEntry::new("Zucchini").with_unit_price("$3.50 / 1kg"),
            CatalogEntry::new("Mango"),
        ];
        let catalog = Catalog::from_entries(Store::Woolworths, entries);
        assert_eq!(catalog.names(), vec!["Zucchini", "Apples", "Mango"]);
        let (first, entry) = catalog.iter().next().unwrap();
        assert_eq!(first, "Zucchini");
        assert_eq!(entry.unit_price.as_deref(), Some("$3.50 / 1kg"));
    }

    #[test]
    fn batches_later_wins() {
        let fruit = vec![CatalogEntry::new("Apples").with_unit_price("$4.00 / 1kg")];
        let specials = vec![CatalogEntry::new("Apples").with_unit_price("$3.00 / 1kg")];
        let catalog = Catalog::from_batches(Store::Woolworths, vec![fruit, specials]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("Apples").unwrap().unit_price.as_deref(),
            Some("$3.00 / 1kg")
        );
    }

    #[test]
    fn json_records() {
        let json = r#"[
            {"name": "Carrots", "price": "$2.50 per 1kg", "special": "False"},
            {"name": "Carrots", "price": "$2.00 per 1kg", "special": "True"},
            {"price": "$1.00 per 1kg"},
            {"name": "Bananas", "unitPrice": "$3.90 / 1kg", "price": 3.9}
        ]"#;
        let result = Catalog::from_json(Store::Coles, json);
        // `price` must be a string
        assert!(matches!(result, Err(CompareError::CatalogParse(_))));

        let json = r#"[
            {"name": "Carrots", "price": "$2.50 per 1kg", "special": "False"},
            {"name": "Carrots", "price": "$2.00 per 1kg", "special": "True"},
            {"price": "$1.00 per 1kg"},
            {"name": "Bananas", "unitPrice": "$3.90 / 1kg", "onSpecial": false}
        ]"#;
        let catalog = Catalog::from_json(Store::Coles, json).unwrap();
        assert_eq!(catalog.len(), 2);
        let carrots = catalog.get("Carrots").unwrap();
        assert!(carrots.on_special);
        assert_eq!(carrots.price.as_deref(), Some("$2.00 per 1kg"));
        let bananas = catalog.get("Bananas").unwrap();
        assert!(!bananas.on_special);
        assert_eq!(bananas.unit_price.as_deref(), Some("$3.90 / 1kg"));
    }

    #[test]
    fn json_must_be_array() {
        let err = Catalog::from_json(Store::Woolworths, "{}").unwrap_err();
        assert!(err.to_string().contains("Woolworths"));
    }
}
