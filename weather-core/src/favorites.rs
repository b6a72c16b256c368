use anyhow::Context;
use std::sync::Arc;

use crate::{
    error::FavoritesError,
    storage::{FAVORITES_KEY, KeyValueStore},
};

/// Ordered list of favorite city names, mirrored to storage on every mutation.
///
/// Order is insertion order and is meaningful: refreshed weather is aligned
/// with it by index.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    cities: Vec<String>,
    storage: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    /// Read the persisted list. A missing entry yields an empty list.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let cities = match storage.get(FAVORITES_KEY)? {
            Some(json) => serde_json::from_str::<Vec<String>>(&json)
                .context("Stored favorites are not a list of city names")?,
            None => Vec::new(),
        };

        tracing::debug!(count = cities.len(), "loaded favorites");
        Ok(Self { cities, storage })
    }

    /// Empty store that will overwrite whatever is persisted on first mutation.
    pub fn empty(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { cities: Vec::new(), storage }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    /// Append `city` unless it is blank or already present (exact match).
    pub fn add(&mut self, city: &str) -> Result<&[String], FavoritesError> {
        if city.trim().is_empty() || self.contains(city) {
            return Ok(&self.cities);
        }

        let mut updated = self.cities.clone();
        updated.push(city.to_string());
        self.commit(updated)
    }

    pub fn remove(&mut self, index: usize) -> Result<&[String], FavoritesError> {
        self.check_index(index)?;

        let mut updated = self.cities.clone();
        updated.remove(index);
        self.commit(updated)
    }

    /// Replace the name at `index`. Duplicates are allowed here.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<&[String], FavoritesError> {
        self.check_index(index)?;

        let mut updated = self.cities.clone();
        updated[index] = new_name.to_string();
        self.commit(updated)
    }

    fn check_index(&self, index: usize) -> Result<(), FavoritesError> {
        if index < self.cities.len() {
            Ok(())
        } else {
            Err(FavoritesError::IndexOutOfRange { index, len: self.cities.len() })
        }
    }

    /// Persist first, then swap in: a failed write leaves memory untouched.
    fn commit(&mut self, updated: Vec<String>) -> Result<&[String], FavoritesError> {
        let json = serde_json::to_string(&updated).context("Failed to serialize favorites")?;
        self.storage.set(FAVORITES_KEY, &json)?;

        self.cities = updated;
        Ok(&self.cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_with(cities: &[&str]) -> (Arc<MemoryStore>, FavoritesStore) {
        let storage = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::empty(storage.clone());
        for city in cities {
            favorites.add(city).unwrap();
        }
        (storage, favorites)
    }

    #[test]
    fn load_without_entry_is_empty() {
        let favorites = FavoritesStore::load(Arc::new(MemoryStore::new())).unwrap();
        assert!(favorites.is_empty());
    }

    #[test]
    fn load_rejects_non_list_payload() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(FAVORITES_KEY, "{\"city\": 1}").unwrap();

        let err = FavoritesStore::load(storage).unwrap_err();
        assert!(err.to_string().contains("not a list"));
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let (storage, favorites) = store_with(&["Paris", "Rome", "Oslo"]);

        assert_eq!(favorites.cities(), ["Paris", "Rome", "Oslo"]);
        assert_eq!(
            storage.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["Paris","Rome","Oslo"]"#)
        );
    }

    #[test]
    fn add_is_idempotent() {
        let (_, mut favorites) = store_with(&["Paris"]);

        favorites.add("Paris").unwrap();
        favorites.add("Paris").unwrap();

        assert_eq!(favorites.cities(), ["Paris"]);
    }

    #[test]
    fn add_membership_is_case_sensitive() {
        let (_, mut favorites) = store_with(&["Paris"]);

        favorites.add("paris").unwrap();

        assert_eq!(favorites.cities(), ["Paris", "paris"]);
    }

    #[test]
    fn add_ignores_blank_city() {
        let (storage, mut favorites) = store_with(&[]);

        favorites.add("").unwrap();
        favorites.add("   ").unwrap();

        assert!(favorites.is_empty());
        assert_eq!(storage.get(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let (storage, mut favorites) = store_with(&["A", "B", "C", "D"]);

        favorites.remove(1).unwrap();

        assert_eq!(favorites.cities(), ["A", "C", "D"]);
        let reloaded = FavoritesStore::load(storage).unwrap();
        assert_eq!(reloaded.cities(), ["A", "C", "D"]);
    }

    #[test]
    fn remove_out_of_range_is_rejected_without_mutation() {
        let (storage, mut favorites) = store_with(&["A", "B"]);

        let err = favorites.remove(2).unwrap_err();

        assert!(matches!(err, FavoritesError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(favorites.cities(), ["A", "B"]);
        assert_eq!(FavoritesStore::load(storage).unwrap().cities(), ["A", "B"]);
    }

    #[test]
    fn rename_roundtrips_through_storage() {
        let (storage, mut favorites) = store_with(&["A", "B", "C"]);

        favorites.rename(1, "X").unwrap();

        let reloaded = FavoritesStore::load(storage).unwrap();
        assert_eq!(reloaded.cities(), ["A", "X", "C"]);
    }

    #[test]
    fn rename_may_create_duplicates() {
        let (_, mut favorites) = store_with(&["A", "B"]);

        favorites.rename(1, "A").unwrap();

        assert_eq!(favorites.cities(), ["A", "A"]);
    }

    #[test]
    fn rename_out_of_range_is_rejected() {
        let (_, mut favorites) = store_with(&[]);
        assert!(favorites.rename(0, "X").is_err());
    }
}
