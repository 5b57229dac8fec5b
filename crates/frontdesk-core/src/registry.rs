//! Ordered entity registries
//!
//! Both tables on the board keep insertion order; lookups are linear, which
//! is fine for a reception roster.

use frontdesk_api::EntityRef;
use frontdesk_util::{DeliveryId, StaffId};

use crate::{CoreError, CoreResult, Delivery, Staff};

/// An entity stored in a [`Registry`]
pub trait Keyed {
    type Key: Copy + Eq;

    fn key(&self) -> Self::Key;

    /// Reference used in selection and `NotFound` errors
    fn entity_ref(key: Self::Key) -> EntityRef;
}

impl Keyed for Staff {
    type Key = StaffId;

    fn key(&self) -> StaffId {
        self.id
    }

    fn entity_ref(key: StaffId) -> EntityRef {
        EntityRef::Staff(key)
    }
}

impl Keyed for Delivery {
    type Key = DeliveryId;

    fn key(&self) -> DeliveryId {
        self.id
    }

    fn entity_ref(key: DeliveryId) -> EntityRef {
        EntityRef::Delivery(key)
    }
}

/// Ordered collection of entities
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
}

/// Staff roster in board order
pub type StaffRegistry = Registry<Staff>;

/// Transport table in scheduling order
pub type DeliveryRegistry = Registry<Delivery>;

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity and return its key
    pub fn add(&mut self, item: T) -> T::Key {
        let key = item.key();
        self.items.push(item);
        key
    }

    /// Remove by key, preserving the order of the rest
    pub fn remove(&mut self, key: T::Key) -> CoreResult<T> {
        let index = self
            .position(key)
            .ok_or_else(|| CoreError::NotFound(T::entity_ref(key)))?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.position(key).is_some()
    }

    fn position(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the whole contents, e.g. on a roster refresh
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Take every entity out, leaving the registry empty
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_api::RosterRecord;

    fn staff(first: &str) -> Staff {
        Staff::from_record(RosterRecord {
            first_name: first.into(),
            last_name: "Lee".into(),
            photo_ref: String::new(),
            email: format!("{}@example.org", first.to_lowercase()),
        })
    }

    #[test]
    fn keeps_insertion_order() {
        let mut registry = StaffRegistry::new();
        registry.add(staff("Ann"));
        let bo = registry.add(staff("Bo"));
        registry.add(staff("Cy"));

        registry.remove(bo).unwrap();

        let names: Vec<_> = registry.iter().map(|s| s.first_name.as_str()).collect();
        assert_eq!(names, ["Ann", "Cy"]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut registry = StaffRegistry::new();
        let missing = StaffId::new();

        assert_eq!(
            registry.remove(missing).unwrap_err(),
            CoreError::NotFound(EntityRef::Staff(missing))
        );
    }

    #[test]
    fn lookup_by_key() {
        let mut registry = StaffRegistry::new();
        let ann = registry.add(staff("Ann"));

        assert!(registry.contains(ann));
        assert_eq!(registry.get(ann).unwrap().first_name, "Ann");
        registry.get_mut(ann).unwrap().photo_ref = "ann.jpg".into();
        assert_eq!(registry.get(ann).unwrap().photo_ref, "ann.jpg");
        assert_eq!(registry.len(), 1);
    }
}
