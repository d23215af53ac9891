//! Explicitly-owned descriptor registry.
//!
//! The registry is constructed once (normally by the content loaders),
//! then passed by reference to whoever needs descriptor lookups. There is
//! no ambient global registry anywhere in the engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::descriptor::{DescriptorId, ValueDescriptor};
use super::ValueError;

/// Id-keyed collection of [`ValueDescriptor`]s.
///
/// Uses a `BTreeMap` so iteration order is stable for deterministic
/// validation output and tests.
#[derive(Clone, Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: BTreeMap<DescriptorId, Arc<ValueDescriptor>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor. Duplicate ids are rejected.
    pub fn register(&mut self, descriptor: ValueDescriptor) -> Result<(), ValueError> {
        let id = descriptor.id();
        if self.descriptors.contains_key(&id) {
            return Err(ValueError::DuplicateDescriptor(id));
        }
        self.descriptors.insert(id, Arc::new(descriptor));
        Ok(())
    }

    /// Looks up a descriptor by id. Absence is not an error.
    pub fn get(&self, id: DescriptorId) -> Option<&Arc<ValueDescriptor>> {
        self.descriptors.get(&id)
    }

    /// Looks up a descriptor by display name.
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<ValueDescriptor>> {
        self.descriptors
            .values()
            .find(|d| d.display_name() == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates descriptors in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ValueDescriptor>> {
        self.descriptors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{NumericKind, ValueKind};

    fn descriptor(id: u32, name: &str) -> ValueDescriptor {
        ValueDescriptor::new(
            DescriptorId(id),
            name,
            name,
            NumericKind::Integer,
            ValueKind::Absolute,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = DescriptorRegistry::new();
        registry.register(descriptor(1, "Health")).unwrap();
        assert!(matches!(
            registry.register(descriptor(1, "Mana")),
            Err(ValueError::DuplicateDescriptor(DescriptorId(1)))
        ));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let registry = DescriptorRegistry::new();
        assert!(registry.get(DescriptorId(42)).is_none());
        assert!(registry.get_by_name("nothing").is_none());
    }
}
