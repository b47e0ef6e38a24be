use std::collections::HashMap;

use crate::core::{HydrationError, Result};

use super::EntityDescriptor;

/// Read side of entity metadata, the only schema surface the deserializer
/// consumes. Lookups are borrow-only so a provider can be shared across
/// threads.
pub trait MetadataProvider {
    fn descriptor(&self, entity: &str) -> Option<&EntityDescriptor>;

    fn require(&self, entity: &str) -> Result<&EntityDescriptor> {
        self.descriptor(entity)
            .ok_or_else(|| HydrationError::UnknownEntity(entity.to_string()))
    }
}

/// Shipped [`MetadataProvider`]: a name-keyed descriptor map.
///
/// Registering the same entity twice is an error; schema validation beyond
/// that is the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntityDescriptor>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }

    pub fn register(&mut self, descriptor: EntityDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        if self.entities.contains_key(&name) {
            return Err(HydrationError::DuplicateEntity(name));
        }
        self.entities.insert(name, descriptor);
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with_entity(mut self, descriptor: EntityDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn list_entities(&self) -> Vec<&str> {
        self.entities.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl MetadataProvider for SchemaRegistry {
    fn descriptor(&self, entity: &str) -> Option<&EntityDescriptor> {
        self.entities.get(entity)
    }
}
