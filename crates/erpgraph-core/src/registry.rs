//! Model registry.
//!
//! The registry enumerates every entity definition known to the process.
//! Definitions without a backing table (mixins, abstract bases) may be
//! registered so that the registry mirrors the full model module, but they
//! are never returned from lookups.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::entity::EntityDefinition;
use crate::error::{CoreError, Result};

/// Registry of entity definitions, keyed by entity name in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entities: IndexMap<String, Arc<EntityDefinition>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = EntityDefinition>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Registers a definition.
    ///
    /// Persisted definitions are validated; abstract ones are stored as-is.
    pub fn register(&mut self, definition: EntityDefinition) -> Result<()> {
        if self.entities.contains_key(&definition.name) {
            return Err(CoreError::DuplicateEntity(definition.name));
        }
        if definition.is_persisted() {
            definition.validate()?;
        }

        trace!(
            entity = %definition.name,
            persisted = definition.is_persisted(),
            fields = definition.fields.len(),
            "Registering entity definition"
        );
        self.entities
            .insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }

    /// Every persisted entity, keyed by name, in registration order.
    pub fn list_entities(&self) -> IndexMap<String, Arc<EntityDefinition>> {
        let entities: IndexMap<_, _> = self
            .entities
            .iter()
            .filter(|(_, def)| def.is_persisted())
            .map(|(name, def)| (name.clone(), Arc::clone(def)))
            .collect();
        debug!(count = entities.len(), "Listing persisted entities");
        entities
    }

    /// Looks up a persisted entity by name.
    pub fn get(&self, name: &str) -> Option<&Arc<EntityDefinition>> {
        self.entities.get(name).filter(|def| def.is_persisted())
    }

    /// Number of persisted entities.
    pub fn len(&self) -> usize {
        self.entities.values().filter(|def| def.is_persisted()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnType, FieldDefinition};

    fn entity(name: &str) -> EntityDefinition {
        EntityDefinition::new(name, format!("{}s", name.to_lowercase()))
            .field(FieldDefinition::identifier("id"))
            .field(FieldDefinition::new("name", ColumnType::Text))
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list_entities().is_empty());
    }

    #[test]
    fn test_list_entities_skips_abstract_bases() {
        let registry = ModelRegistry::from_definitions([
            entity("User"),
            EntityDefinition::abstract_base("TimestampMixin")
                .field(FieldDefinition::new("created_at", ColumnType::Text)),
            entity("Product"),
        ])
        .unwrap();

        let names: Vec<String> = registry.list_entities().keys().cloned().collect();
        assert_eq!(names, vec!["User", "Product"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("TimestampMixin").is_none());
        assert!(registry.get("User").is_some());
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut registry = ModelRegistry::new();
        registry.register(entity("User")).unwrap();
        assert!(matches!(
            registry.register(entity("User")),
            Err(CoreError::DuplicateEntity(name)) if name == "User"
        ));
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let mut registry = ModelRegistry::new();
        let no_id = EntityDefinition::new("Broken", "broken")
            .field(FieldDefinition::new("name", ColumnType::Text));
        assert!(registry.register(no_id).is_err());
        assert!(registry.is_empty());
    }
}
