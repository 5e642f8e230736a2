use std::collections::HashMap;

use tracing::debug;

use super::ServiceHandler;

/// Errors raised while assembling a [`ServiceRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceRegistryError {
    #[error("Service already registered for entity {0}")]
    Duplicate(String),
}

/// Immutable mapping from entity name to its service handler.
///
/// Built once at startup and shared by `Arc`. Entities without a handler are
/// served by the generic persistence path.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    handlers: HashMap<String, ServiceHandler>,
}

impl ServiceRegistry {
    /// A registry without any handler.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// Returns the handler registered for `entity`, if any.
    pub fn lookup(&self, entity: &str) -> Option<&ServiceHandler> {
        let handler = self.handlers.get(entity);
        debug!(
            entity,
            found = handler.is_some(),
            "Service registry lookup"
        );
        handler
    }

    /// Entity names with a registered handler, sorted.
    pub fn entities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Builder for [`ServiceRegistry`].
#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    handlers: Vec<(String, ServiceHandler)>,
}

impl ServiceRegistryBuilder {
    /// Registers a handler for an entity.
    #[must_use]
    pub fn register(mut self, entity: impl Into<String>, handler: ServiceHandler) -> Self {
        self.handlers.push((entity.into(), handler));
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity was registered twice.
    pub fn build(self) -> Result<ServiceRegistry, ServiceRegistryError> {
        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (entity, handler) in self.handlers {
            if handlers.contains_key(&entity) {
                return Err(ServiceRegistryError::Duplicate(entity));
            }
            debug!(entity = %entity, operations = ?handler.operations(), "Registered service");
            handlers.insert(entity, handler);
        }
        Ok(ServiceRegistry { handlers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_absent_is_none() {
        let registry = ServiceRegistry::empty();
        assert!(registry.lookup("Product").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builder_registers_handlers() {
        let registry = ServiceRegistry::builder()
            .register("User", ServiceHandler::new())
            .register("Product", ServiceHandler::new())
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.entities(), vec!["Product", "User"]);
        assert!(registry.lookup("User").is_some());
        assert!(registry.lookup("Invoice").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let result = ServiceRegistry::builder()
            .register("User", ServiceHandler::new())
            .register("User", ServiceHandler::new())
            .build();

        assert!(matches!(result, Err(ServiceRegistryError::Duplicate(e)) if e == "User"));
    }
}
