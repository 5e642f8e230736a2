use thiserror::Error;

/// Core error types for entity definitions and field values
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Entity already registered: {0}")]
    DuplicateEntity(String),

    #[error("Entity {0} has no identifier field")]
    MissingIdentifier(String),

    #[error("Entity {entity} declares more than one identifier field: {fields:?}")]
    MultipleIdentifiers { entity: String, fields: Vec<String> },

    #[error("Entity {entity} declares field {field} twice")]
    DuplicateField { entity: String, field: String },

    #[error("Invalid name: {0:?} (expected [_A-Za-z][_0-9A-Za-z]*)")]
    InvalidName(String),

    #[error("Unknown field {field} on entity {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Field {entity}.{field} is read-only")]
    ReadOnlyField { entity: String, field: String },

    #[error("Field {entity}.{field} expects {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field {entity}.{field} requires a value")]
    MissingValue { entity: String, field: String },
}

impl CoreError {
    /// Create a new UnknownField error
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create a new MissingValue error
    pub fn missing_value(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingValue {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Check if this error was caused by the submitted values rather than the definition
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. }
                | Self::ReadOnlyField { .. }
                | Self::TypeMismatch { .. }
                | Self::MissingValue { .. }
        )
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_message() {
        let err = CoreError::unknown_field("Product", "colour");
        assert_eq!(err.to_string(), "Unknown field colour on entity Product");
        assert!(err.is_value_error());
    }

    #[test]
    fn test_definition_errors_are_not_value_errors() {
        assert!(!CoreError::DuplicateEntity("User".into()).is_value_error());
        assert!(!CoreError::MissingIdentifier("User".into()).is_value_error());
    }
}
