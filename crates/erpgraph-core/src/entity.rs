//! Entity definitions.
//!
//! An [`EntityDefinition`] describes one persisted record type: its name, the
//! table backing it and an ordered list of typed fields, exactly one of which
//! is the identifier. Definitions are plain data; they are built once at
//! startup and shared read-only afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("valid name pattern"));

/// Returns true if `name` can be used as an entity or field name.
///
/// Names end up as GraphQL type and field names, so they follow the GraphQL
/// name grammar.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Column type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Variable length string with an optional maximum length.
    Varchar(Option<u32>),
    Text,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    BigInteger,
    Boolean,
    Float,
}

impl ColumnType {
    /// SQL rendering of the column type, e.g. `VARCHAR(80)`.
    pub fn sql_name(&self) -> String {
        match self {
            Self::Varchar(Some(len)) => format!("VARCHAR({len})"),
            Self::Varchar(None) => "VARCHAR".to_string(),
            Self::Text => "TEXT".to_string(),
            Self::Integer => "INTEGER".to_string(),
            Self::BigInteger => "BIGINT".to_string(),
            Self::Boolean => "BOOLEAN".to_string(),
            Self::Float => "FLOAT".to_string(),
        }
    }

    /// Whether the column holds text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Varchar(_) | Self::Text)
    }

    /// Checks that a non-null JSON value fits this column.
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Varchar(Some(max)), Value::String(s)) => s.chars().count() <= *max as usize,
            (Self::Varchar(None) | Self::Text, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .is_some_and(|i| i32::try_from(i).is_ok()),
            (Self::BigInteger, Value::Number(n)) => n.as_i64().is_some(),
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Float, Value::Number(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}

/// A single field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

impl FieldDefinition {
    /// Creates a non-nullable data field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
            unique: false,
        }
    }

    /// Creates an integer identifier field.
    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Integer,
            nullable: false,
            primary_key: true,
            unique: true,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A named persisted record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    /// Backing table. `None` marks a mixin or abstract base that is never
    /// persisted on its own.
    #[serde(default)]
    pub table: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl EntityDefinition {
    /// Creates a persisted entity backed by `table`.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: Some(table.into()),
            fields: Vec::new(),
        }
    }

    /// Creates a non-persisted definition (mixin / abstract base).
    pub fn abstract_base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.table.is_some()
    }

    /// Looks up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The identifier field.
    ///
    /// Only meaningful on a validated definition; returns `None` if the
    /// definition declares no identifier.
    pub fn identifier(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Name of the identifier field, `"id"` if none is declared.
    pub fn identifier_name(&self) -> &str {
        self.identifier().map(|f| f.name.as_str()).unwrap_or("id")
    }

    /// Every field except the identifier, in declaration order.
    pub fn data_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| !f.primary_key)
    }

    /// Validates the shape of the definition.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_name(&self.name) {
            return Err(CoreError::InvalidName(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_valid_name(&field.name) {
                return Err(CoreError::InvalidName(format!("{}.{}", self.name, field.name)));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let identifiers: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.name.clone())
            .collect();
        match identifiers.len() {
            0 => Err(CoreError::MissingIdentifier(self.name.clone())),
            1 => Ok(()),
            _ => Err(CoreError::MultipleIdentifiers {
                entity: self.name.clone(),
                fields: identifiers,
            }),
        }
    }

    /// Checks submitted field values against the definition.
    ///
    /// With `partial = false` (a new row) every non-nullable data field must
    /// carry a value. With `partial = true` (an update) only the submitted
    /// fields are checked. The identifier is never writable.
    pub fn check_values(&self, values: &Map<String, Value>, partial: bool) -> Result<()> {
        for (name, value) in values {
            let field = self
                .get_field(name)
                .ok_or_else(|| CoreError::unknown_field(&self.name, name))?;

            if field.primary_key {
                return Err(CoreError::ReadOnlyField {
                    entity: self.name.clone(),
                    field: name.clone(),
                });
            }

            if value.is_null() {
                if !field.nullable {
                    return Err(CoreError::missing_value(&self.name, name));
                }
                continue;
            }

            if !field.column_type.accepts(value) {
                return Err(CoreError::TypeMismatch {
                    entity: self.name.clone(),
                    field: name.clone(),
                    expected: field.column_type.sql_name(),
                    actual: describe_json(value),
                });
            }
        }

        if !partial {
            if let Some(missing) = self
                .data_fields()
                .find(|f| !f.nullable && values.get(&f.name).is_none_or(Value::is_null))
            {
                return Err(CoreError::missing_value(&self.name, &missing.name));
            }
        }

        Ok(())
    }
}

fn describe_json(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "boolean".into(),
        Value::Number(n) if n.is_i64() || n.is_u64() => format!("integer {n}"),
        Value::Number(_) => "float".into(),
        Value::String(s) => format!("string of length {}", s.chars().count()),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> EntityDefinition {
        EntityDefinition::new("Product", "products")
            .field(FieldDefinition::identifier("id"))
            .field(FieldDefinition::new("name", ColumnType::Varchar(Some(10))))
            .field(FieldDefinition::new("price", ColumnType::Integer))
            .field(FieldDefinition::new("notes", ColumnType::Text).nullable())
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_sql_names() {
        assert_eq!(ColumnType::Varchar(Some(80)).sql_name(), "VARCHAR(80)");
        assert_eq!(ColumnType::Integer.to_string(), "INTEGER");
        assert!(ColumnType::Text.is_textual());
        assert!(!ColumnType::Boolean.is_textual());
    }

    #[test]
    fn test_data_fields_skip_identifier() {
        let def = product();
        let names: Vec<&str> = def.data_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "price", "notes"]);
        assert_eq!(def.identifier_name(), "id");
    }

    #[test]
    fn test_validate_requires_single_identifier() {
        let no_id = EntityDefinition::new("Thing", "things")
            .field(FieldDefinition::new("name", ColumnType::Text));
        assert!(matches!(no_id.validate(), Err(CoreError::MissingIdentifier(_))));

        let two_ids = product().field(FieldDefinition::identifier("other_id"));
        assert!(matches!(
            two_ids.validate(),
            Err(CoreError::MultipleIdentifiers { .. })
        ));

        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let def = EntityDefinition::new("Bad-Name", "bad")
            .field(FieldDefinition::identifier("id"));
        assert!(matches!(def.validate(), Err(CoreError::InvalidName(_))));

        let dup = product().field(FieldDefinition::new("price", ColumnType::Integer));
        assert!(matches!(dup.validate(), Err(CoreError::DuplicateField { .. })));
    }

    #[test]
    fn test_check_values_full_write() {
        let def = product();
        assert!(def
            .check_values(&values(json!({"name": "Pen", "price": 2})), false)
            .is_ok());

        let err = def
            .check_values(&values(json!({"name": "Pen"})), false)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingValue { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_check_values_partial_write() {
        let def = product();
        assert!(def.check_values(&values(json!({"price": 3})), true).is_ok());
        assert!(def.check_values(&values(json!({"notes": null})), true).is_ok());
        assert!(def.check_values(&values(json!({"price": null})), true).is_err());
    }

    #[test]
    fn test_check_values_types() {
        let def = product();
        let err = def
            .check_values(&values(json!({"price": "two"})), true)
            .unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));

        let too_long = def
            .check_values(&values(json!({"name": "a very long name"})), true)
            .unwrap_err();
        assert!(matches!(too_long, CoreError::TypeMismatch { .. }));

        let overflow = def
            .check_values(&values(json!({"price": 5_000_000_000i64})), true)
            .unwrap_err();
        assert!(matches!(overflow, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn test_check_values_rejects_unknown_and_identifier() {
        let def = product();
        assert!(matches!(
            def.check_values(&values(json!({"colour": "red"})), true),
            Err(CoreError::UnknownField { .. })
        ));
        assert!(matches!(
            def.check_values(&values(json!({"id": 4})), true),
            Err(CoreError::ReadOnlyField { .. })
        ));
    }
}
