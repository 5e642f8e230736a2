use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field values keyed by field name, as submitted by a client or stored in a row.
pub type FieldValues = Map<String, Value>;

/// One persisted row of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Entity name (e.g. `Product`).
    pub entity: String,
    /// Assigned identifier.
    pub id: i64,
    /// Data field values, never containing the identifier.
    pub fields: FieldValues,
}

impl Record {
    pub fn new(entity: impl Into<String>, id: i64, fields: FieldValues) -> Self {
        Self {
            entity: entity.into(),
            id,
            fields,
        }
    }

    /// Returns a field value, `None` if the field is unset.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Overwrites the given fields, leaving the others untouched.
    pub fn apply(&mut self, values: &FieldValues) {
        for (key, value) in values {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// JSON object holding the identifier under `identifier_name` plus every field.
    pub fn to_json(&self, identifier_name: &str) -> Value {
        let mut map = self.fields.clone();
        map.insert(identifier_name.to_string(), Value::from(self.id));
        Value::Object(map)
    }
}
