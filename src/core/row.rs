use std::collections::HashMap;

use serde_json::Value as JsonValue;

use super::{HydrationError, Result, Value};

/// One flat result row from a joined query, keyed by aliased column name
/// (e.g. `person_id`, `town_name`).
///
/// A column that was never selected is absent; a selected column whose value
/// is SQL NULL is present as [`Value::Null`]. The deserializer relies on the
/// distinction when probing which entities a row actually carries.
#[derive(Debug, Clone, Default)]
pub struct JoinedRow {
    values: HashMap<String, Value>,
}

impl JoinedRow {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Zips a column-name header with one positional row, the shape most
    /// query results arrive in.
    pub fn from_columns(columns: &[String], row: Vec<Value>) -> Result<Self> {
        if columns.len() != row.len() {
            return Err(HydrationError::InvalidRow(format!(
                "Row has {} values but {} columns were selected",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self {
            values: columns.iter().cloned().zip(row).collect(),
        })
    }

    /// Builds a row from a JSON object, the shape JSON-speaking drivers
    /// return. Scalar members map onto [`Value`] directly; nested arrays and
    /// objects are kept as [`Value::Json`].
    pub fn from_json(json: JsonValue) -> Result<Self> {
        match json {
            JsonValue::Object(map) => Ok(Self {
                values: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            other => Err(HydrationError::InvalidRow(format!(
                "Expected a JSON object per row, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Returns `None` for a column the query never selected.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for JoinedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
