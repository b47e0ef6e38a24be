use crate::core::{DataType, HydrationError, Result, Value};
use crate::instance::EntityInstance;
use crate::schema::ColumnDescriptor;

/// Boundary between raw driver values and hydrated instance fields.
///
/// The deserializer calls [`convert`](Self::convert) for every mapped column
/// a row carries, then [`assign`](Self::assign) to place the result on the
/// instance. Conversion failures abort the whole call.
pub trait ValueAdapter {
    fn convert(&self, raw: &Value, column: &ColumnDescriptor) -> Result<Value>;

    fn assign(&self, instance: &mut EntityInstance, column: &ColumnDescriptor, value: Value) {
        instance.set_field(column.name.clone(), value);
    }
}

/// Default [`ValueAdapter`] covering the conversions real drivers need:
/// exact matches pass through, integers widen to floats, 0/1 integers read
/// as booleans, and textual timestamp/date/uuid/json representations are
/// parsed into their typed values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAdapter;

impl ValueAdapter for StandardAdapter {
    fn convert(&self, raw: &Value, column: &ColumnDescriptor) -> Result<Value> {
        match (raw, &column.data_type) {
            // NULL passes through for every declared type
            (Value::Null, _) => Ok(Value::Null),

            // Exact matches
            (Value::Boolean(b), DataType::Boolean) => Ok(Value::Boolean(*b)),
            (Value::Integer(i), DataType::Integer) => Ok(Value::Integer(*i)),
            (Value::Float(f), DataType::Float) => Ok(Value::Float(*f)),
            (Value::Timestamp(t), DataType::Timestamp) => Ok(Value::Timestamp(*t)),
            (Value::Date(d), DataType::Date) => Ok(Value::Date(*d)),
            (Value::Uuid(u), DataType::Uuid) => Ok(Value::Uuid(*u)),
            (Value::Json(j), DataType::Json) => Ok(Value::Json(j.clone())),

            // Integer widening
            (Value::Integer(i), DataType::Float) => Ok(Value::Float(*i as f64)),

            // Drivers without a boolean type deliver 0/1
            (Value::Integer(0), DataType::Boolean) => Ok(Value::Boolean(false)),
            (Value::Integer(1), DataType::Boolean) => Ok(Value::Boolean(true)),

            // Textual representations
            (Value::Text(s), DataType::Timestamp) => {
                let dt = chrono::DateTime::parse_from_rfc3339(s).map_err(|e| {
                    HydrationError::TypeMismatch(format!(
                        "Column '{}': invalid timestamp: {}",
                        column.name, e
                    ))
                })?;
                Ok(Value::Timestamp(dt.with_timezone(&chrono::Utc)))
            }
            (Value::Text(s), DataType::Date) => {
                let d = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                    HydrationError::TypeMismatch(format!(
                        "Column '{}': invalid date: {}",
                        column.name, e
                    ))
                })?;
                Ok(Value::Date(d))
            }
            (Value::Text(s), DataType::Uuid) => {
                let u = uuid::Uuid::parse_str(s).map_err(|e| {
                    HydrationError::TypeMismatch(format!(
                        "Column '{}': invalid UUID: {}",
                        column.name, e
                    ))
                })?;
                Ok(Value::Uuid(u))
            }
            (Value::Text(s), DataType::Json) => {
                let j = serde_json::from_str(s).map_err(|e| {
                    HydrationError::TypeMismatch(format!(
                        "Column '{}': invalid JSON: {}",
                        column.name, e
                    ))
                })?;
                Ok(Value::Json(j))
            }

            // Anything renders as TEXT
            (other, DataType::Text) => Ok(Value::Text(other.to_string())),

            (other, expected) => Err(HydrationError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                column.name,
                expected,
                other.type_name()
            ))),
        }
    }
}
