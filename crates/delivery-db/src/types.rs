//! Table names, values and rows.

use crate::DbError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Tables exposed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Categories,
    Products,
    Customers,
    Orders,
    OrderItems,
    ComplementGroups,
    Complements,
    ProductComplementGroups,
    StoreSettings,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Products => "products",
            Table::Customers => "customers",
            Table::Orders => "orders",
            Table::OrderItems => "order_items",
            Table::ComplementGroups => "complement_groups",
            Table::Complements => "complements",
            Table::ProductComplementGroups => "product_complement_groups",
            Table::StoreSettings => "store_settings",
        }
    }

    /// Whether rows of this table carry an `updated_at` column.
    pub fn tracks_updates(&self) -> bool {
        !matches!(self, Table::OrderItems | Table::ProductComplementGroups)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of statement issued against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Select,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Select => "select",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// A scalar used in query conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Compare against a stored column value. Missing columns match `Null`.
    pub fn matches(&self, stored: Option<&serde_json::Value>) -> bool {
        match (self, stored) {
            (Value::Null, None) => true,
            (Value::Null, Some(v)) => v.is_null(),
            (_, None) => false,
            (Value::Bool(b), Some(v)) => v.as_bool() == Some(*b),
            (Value::Integer(i), Some(v)) => match v.as_i64() {
                Some(n) => n == *i,
                None => v.as_f64() == Some(*i as f64),
            },
            (Value::Real(f), Some(v)) => v.as_f64() == Some(*f),
            (Value::Text(s), Some(v)) => v.as_str() == Some(s.as_str()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A stored row: a JSON object keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(serde_json::Map<String, serde_json::Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from any serializable record.
    ///
    /// The record must serialize to a JSON object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, DbError> {
        match serde_json::to_value(record)? {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(DbError::DeserializeError(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.0.get(column)
    }

    /// Get a text column.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_str())
    }

    /// The `id` column, if present.
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Set a column value.
    pub fn set(&mut self, column: impl Into<String>, value: serde_json::Value) {
        self.0.insert(column.into(), value);
    }

    /// Check if a column is present.
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Overwrite columns with the ones present in `patch`.
    pub fn merge(&mut self, patch: &Row) {
        for (k, v) in patch.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Get the column names.
    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Try to deserialize the row into a type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
            .map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

/// Order two stored values the way a relational `ORDER BY` would.
///
/// Nulls sort last; numbers compare numerically; text compares bytewise.
pub fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    use serde_json::Value as J;

    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(J::Number(x)), Some(J::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(J::Bool(x)), Some(J::Bool(y))) => x.cmp(y),
        (Some(J::String(x)), Some(J::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
