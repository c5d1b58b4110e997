//! The relational engine collaborator seam.
//!
//! [`SqlEngine`] is everything this layer needs from the underlying engine:
//! parameterized statement execution with named bind parameters, scoped
//! transaction control on a single session, row-set iteration as a stream,
//! and schema introspection. A driver crate implements it over a concrete
//! client; tests implement it with a scripted fake.
//!
//! The engine is expected to provide a JSON-capable column type with element
//! navigation (`->`/`->>`), shallow object merge (`||`), containment (`@>`),
//! and key existence (`?`) — the PostgreSQL JSONB operator set.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt::Debug;

use reldoc_core::error::DocumentStoreResult;

/// A value bound to a statement parameter, or read from a result column.
///
/// `Json` values are bound using the engine's JSON type; the remaining
/// variants are bound natively (used for promoted metadata columns, document
/// identifiers, and pattern literals).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Native boolean.
    Bool(bool),
    /// Native integer.
    Int(i64),
    /// Native double-precision float.
    Float(f64),
    /// Native text.
    Text(String),
    /// A JSON-typed value.
    Json(Value),
}

impl SqlValue {
    /// Converts a JSON value into its native SQL representation, for binding
    /// against a natively-typed column. Arrays and objects stay JSON-typed.
    pub fn native(value: &Value) -> SqlValue {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else {
                    SqlValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Json(other.clone()),
        }
    }

    /// Converts this value into its JSON representation. JSON-typed column
    /// values decode to their parsed form; native values pass through
    /// unchanged.
    pub fn into_json(self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(b),
            SqlValue::Int(i) => Value::from(i),
            SqlValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Text(s) => Value::String(s),
            SqlValue::Json(v) => v,
        }
    }
}

/// One result row: named columns in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlRow {
    columns: Vec<(String, SqlValue)>,
}

impl SqlRow {
    /// Builds a row from `(column alias, value)` pairs.
    pub fn from_pairs(columns: impl IntoIterator<Item = (String, SqlValue)>) -> Self {
        Self { columns: columns.into_iter().collect() }
    }

    /// Looks up a column by alias.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// The columns of this row, in select-list order.
    pub fn columns(&self) -> &[(String, SqlValue)] {
        &self.columns
    }
}

/// A lazy, forward-only sequence of result rows.
pub type RowStream = BoxStream<'static, DocumentStoreResult<SqlRow>>;

/// A named bind parameter.
pub type NamedParam = (String, SqlValue);

/// Abstract interface for the relational engine session.
///
/// One instance owns one session handle; it is bound to a single logical
/// unit of work at a time, and transactions are not nested.
#[async_trait]
pub trait SqlEngine: Send + Sync + Debug {
    /// Executes a statement, returning the number of affected rows.
    ///
    /// Parameters are referenced in the statement as `:<name>`.
    async fn execute(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<u64>;

    /// Executes a query, returning a row stream holding an open server-side
    /// cursor for its lifetime.
    async fn query(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<RowStream>;

    /// Opens a transaction on the session.
    async fn begin(&self) -> DocumentStoreResult<()>;

    /// Commits the open transaction.
    async fn commit(&self) -> DocumentStoreResult<()>;

    /// Rolls back the open transaction.
    async fn rollback(&self) -> DocumentStoreResult<()>;

    /// Lists table names matching a LIKE pattern, within the given namespace
    /// or the session's default namespace.
    async fn list_tables(
        &self,
        schema: Option<&str>,
        pattern: &str,
    ) -> DocumentStoreResult<Vec<String>>;

    /// Lists index names defined on a table.
    async fn list_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> DocumentStoreResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_maps_scalars() {
        assert_eq!(SqlValue::native(&json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::native(&json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::native(&json!(7)), SqlValue::Int(7));
        assert_eq!(SqlValue::native(&json!(1.5)), SqlValue::Float(1.5));
        assert_eq!(SqlValue::native(&json!("x")), SqlValue::Text("x".into()));
        assert_eq!(
            SqlValue::native(&json!([1, 2])),
            SqlValue::Json(json!([1, 2]))
        );
    }

    #[test]
    fn into_json_round_trips_native_values() {
        assert_eq!(SqlValue::Int(5).into_json(), json!(5));
        assert_eq!(SqlValue::Text("a".into()).into_json(), json!("a"));
        assert_eq!(SqlValue::Json(json!({"a": 1})).into_json(), json!({"a": 1}));
    }
}
