//! PostgreSQL implementation of the [`SqlEngine`] seam.
//!
//! Statements arrive with named `:pN` placeholders; they are rewritten to the
//! positional `$k` form the wire protocol expects before execution. Result
//! rows are converted column by column from their PostgreSQL types into
//! [`SqlValue`]s.
//!
//! One engine instance owns one client session, so transaction control
//! statements apply to the session as a whole. Transactions are not nested.

use std::fmt;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use serde_json::Value;
use tokio_postgres::{
    Client, NoTls, Row,
    types::{IsNull, ToSql, Type, to_sql_checked},
};
use tracing::error;

use reldoc_core::error::{DocumentStoreError, DocumentStoreResult};
use reldoc_sql::engine::{NamedParam, RowStream, SqlEngine, SqlRow, SqlValue};

/// A [`SqlEngine`] over a `tokio-postgres` client session.
pub struct PostgresEngine {
    client: Client,
}

impl fmt::Debug for PostgresEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresEngine").finish_non_exhaustive()
    }
}

impl PostgresEngine {
    /// Wraps an already-connected client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects to the given DSN without TLS and spawns the connection task.
    ///
    /// # Errors
    ///
    /// Returns an initialization error when the connection cannot be
    /// established.
    pub async fn connect(dsn: &str) -> DocumentStoreResult<Self> {
        let (client, connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                error!(%error, "postgres connection terminated");
            }
        });
        Ok(Self { client })
    }
}

/// A bound parameter value, delegating wire encoding to the native encoders.
#[derive(Debug)]
struct PgValue(SqlValue);

impl ToSql for PgValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => b.to_sql(ty, out),
            SqlValue::Int(i) => i.to_sql(ty, out),
            SqlValue::Float(f) => f.to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The store's statements carry no explicit casts; the server infers
        // parameter types, and the delegated encoder does the checking.
        true
    }

    to_sql_checked!();
}

/// Rewrites `:name` placeholders to positional `$k` form, where `k` is the
/// 1-based position of `name` in the parameter list. `::` (a cast) and the
/// contents of single-quoted literals are left untouched.
fn positional(sql: &str, params: &[NamedParam]) -> DocumentStoreResult<String> {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            // Quoted literals (inlined JSON keys among them) may contain
            // placeholder-shaped text; copy them through verbatim. A doubled
            // quote escapes a quote inside the literal.
            out.push(c);
            while let Some((_, c)) = chars.next() {
                out.push(c);
                if c == '\'' {
                    if let Some(&(_, '\'')) = chars.peek() {
                        out.push('\'');
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            continue;
        }
        if c != ':' {
            out.push(c);
            continue;
        }
        if let Some(&(_, ':')) = chars.peek() {
            out.push_str("::");
            chars.next();
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while let Some(&(j, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                end = j + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        if end == start {
            out.push(':');
            continue;
        }
        let name = &sql[start..end];
        let position = params
            .iter()
            .position(|(param, _)| param == name)
            .ok_or_else(|| {
                DocumentStoreError::Configuration(format!(
                    "statement references unbound parameter `:{name}`"
                ))
            })?;
        out.push('$');
        out.push_str(&(position + 1).to_string());
    }
    Ok(out)
}

fn bound(params: &[NamedParam]) -> Vec<PgValue> {
    params
        .iter()
        .map(|(_, value)| PgValue(value.clone()))
        .collect()
}

/// Maps a driver error: constraint-class SQLSTATEs (23xxx) become constraint
/// violations, everything else an engine error.
fn map_error(error: tokio_postgres::Error) -> DocumentStoreError {
    match error.code() {
        Some(state) if state.code().starts_with("23") => {
            DocumentStoreError::Constraint(error.to_string())
        }
        _ => DocumentStoreError::Engine(error.to_string()),
    }
}

fn convert_row(row: &Row) -> DocumentStoreResult<SqlRow> {
    let mut columns = Vec::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::JSONB || *ty == Type::JSON {
            row.try_get::<_, Option<Value>>(index)
                .map(|v| v.map(SqlValue::Json))
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::NAME {
            row.try_get::<_, Option<String>>(index)
                .map(|v| v.map(SqlValue::Text))
        } else if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(index)
                .map(|v| v.map(SqlValue::Bool))
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(index)
                .map(|v| v.map(|i| SqlValue::Int(i64::from(i))))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(index)
                .map(|v| v.map(|i| SqlValue::Int(i64::from(i))))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(index)
                .map(|v| v.map(SqlValue::Int))
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(index)
                .map(|v| v.map(|f| SqlValue::Float(f64::from(f))))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(index)
                .map(|v| v.map(SqlValue::Float))
        } else {
            return Err(DocumentStoreError::Unsupported(format!(
                "result column `{}` has unsupported type `{ty}`",
                column.name()
            )));
        };
        let value = value
            .map_err(|e| DocumentStoreError::Serialization(e.to_string()))?
            .unwrap_or(SqlValue::Null);
        columns.push((column.name().to_string(), value));
    }
    Ok(SqlRow::from_pairs(columns))
}

#[async_trait]
impl SqlEngine for PostgresEngine {
    async fn execute(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<u64> {
        let sql = positional(sql, params)?;
        self.client
            .execute_raw(sql.as_str(), bound(params))
            .await
            .map_err(map_error)
    }

    async fn query(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<RowStream> {
        let sql = positional(sql, params)?;
        let rows = self
            .client
            .query_raw(sql.as_str(), bound(params))
            .await
            .map_err(map_error)?;
        Ok(rows
            .map(|row| row.map_err(map_error).and_then(|row| convert_row(&row)))
            .boxed())
    }

    async fn begin(&self) -> DocumentStoreResult<()> {
        self.client.batch_execute("BEGIN").await.map_err(map_error)
    }

    async fn commit(&self) -> DocumentStoreResult<()> {
        self.client.batch_execute("COMMIT").await.map_err(map_error)
    }

    async fn rollback(&self) -> DocumentStoreResult<()> {
        self.client
            .batch_execute("ROLLBACK")
            .await
            .map_err(map_error)
    }

    async fn list_tables(
        &self,
        schema: Option<&str>,
        pattern: &str,
    ) -> DocumentStoreResult<Vec<String>> {
        let rows = match schema {
            Some(schema) => {
                self.client
                    .query(
                        "SELECT tablename FROM pg_tables \
                         WHERE schemaname = $1 AND tablename LIKE $2",
                        &[&schema, &pattern],
                    )
                    .await
            }
            None => {
                self.client
                    .query(
                        "SELECT tablename FROM pg_tables \
                         WHERE schemaname = current_schema() AND tablename LIKE $1",
                        &[&pattern],
                    )
                    .await
            }
        }
        .map_err(map_error)?;
        rows.iter()
            .map(|row| {
                row.try_get(0)
                    .map_err(|e| DocumentStoreError::Serialization(e.to_string()))
            })
            .collect()
    }

    async fn list_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> DocumentStoreResult<Vec<String>> {
        let rows = match schema {
            Some(schema) => {
                self.client
                    .query(
                        "SELECT indexname FROM pg_indexes \
                         WHERE schemaname = $1 AND tablename = $2",
                        &[&schema, &table],
                    )
                    .await
            }
            None => {
                self.client
                    .query(
                        "SELECT indexname FROM pg_indexes \
                         WHERE schemaname = current_schema() AND tablename = $1",
                        &[&table],
                    )
                    .await
            }
        }
        .map_err(map_error)?;
        rows.iter()
            .map(|row| {
                row.try_get(0)
                    .map_err(|e| DocumentStoreError::Serialization(e.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(names: &[&str]) -> Vec<NamedParam> {
        names
            .iter()
            .map(|name| (name.to_string(), SqlValue::Int(0)))
            .collect()
    }

    #[test]
    fn placeholders_rewrite_to_their_positions() {
        let sql = positional(
            "SELECT doc FROM t WHERE a = :p0 AND b IN(:p1,:p2)",
            &params(&["p0", "p1", "p2"]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT doc FROM t WHERE a = $1 AND b IN($2,$3)");
    }

    #[test]
    fn repeated_names_share_one_position() {
        let sql = positional("SELECT :p0, :p0", &params(&["p0"])).unwrap();
        assert_eq!(sql, "SELECT $1, $1");
    }

    #[test]
    fn casts_are_left_untouched() {
        let sql = positional("SELECT :p0::text", &params(&["p0"])).unwrap();
        assert_eq!(sql, "SELECT $1::text");
    }

    #[test]
    fn unbound_names_are_rejected() {
        assert!(matches!(
            positional("SELECT :missing", &params(&["p0"])),
            Err(DocumentStoreError::Configuration(_))
        ));
    }

    #[test]
    fn bare_colon_passes_through() {
        let sql = positional("SELECT ': :' FROM t", &[]).unwrap();
        assert_eq!(sql, "SELECT ': :' FROM t");
    }

    #[test]
    fn quoted_literals_are_not_rewritten() {
        let sql = positional(
            "SELECT doc FROM t WHERE doc->'a:p1' = :p0",
            &params(&["p0"]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT doc FROM t WHERE doc->'a:p1' = $1");
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        let sql = positional(
            "SELECT doc->'o''clock: :x' FROM t WHERE id = :p0",
            &params(&["p0"]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT doc->'o''clock: :x' FROM t WHERE id = $1");
    }

    #[test]
    fn bound_values_keep_parameter_order() {
        let values = bound(&[
            ("p0".to_string(), SqlValue::Text("a".into())),
            ("p1".to_string(), SqlValue::Json(json!({"b": 1}))),
        ]);
        assert_eq!(values.len(), 2);
    }
}
