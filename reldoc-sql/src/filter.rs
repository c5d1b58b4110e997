//! Filter compilation: lowering a [`Filter`] tree into a WHERE clause.
//!
//! Compilation is pure and recursive: it produces a boolean expression string
//! plus an ordered set of named bind parameters, threading one increasing
//! counter so placeholder names stay unique across arbitrarily deep trees.
//! All errors are raised here, before any statement reaches the engine.
//!
//! Special cases:
//!
//! - `Any` compiles to no clause at all, and only as the entire tree;
//!   anywhere below the root it is a configuration error.
//! - `Not` may only wrap a single field or set-membership predicate.
//! - Empty set-membership lists short-circuit to an unconditionally false
//!   clause (`1 = 0`); their negation short-circuits to `1 = 1`. Non-empty
//!   negated memberships emit `NOT IN(...)` directly.
//! - Values compared against promoted metadata columns are bound natively;
//!   everything else is bound JSON-encoded. `Exists` on a promoted field
//!   becomes a NULL test on the column, since the field is stripped from the
//!   stored body.

use serde_json::Value;

use reldoc_core::{
    collection::CollectionDef,
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
};

use crate::{
    engine::SqlValue,
    params::SqlParams,
    path::{self, ID_COLUMN},
};

/// The result of lowering a filter tree: an optional boolean expression and
/// its bind parameters. `clause` is `None` exactly when the filter was
/// [`Filter::Any`].
#[derive(Debug)]
pub struct CompiledFilter {
    /// The boolean expression text, without the `WHERE` keyword.
    pub clause: Option<String>,
    /// Bind parameters referenced by the clause, in binding order.
    pub params: SqlParams,
}

impl CompiledFilter {
    /// Renders the clause as a ` WHERE ...` fragment, or nothing for `Any`.
    pub fn where_sql(&self) -> String {
        match &self.clause {
            Some(clause) => format!(" WHERE {clause}"),
            None => String::new(),
        }
    }
}

/// Compiles a filter tree against a collection definition.
///
/// # Errors
///
/// Returns a configuration error for `Any` below the root or `Not` wrapping a
/// boolean composition.
pub fn compile_filter(filter: &Filter, def: &CollectionDef) -> DocumentStoreResult<CompiledFilter> {
    if matches!(filter, Filter::Any) {
        return Ok(CompiledFilter { clause: None, params: SqlParams::new() });
    }

    let mut compiler = FilterCompiler { def, params: SqlParams::new() };
    let clause = compiler.lower(filter)?;
    Ok(CompiledFilter { clause: Some(clause), params: compiler.params })
}

struct FilterCompiler<'a> {
    def: &'a CollectionDef,
    params: SqlParams,
}

impl FilterCompiler<'_> {
    fn lower(&mut self, filter: &Filter) -> DocumentStoreResult<String> {
        match filter {
            Filter::Any => Err(DocumentStoreError::Configuration(
                "`Any` matches everything and cannot be combined with other filters".to_string(),
            )),
            Filter::And(a, b) => {
                let left = self.lower(a)?;
                let right = self.lower(b)?;
                Ok(format!("( {left} AND {right} )"))
            }
            Filter::Or(a, b) => {
                let left = self.lower(a)?;
                let right = self.lower(b)?;
                Ok(format!("( {left} OR {right} )"))
            }
            Filter::Eq(field, value) => Ok(self.comparison(field, "=", value)),
            Filter::Gt(field, value) => Ok(self.comparison(field, ">", value)),
            Filter::Gte(field, value) => Ok(self.comparison(field, ">=", value)),
            Filter::Lt(field, value) => Ok(self.comparison(field, "<", value)),
            Filter::Lte(field, value) => Ok(self.comparison(field, "<=", value)),
            Filter::Like(field, pattern) => {
                let accessor = path::resolve_text(field, self.def);
                let placeholder = self.params.bind(SqlValue::Text(pattern.clone()));
                Ok(format!("{accessor} ILIKE {placeholder}"))
            }
            Filter::Exists(field) => {
                // A promoted metadata field is absent from the stored body,
                // so its existence is a NULL test on the physical column.
                if let Some(column) = path::metadata_column(field, self.def) {
                    return Ok(format!("{column} IS NOT NULL"));
                }
                // Key existence binds no parameter: the leaf key is embedded
                // as a literal against the JSON-typed parent accessor.
                let (parent, leaf) = path::split_leaf(field, self.def);
                Ok(format!("{parent} ? {}", path::quote_leaf(&leaf)))
            }
            Filter::InArray(field, value) => {
                let accessor = path::resolve(field, self.def);
                let needle = SqlValue::Json(Value::Array(vec![value.clone()]));
                let placeholder = self.params.bind(needle);
                Ok(format!("{accessor} @> {placeholder}"))
            }
            Filter::DocId(id) => {
                let placeholder = self.params.bind(SqlValue::Text(id.clone()));
                Ok(format!("{ID_COLUMN} = {placeholder}"))
            }
            Filter::AnyOfDocId(ids) => Ok(self.doc_id_membership(ids, false)),
            Filter::AnyOf(field, values) => Ok(self.field_membership(field, values, false)),
            Filter::Not(inner) => self.lower_negated(inner),
        }
    }

    fn lower_negated(&mut self, inner: &Filter) -> DocumentStoreResult<String> {
        match inner {
            Filter::Any | Filter::And(..) | Filter::Or(..) | Filter::Not(..) => {
                Err(DocumentStoreError::Configuration(format!(
                    "`Not` must wrap a single field or set-membership predicate, got {inner:?}"
                )))
            }
            // Negated set membership is its own code path: the empty list
            // flips to always-true, the non-empty list emits NOT IN directly.
            Filter::AnyOfDocId(ids) => Ok(self.doc_id_membership(ids, true)),
            Filter::AnyOf(field, values) => Ok(self.field_membership(field, values, true)),
            other => {
                let clause = self.lower(other)?;
                Ok(format!("NOT {clause}"))
            }
        }
    }

    fn comparison(&mut self, field: &str, op: &str, value: &Value) -> String {
        let accessor = path::resolve(field, self.def);
        let placeholder = self.params.bind(self.field_value(field, value));
        format!("{accessor} {op} {placeholder}")
    }

    /// Values targeting a promoted metadata column are bound natively; all
    /// other field values are bound JSON-encoded.
    fn field_value(&self, field: &str, value: &Value) -> SqlValue {
        if path::metadata_column(field, self.def).is_some() {
            SqlValue::native(value)
        } else {
            SqlValue::Json(value.clone())
        }
    }

    fn doc_id_membership(&mut self, ids: &[String], negated: bool) -> String {
        let values = ids
            .iter()
            .map(|id| SqlValue::Text(id.clone()))
            .collect();
        self.membership(ID_COLUMN.to_string(), values, negated)
    }

    fn field_membership(&mut self, field: &str, values: &[Value], negated: bool) -> String {
        let accessor = path::resolve(field, self.def);
        let values = values
            .iter()
            .map(|value| self.field_value(field, value))
            .collect();
        self.membership(accessor, values, negated)
    }

    fn membership(&mut self, accessor: String, values: Vec<SqlValue>, negated: bool) -> String {
        if values.is_empty() {
            // An empty IN() list is malformed SQL; membership in the empty
            // set is unconditionally false, its negation unconditionally true.
            return if negated { "1 = 1" } else { "1 = 0" }.to_string();
        }
        let placeholders: Vec<String> = values
            .into_iter()
            .map(|value| self.params.bind(value))
            .collect();
        let keyword = if negated { "NOT IN" } else { "IN" };
        format!("{accessor} {keyword}({})", placeholders.join(","))
    }
}
