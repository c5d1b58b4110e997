//! Projection compilation and its inverse row reassembly.
//!
//! The forward direction lowers a [`PartialSelect`] into a SELECT list: one
//! expression per entry, each resolved source path aliased to its target, with
//! the physical identifier column always selected first under the reserved
//! row-identity alias. The inverse direction takes a flat result row and
//! rebuilds the nested output document entry by entry, honoring the merge
//! marker and nulling missing fields rather than omitting them.

use serde_json::{Map, Value};

use reldoc_core::{
    collection::CollectionDef,
    document::Doc,
    error::{DocumentStoreError, DocumentStoreResult},
    select::{DOC_ID_ALIAS, MERGE_ALIAS, PartialSelect, SelectTarget},
};

use crate::{
    engine::{SqlRow, SqlValue},
    path::{self, ID_COLUMN},
};

/// Quotes a column alias as a SQL identifier.
fn quote_alias(alias: &str) -> String {
    format!("\"{}\"", alias.replace('"', "\"\""))
}

/// Compiles a projection into a SELECT list.
///
/// The identifier column always leads the list under [`DOC_ID_ALIAS`];
/// remaining expressions follow in declared entry order, so reassembly can
/// pair row columns with projection entries positionally.
///
/// # Errors
///
/// Returns a configuration error for an empty projection or a caller alias
/// that collides with a reserved alias.
pub fn compile_select(
    select: &PartialSelect,
    def: &CollectionDef,
) -> DocumentStoreResult<String> {
    if select.is_empty() {
        return Err(DocumentStoreError::Configuration(
            "partial select must project at least one field".to_string(),
        ));
    }

    let mut expressions = vec![format!("{ID_COLUMN} AS {}", quote_alias(DOC_ID_ALIAS))];
    for entry in select.entries() {
        if let SelectTarget::Alias(alias) = &entry.target {
            if alias == DOC_ID_ALIAS || alias == MERGE_ALIAS {
                return Err(DocumentStoreError::Configuration(format!(
                    "`{alias}` is a reserved projection alias"
                )));
            }
        }
        expressions.push(format!(
            "{} AS {}",
            path::resolve(&entry.source, def),
            quote_alias(entry.target.column_alias()),
        ));
    }
    Ok(expressions.join(", "))
}

/// Reassembles one result row into an `(id, document)` pair.
///
/// Row columns are paired with projection entries positionally, skipping the
/// leading row-identity column. Plain aliases build nested maps segment by
/// segment with the decoded value at the leaf; missing sources decode to an
/// explicit null. Merge entries splice an object's top-level keys into the
/// output's top level, skip null, and reject any other value shape.
pub fn reassemble(row: &SqlRow, select: &PartialSelect) -> DocumentStoreResult<(String, Doc)> {
    let columns = row.columns();
    let expected = select.entries().len() + 1;
    if columns.len() != expected {
        return Err(DocumentStoreError::Serialization(format!(
            "partial select row has {} columns, expected {expected}",
            columns.len()
        )));
    }

    let id = match &columns[0].1 {
        SqlValue::Text(id) => id.clone(),
        other => {
            return Err(DocumentStoreError::Serialization(format!(
                "document identifier column decoded to {other:?}, expected text"
            )));
        }
    };

    let mut doc = Doc::new();
    for (entry, (_, value)) in select.entries().iter().zip(&columns[1..]) {
        let value = value.clone().into_json();
        match &entry.target {
            SelectTarget::Alias(alias) => insert_path(&mut doc, alias, value),
            SelectTarget::Merge => match value {
                Value::Object(object) => {
                    for (key, value) in object {
                        doc.insert(key, value);
                    }
                }
                // A merge source that was absent is skipped, not spliced.
                Value::Null => {}
                other => {
                    return Err(DocumentStoreError::Serialization(format!(
                        "merge projection of `{}` resolved to a non-object value: {other}",
                        entry.source
                    )));
                }
            },
        }
    }
    Ok((id, doc))
}

/// Sets `value` at a dotted path, creating (or overwriting) intermediate
/// objects along the way.
fn insert_path(doc: &mut Doc, alias: &str, value: Value) {
    match alias.split_once('.') {
        None => {
            doc.insert(alias.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                insert_path(nested, rest, value);
            }
        }
    }
}
