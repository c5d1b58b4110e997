//! Field path resolution: dotted logical paths to column accessor expressions.
//!
//! A dotted path like `character.friendly` resolves to a chained JSON
//! navigation expression rooted at the document column
//! (`doc->'character'->'friendly'`). When the collection promotes metadata
//! columns and the path starts with `metadata.`, the prefix is stripped and
//! the bare physical column name is emitted instead.
//!
//! The same resolution is shared by the filter, order, projection, and index
//! compilers so that all four agree on field addressing.

use reldoc_core::{collection::CollectionDef, document::METADATA_KEY};

/// Physical identifier column of every collection table.
pub const ID_COLUMN: &str = "id";

/// Physical JSON document column of every collection table.
pub const DOC_COLUMN: &str = "doc";

/// Quotes a JSON key as a SQL string literal.
fn quote_key(key: &str) -> String {
    format!("'{}'", key.replace('\'', "''"))
}

/// The promoted column a path addresses, if any: metadata columns must be
/// enabled and the path must start with `metadata.`.
pub(crate) fn metadata_column<'a>(field: &'a str, def: &CollectionDef) -> Option<&'a str> {
    if !def.has_metadata_columns() {
        return None;
    }
    field.strip_prefix(&format!("{METADATA_KEY}."))
}

fn resolve_segments(field: &str, text_leaf: bool) -> String {
    let mut expr = String::from(DOC_COLUMN);
    let segments: Vec<&str> = field.split('.').collect();
    for (i, segment) in segments.iter().enumerate() {
        // The final hop extracts text when a text comparison is required;
        // intermediate hops always stay JSON-typed.
        let arrow = if text_leaf && i == segments.len() - 1 { "->>" } else { "->" };
        expr.push_str(arrow);
        expr.push_str(&quote_key(segment));
    }
    expr
}

/// Resolves a path to a JSON-typed accessor expression (or a bare promoted
/// column name).
pub(crate) fn resolve(field: &str, def: &CollectionDef) -> String {
    resolve_with(field, def.has_metadata_columns())
}

/// Resolves a path to a text-extracting accessor expression, for pattern
/// matching. Promoted columns resolve to their bare, natively-typed name.
pub(crate) fn resolve_text(field: &str, def: &CollectionDef) -> String {
    if let Some(column) = metadata_column(field, def) {
        return column.to_string();
    }
    resolve_segments(field, true)
}

/// Resolution with an explicit metadata-columns switch, for index compilation
/// where the index declaration itself may introduce the columns.
pub(crate) fn resolve_with(field: &str, metadata_enabled: bool) -> String {
    if metadata_enabled {
        if let Some(column) = field.strip_prefix(&format!("{METADATA_KEY}.")) {
            return column.to_string();
        }
    }
    resolve_segments(field, false)
}

/// Splits a path into its parent accessor (JSON-typed) and final key, for
/// key-existence tests.
pub(crate) fn split_leaf(field: &str, def: &CollectionDef) -> (String, String) {
    match field.rsplit_once('.') {
        Some((parent, leaf)) => (resolve(parent, def), leaf.to_string()),
        None => (DOC_COLUMN.to_string(), field.to_string()),
    }
}

/// Quotes a leaf key for use as the right-hand side of a key-existence test.
pub(crate) fn quote_leaf(key: &str) -> String {
    quote_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldoc_core::{
        index::{IndexDef, MetadataColumn},
        order::Direction,
    };

    fn plain() -> CollectionDef {
        CollectionDef::new("people")
    }

    fn with_metadata() -> CollectionDef {
        CollectionDef::new("people").index(IndexDef::metadata(
            vec![MetadataColumn::new("age", "BIGINT")],
            IndexDef::field("metadata.age", Direction::Asc, false).named("ix_age"),
        ))
    }

    #[test]
    fn nested_path_chains_json_hops() {
        assert_eq!(resolve("a.b.c", &plain()), "doc->'a'->'b'->'c'");
        assert_eq!(resolve("a", &plain()), "doc->'a'");
    }

    #[test]
    fn text_resolution_rewrites_the_final_hop() {
        assert_eq!(resolve_text("a.b.c", &plain()), "doc->'a'->'b'->>'c'");
        assert_eq!(resolve_text("a", &plain()), "doc->>'a'");
    }

    #[test]
    fn metadata_path_resolves_to_bare_column() {
        assert_eq!(resolve("metadata.age", &with_metadata()), "age");
        assert_eq!(resolve_text("metadata.age", &with_metadata()), "age");
        // Without promoted columns the same path is plain JSON navigation.
        assert_eq!(resolve("metadata.age", &plain()), "doc->'metadata'->'age'");
    }

    #[test]
    fn split_leaf_keeps_parent_json_typed() {
        assert_eq!(
            split_leaf("a.b.c", &plain()),
            ("doc->'a'->'b'".to_string(), "c".to_string())
        );
        assert_eq!(split_leaf("a", &plain()), ("doc".to_string(), "a".to_string()));
    }

    #[test]
    fn keys_with_quotes_are_escaped() {
        assert_eq!(resolve("o'clock", &plain()), "doc->'o''clock'");
    }
}
