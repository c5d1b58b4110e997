//! Order-by compilation: lowering an [`OrderBy`] tree into sort terms.
//!
//! Order compilation is infallible: every order tree has a rendering. Chained
//! keys flatten left-to-right into a priority-ordered list of terms, and field
//! paths share the same resolution rules as filter compilation, including
//! promoted metadata columns.

use reldoc_core::{
    collection::CollectionDef,
    order::{Direction, OrderBy},
};

use crate::path::{self, ID_COLUMN};

/// Compiles an order tree into `ORDER BY` terms, in priority order.
pub fn compile_order(order: &OrderBy, def: &CollectionDef) -> Vec<String> {
    let mut terms = Vec::new();
    flatten(order, def, &mut terms);
    terms
}

/// Renders an order tree as an ` ORDER BY ...` fragment.
pub fn order_sql(order: &OrderBy, def: &CollectionDef) -> String {
    format!(" ORDER BY {}", compile_order(order, def).join(", "))
}

fn flatten(order: &OrderBy, def: &CollectionDef, terms: &mut Vec<String>) {
    match order {
        OrderBy::Asc(field) => terms.push(term(&path::resolve(field, def), Direction::Asc)),
        OrderBy::Desc(field) => terms.push(term(&path::resolve(field, def), Direction::Desc)),
        OrderBy::DocId(direction) => terms.push(term(ID_COLUMN, *direction)),
        OrderBy::And(primary, secondary) => {
            flatten(primary, def, terms);
            flatten(secondary, def, terms);
        }
    }
}

fn term(accessor: &str, direction: Direction) -> String {
    let keyword = match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    format!("{accessor} {keyword}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldoc_core::{
        index::{IndexDef, MetadataColumn},
        order::Direction,
    };

    fn people() -> CollectionDef {
        CollectionDef::new("people")
    }

    #[test]
    fn single_key_renders_direction() {
        assert_eq!(
            compile_order(&OrderBy::desc("age"), &people()),
            vec!["doc->'age' DESC"]
        );
        assert_eq!(
            compile_order(&OrderBy::doc_id(Direction::Asc), &people()),
            vec!["id ASC"]
        );
    }

    #[test]
    fn chained_keys_flatten_in_priority_order() {
        let order = OrderBy::desc("age")
            .then(OrderBy::asc("name.last"))
            .then(OrderBy::doc_id(Direction::Desc));
        assert_eq!(
            order_sql(&order, &people()),
            " ORDER BY doc->'age' DESC, doc->'name'->'last' ASC, id DESC"
        );
    }

    #[test]
    fn metadata_keys_sort_on_the_promoted_column() {
        let def = CollectionDef::new("people").index(IndexDef::metadata(
            vec![MetadataColumn::new("age", "BIGINT")],
            IndexDef::field("metadata.age", Direction::Asc, false).named("ix_age"),
        ));
        assert_eq!(
            compile_order(&OrderBy::asc("metadata.age"), &def),
            vec!["age ASC"]
        );
    }
}
