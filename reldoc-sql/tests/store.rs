//! End-to-end tests of the SQL document store against a scripted engine.
//!
//! The fake engine records every statement, parameter set, and transaction
//! control call, and replays canned result sets for queries, so each test can
//! assert the exact SQL the store emits and the documents it decodes.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde_json::{Value, json};

use reldoc_core::{
    backend::DocumentBackend,
    collection::CollectionDef,
    document::Doc,
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
    find::FindOptions,
    index::{IndexDef, IndexRef, MetadataColumn},
    order::{Direction, OrderBy},
    select::PartialSelect,
};
use reldoc_sql::{
    SqlDocumentStore, SqlStoreOptions,
    engine::{NamedParam, RowStream, SqlEngine, SqlRow, SqlValue},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Execute(String, Vec<NamedParam>),
    Query(String, Vec<NamedParam>),
    Begin,
    Commit,
    Rollback,
    ListTables(Option<String>, String),
    ListIndexes(Option<String>, String),
}

#[derive(Debug, Default)]
struct FakeEngine {
    log: Mutex<Vec<Call>>,
    results: Mutex<VecDeque<Vec<SqlRow>>>,
    tables: Vec<String>,
    indexes: Vec<String>,
    fail_on: Option<String>,
}

impl FakeEngine {
    fn new() -> Self {
        FakeEngine::default()
    }

    /// Queues a result set for the next query call. Unqueued queries return
    /// no rows.
    fn with_result(self, rows: Vec<SqlRow>) -> Self {
        self.results.lock().unwrap().push_back(rows);
        self
    }

    fn with_tables(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    fn with_indexes(mut self, indexes: &[&str]) -> Self {
        self.indexes = indexes.iter().map(|i| i.to_string()).collect();
        self
    }

    /// Makes every statement containing the given fragment fail.
    fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    fn check_failure(&self, sql: &str) -> DocumentStoreResult<()> {
        match &self.fail_on {
            Some(fragment) if sql.contains(fragment.as_str()) => Err(
                DocumentStoreError::Engine(format!("scripted failure on `{fragment}`")),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SqlEngine for FakeEngine {
    async fn execute(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<u64> {
        self.record(Call::Execute(sql.to_string(), params.to_vec()));
        self.check_failure(sql)?;
        Ok(1)
    }

    async fn query(&self, sql: &str, params: &[NamedParam]) -> DocumentStoreResult<RowStream> {
        self.record(Call::Query(sql.to_string(), params.to_vec()));
        self.check_failure(sql)?;
        let rows = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    async fn begin(&self) -> DocumentStoreResult<()> {
        self.record(Call::Begin);
        Ok(())
    }

    async fn commit(&self) -> DocumentStoreResult<()> {
        self.record(Call::Commit);
        Ok(())
    }

    async fn rollback(&self) -> DocumentStoreResult<()> {
        self.record(Call::Rollback);
        Ok(())
    }

    async fn list_tables(
        &self,
        schema: Option<&str>,
        pattern: &str,
    ) -> DocumentStoreResult<Vec<String>> {
        self.record(Call::ListTables(
            schema.map(str::to_string),
            pattern.to_string(),
        ));
        Ok(self.tables.clone())
    }

    async fn list_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> DocumentStoreResult<Vec<String>> {
        self.record(Call::ListIndexes(
            schema.map(str::to_string),
            table.to_string(),
        ));
        Ok(self.indexes.clone())
    }
}

fn store(engine: FakeEngine) -> SqlDocumentStore<FakeEngine> {
    SqlDocumentStore::new(engine)
}

fn people() -> CollectionDef {
    CollectionDef::new("people")
}

fn people_with_age() -> CollectionDef {
    CollectionDef::new("people").index(IndexDef::metadata(
        vec![MetadataColumn::new("age", "BIGINT")],
        IndexDef::field("metadata.age", Direction::Asc, false).named("ix_age"),
    ))
}

fn doc(value: Value) -> Doc {
    match value {
        Value::Object(map) => map,
        _ => panic!("test document must be an object"),
    }
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

#[tokio::test]
async fn insert_brackets_a_transaction_and_binds_the_body() {
    let store = store(FakeEngine::new());
    let body = doc(json!({"name": "Jack"}));

    store.insert(&people(), "d1", &body).await.unwrap();

    assert_eq!(
        store.engine().calls(),
        vec![
            Call::Begin,
            Call::Execute(
                "INSERT INTO people (id, doc) VALUES (:p0, :p1)".to_string(),
                vec![
                    ("p0".to_string(), text("d1")),
                    ("p1".to_string(), SqlValue::Json(json!({"name": "Jack"}))),
                ],
            ),
            Call::Commit,
        ]
    );
}

#[tokio::test]
async fn insert_splits_metadata_into_columns() {
    let store = store(FakeEngine::new());
    let body = doc(json!({"name": "Jack", "metadata": {"age": 5}}));

    store.insert(&people_with_age(), "d1", &body).await.unwrap();

    let calls = store.engine().calls();
    assert_eq!(
        calls[1],
        Call::Execute(
            "INSERT INTO people (id, doc, age) VALUES (:p0, :p1, :p2)".to_string(),
            vec![
                ("p0".to_string(), text("d1")),
                ("p1".to_string(), SqlValue::Json(json!({"name": "Jack"}))),
                ("p2".to_string(), SqlValue::Int(5)),
            ],
        )
    );
}

#[tokio::test]
async fn undeclared_metadata_fails_before_any_statement() {
    let store = store(FakeEngine::new());
    let body = doc(json!({"metadata": {"height": 180}}));

    let result = store.insert(&people_with_age(), "d1", &body).await;

    assert!(matches!(result, Err(DocumentStoreError::Configuration(_))));
    // No statement reached the engine; the opened scope is rolled back.
    assert_eq!(store.engine().calls(), vec![Call::Begin, Call::Rollback]);
}

#[tokio::test]
async fn update_shallow_merges_the_patch() {
    let store = store(FakeEngine::new());
    let patch = doc(json!({"age": 6}));

    store.update(&people(), "d1", &patch).await.unwrap();

    assert_eq!(
        store.engine().calls()[1],
        Call::Execute(
            "UPDATE people SET doc = doc || :p0 WHERE id = :p1".to_string(),
            vec![
                ("p0".to_string(), SqlValue::Json(json!({"age": 6}))),
                ("p1".to_string(), text("d1")),
            ],
        )
    );
}

#[tokio::test]
async fn replace_overwrites_the_body_and_all_columns() {
    let store = store(FakeEngine::new());
    let body = doc(json!({"name": "Jill"}));

    store.replace(&people_with_age(), "d1", &body).await.unwrap();

    assert_eq!(
        store.engine().calls()[1],
        Call::Execute(
            "UPDATE people SET doc = :p0, age = :p1 WHERE id = :p2".to_string(),
            vec![
                ("p0".to_string(), SqlValue::Json(json!({"name": "Jill"}))),
                ("p1".to_string(), SqlValue::Null),
                ("p2".to_string(), text("d1")),
            ],
        )
    );
}

#[tokio::test]
async fn statement_failure_rolls_back_and_rethrows() {
    let store = store(FakeEngine::new().failing_on("INSERT"));
    let body = doc(json!({"name": "Jack"}));

    let result = store.insert(&people(), "d1", &body).await;

    assert!(matches!(result, Err(DocumentStoreError::Engine(_))));
    let calls = store.engine().calls();
    assert_eq!(calls.first(), Some(&Call::Begin));
    assert_eq!(calls.last(), Some(&Call::Rollback));
    assert!(!calls.contains(&Call::Commit));
}

#[tokio::test]
async fn ambient_transactions_skip_bracketing() {
    let store = SqlDocumentStore::with_options(
        FakeEngine::new(),
        SqlStoreOptions::new().ambient_transactions(),
    );
    let body = doc(json!({"name": "Jack"}));

    store.insert(&people(), "d1", &body).await.unwrap();

    let calls = store.engine().calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::Execute(..)));
}

#[tokio::test]
async fn upsert_updates_when_the_id_exists() {
    let engine = FakeEngine::new().with_result(vec![SqlRow::from_pairs([(
        "id".to_string(),
        text("d1"),
    )])]);
    let store = store(engine);
    let body = doc(json!({"name": "Jack"}));

    store.upsert(&people(), "d1", &body).await.unwrap();

    let calls = store.engine().calls();
    assert_eq!(
        calls[1],
        Call::Query(
            "SELECT id FROM people WHERE id = :p0".to_string(),
            vec![("p0".to_string(), text("d1"))],
        )
    );
    assert!(matches!(&calls[2], Call::Execute(sql, _) if sql.starts_with("UPDATE people SET doc = doc ||")));
    assert_eq!(calls.last(), Some(&Call::Commit));
}

#[tokio::test]
async fn upsert_inserts_when_the_id_is_absent() {
    let store = store(FakeEngine::new());
    let body = doc(json!({"name": "Jack"}));

    store.upsert(&people(), "d1", &body).await.unwrap();

    let calls = store.engine().calls();
    assert!(matches!(&calls[2], Call::Execute(sql, _) if sql.starts_with("INSERT INTO people")));
}

#[tokio::test]
async fn update_where_applies_the_compiled_filter() {
    let store = store(FakeEngine::new());
    let patch = doc(json!({"status": "done"}));

    store
        .update_where(&people(), &Filter::eq("status", "open"), &patch)
        .await
        .unwrap();

    // Filter parameters bind first, so the SET placeholder follows them.
    assert_eq!(
        store.engine().calls()[1],
        Call::Execute(
            "UPDATE people SET doc = doc || :p1 WHERE doc->'status' = :p0".to_string(),
            vec![
                ("p0".to_string(), SqlValue::Json(json!("open"))),
                ("p1".to_string(), SqlValue::Json(json!({"status": "done"}))),
            ],
        )
    );
}

#[tokio::test]
async fn delete_where_with_any_hits_every_row() {
    let store = store(FakeEngine::new());

    store.delete_where(&people(), &Filter::any()).await.unwrap();

    assert_eq!(
        store.engine().calls()[1],
        Call::Execute("DELETE FROM people".to_string(), vec![])
    );
}

#[tokio::test]
async fn get_decodes_and_reattaches_metadata() {
    let engine = FakeEngine::new().with_result(vec![SqlRow::from_pairs([
        ("id".to_string(), text("d1")),
        ("doc".to_string(), SqlValue::Json(json!({"name": "Jack"}))),
        ("age".to_string(), SqlValue::Int(5)),
    ])]);
    let store = store(engine);

    let fetched = store.get(&people_with_age(), "d1").await.unwrap().unwrap();

    assert_eq!(
        Value::Object(fetched),
        json!({"name": "Jack", "metadata": {"age": 5}})
    );
    assert_eq!(
        store.engine().calls(),
        vec![Call::Query(
            "SELECT id, doc, age FROM people WHERE id = :p0".to_string(),
            vec![("p0".to_string(), text("d1"))],
        )]
    );
}

#[tokio::test]
async fn get_of_an_absent_id_is_none() {
    let store = store(FakeEngine::new());
    assert_eq!(store.get(&people(), "missing").await.unwrap(), None);
}

#[tokio::test]
async fn find_composes_where_order_and_pagination() {
    let engine = FakeEngine::new().with_result(vec![
        SqlRow::from_pairs([
            ("id".to_string(), text("d1")),
            ("doc".to_string(), SqlValue::Json(json!({"age": 9}))),
        ]),
        SqlRow::from_pairs([
            ("id".to_string(), text("d2")),
            ("doc".to_string(), SqlValue::Json(json!({"age": 7}))),
        ]),
    ]);
    let store = store(engine);
    let options = FindOptions::new()
        .order(OrderBy::desc("age").then(OrderBy::doc_id(Direction::Asc)))
        .skip(1)
        .limit(2);

    let rows: Vec<(String, Doc)> = store
        .find(&people(), &Filter::gt("age", 5), &options)
        .await
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "d1");
    assert_eq!(rows[1].1.get("age"), Some(&json!(7)));
    assert_eq!(
        store.engine().calls(),
        vec![Call::Query(
            "SELECT id, doc FROM people WHERE doc->'age' > :p0 \
             ORDER BY doc->'age' DESC, id ASC LIMIT 2 OFFSET 1"
                .to_string(),
            vec![("p0".to_string(), SqlValue::Json(json!(5)))],
        )]
    );
}

#[tokio::test]
async fn get_partial_reassembles_the_projection() {
    let engine = FakeEngine::new().with_result(vec![SqlRow::from_pairs([
        ("__id".to_string(), text("d1")),
        ("some.alias".to_string(), SqlValue::Json(json!("foo"))),
        ("baz".to_string(), SqlValue::Json(json!("bat"))),
    ])]);
    let store = store(engine);
    let select = PartialSelect::new()
        .field("some.alias", "some.prop")
        .field("baz", "baz");

    let fetched = store
        .get_partial(&people(), "d1", &select)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        Value::Object(fetched),
        json!({"some": {"alias": "foo"}, "baz": "bat"})
    );
    assert_eq!(
        store.engine().calls(),
        vec![Call::Query(
            "SELECT id AS \"__id\", doc->'some'->'prop' AS \"some.alias\", \
             doc->'baz' AS \"baz\" FROM people WHERE id = :p0"
                .to_string(),
            vec![("p0".to_string(), text("d1"))],
        )]
    );
}

#[tokio::test]
async fn find_ids_materializes_the_identifier_column() {
    let engine = FakeEngine::new().with_result(vec![
        SqlRow::from_pairs([("id".to_string(), text("d1"))]),
        SqlRow::from_pairs([("id".to_string(), text("d2"))]),
    ]);
    let store = store(engine);

    let ids = store
        .find_ids(&people(), &Filter::any_of_doc_id(["d1", "d2", "d3"]))
        .await
        .unwrap();

    assert_eq!(ids, vec!["d1", "d2"]);
    assert!(matches!(
        &store.engine().calls()[0],
        Call::Query(sql, _) if sql == "SELECT id FROM people WHERE id IN(:p0,:p1,:p2)"
    ));
}

#[tokio::test]
async fn count_reads_the_count_column() {
    let engine = FakeEngine::new().with_result(vec![SqlRow::from_pairs([(
        "count".to_string(),
        SqlValue::Int(3),
    )])]);
    let store = store(engine);

    let n = store.count(&people(), &Filter::exists("name")).await.unwrap();

    assert_eq!(n, 3);
    assert!(matches!(
        &store.engine().calls()[0],
        Call::Query(sql, _) if sql == "SELECT COUNT(*) AS count FROM people WHERE doc ? 'name'"
    ));
}

#[tokio::test]
async fn create_collection_emits_table_and_index_ddl() {
    let store = store(FakeEngine::new());
    let def = people_with_age()
        .index(IndexDef::field("name", Direction::Asc, true).named("ix_name"));

    store.create_collection(&def).await.unwrap();

    assert_eq!(
        store.engine().calls(),
        vec![
            Call::Begin,
            Call::Execute(
                "CREATE TABLE people (id TEXT PRIMARY KEY, doc JSONB NOT NULL)".to_string(),
                vec![],
            ),
            Call::Execute("ALTER TABLE people ADD COLUMN age BIGINT".to_string(), vec![]),
            Call::Execute("CREATE INDEX ix_age ON people ((age))".to_string(), vec![]),
            Call::Execute(
                "CREATE UNIQUE INDEX ix_name ON people ((doc->'name'))".to_string(),
                vec![],
            ),
            Call::Commit,
        ]
    );
}

#[tokio::test]
async fn collection_names_fold_case_and_split_namespaces() {
    let store = store(FakeEngine::new());
    let body = doc(json!({}));

    store
        .insert(&CollectionDef::new("Docs.People"), "d1", &body)
        .await
        .unwrap();

    assert!(matches!(
        &store.engine().calls()[1],
        Call::Execute(sql, _) if sql.starts_with("INSERT INTO docs.people ")
    ));
}

#[tokio::test]
async fn default_schema_qualifies_unprefixed_collections() {
    let store = SqlDocumentStore::with_options(
        FakeEngine::new(),
        SqlStoreOptions::new().schema("docs"),
    );

    store.delete(&people(), "d1").await.unwrap();

    assert!(matches!(
        &store.engine().calls()[1],
        Call::Execute(sql, _) if sql == "DELETE FROM docs.people WHERE id = :p0"
    ));
}

#[tokio::test]
async fn has_collection_escapes_like_metacharacters() {
    let store = store(FakeEngine::new().with_tables(&["user_events"]));

    assert!(store.has_collection("user_events").await.unwrap());
    assert_eq!(
        store.engine().calls(),
        vec![Call::ListTables(None, "user\\_events".to_string())]
    );
}

#[tokio::test]
async fn list_collections_with_prefix_appends_a_wildcard() {
    let store = store(FakeEngine::new().with_tables(&["user_events", "user_profiles"]));

    let names = store.list_collections_with_prefix("User_").await.unwrap();

    assert_eq!(names, vec!["user_events", "user_profiles"]);
    assert_eq!(
        store.engine().calls(),
        vec![Call::ListTables(None, "user\\_%".to_string())]
    );
}

#[tokio::test]
async fn index_lifecycle_round_trip() {
    let store = store(FakeEngine::new().with_indexes(&["ix_age"]));
    let def = people_with_age();

    assert!(store.has_index(&def, "ix_age").await.unwrap());
    assert!(!store.has_index(&def, "ix_name").await.unwrap());

    let drop = IndexRef::from(
        IndexDef::metadata(
            vec![MetadataColumn::new("age", "BIGINT")],
            IndexDef::field("metadata.age", Direction::Asc, false).named("ix_age"),
        ),
    );
    store.drop_index(&def, &drop).await.unwrap();

    let calls = store.engine().calls();
    assert_eq!(
        &calls[calls.len() - 4..],
        &[
            Call::Begin,
            Call::Execute("DROP INDEX ix_age".to_string(), vec![]),
            Call::Execute("ALTER TABLE people DROP COLUMN age".to_string(), vec![]),
            Call::Commit,
        ]
    );
}

#[tokio::test]
async fn dropping_an_unnamed_index_is_a_configuration_error() {
    let store = store(FakeEngine::new());
    let unnamed = IndexRef::from(IndexDef::field("age", Direction::Asc, false));

    let result = store.drop_index(&people(), &unnamed).await;

    assert!(matches!(result, Err(DocumentStoreError::Configuration(_))));
    assert!(store.engine().calls().is_empty());
}
