//! The document store façade over a relational engine.
//!
//! [`SqlDocumentStore`] implements the full [`DocumentBackend`] contract by
//! compiling filters, order specifications, and projections into SQL and
//! executing the statements through a [`SqlEngine`]. Every collection is one
//! table: a text identifier column (primary key), a JSON document column, and
//! one additional natively-typed column per promoted metadata field.
//!
//! Mutating operations run inside a scoped transaction (begin, body, commit on
//! success, rollback and rethrow on failure) when the store manages
//! transactions; with management disabled the caller is assumed to hold an
//! ambient transaction and statements execute directly. Transactions are not
//! nested.

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

use async_trait::async_trait;

use reldoc_core::{
    backend::{DocStream, DocumentBackend},
    collection::CollectionDef,
    document::{Doc, METADATA_KEY},
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
    find::FindOptions,
    index::{IndexDef, IndexRef, MetadataColumn},
    select::PartialSelect,
};

use crate::{
    engine::{NamedParam, SqlEngine, SqlRow, SqlValue},
    filter::{CompiledFilter, compile_filter},
    index, order,
    params::SqlParams,
    path::{DOC_COLUMN, ID_COLUMN},
    project::{compile_select, reassemble},
};

/// Store-level options.
#[derive(Debug, Clone)]
pub struct SqlStoreOptions {
    /// Default namespace for collections whose name carries no explicit
    /// qualifier. `None` uses the engine session's default namespace.
    pub schema: Option<String>,
    /// Whether the store brackets mutating operations in their own
    /// transaction. Disable when the caller manages an ambient transaction.
    pub manage_transactions: bool,
}

impl Default for SqlStoreOptions {
    fn default() -> Self {
        Self { schema: None, manage_transactions: true }
    }
}

impl SqlStoreOptions {
    /// Default options: session-default namespace, managed transactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default namespace.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Disables transaction management; the caller holds the transaction.
    pub fn ambient_transactions(mut self) -> Self {
        self.manage_transactions = false;
        self
    }
}

/// Physical addressing of one collection: optional namespace plus table name,
/// both already lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableName {
    schema: Option<String>,
    table: String,
}

impl TableName {
    fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }
}

/// Escapes LIKE pattern metacharacters so a name matches only itself.
fn escape_like(name: &str) -> String {
    name.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A document store backend over a relational engine session.
///
/// The instance owns the session handle and is bound to one logical unit of
/// work at a time.
#[derive(Debug)]
pub struct SqlDocumentStore<E: SqlEngine> {
    engine: E,
    options: SqlStoreOptions,
}

impl<E: SqlEngine> SqlDocumentStore<E> {
    /// Creates a store with default options.
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, SqlStoreOptions::default())
    }

    /// Creates a store with explicit options.
    pub fn with_options(engine: E, options: SqlStoreOptions) -> Self {
        Self { engine, options }
    }

    /// The underlying engine session.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn table_name(&self, collection: &str) -> TableName {
        // Lower-case before physical naming so addressing stays
        // case-insensitive under the engine's identifier folding.
        let lowered = collection.to_lowercase();
        match lowered.split_once('.') {
            Some((schema, table)) => {
                TableName { schema: Some(schema.to_string()), table: table.to_string() }
            }
            None => TableName { schema: self.options.schema.clone(), table: lowered },
        }
    }

    async fn begin_managed(&self) -> DocumentStoreResult<bool> {
        if !self.options.manage_transactions {
            return Ok(false);
        }
        self.engine.begin().await?;
        Ok(true)
    }

    /// Concludes a managed scope: commit on success, rollback and rethrow the
    /// original error on failure. A rollback failure is logged, never
    /// substituted for the original error.
    async fn conclude<T>(
        &self,
        managed: bool,
        outcome: DocumentStoreResult<T>,
    ) -> DocumentStoreResult<T> {
        if !managed {
            return outcome;
        }
        match outcome {
            Ok(value) => {
                self.engine.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = self.engine.rollback().await {
                    warn!(%error, %rollback, "rollback failed after statement error");
                }
                Err(error)
            }
        }
    }

    async fn fetch_optional(
        &self,
        sql: &str,
        params: &[NamedParam],
    ) -> DocumentStoreResult<Option<SqlRow>> {
        let mut rows = self.engine.query(sql, params).await?;
        rows.next().await.transpose()
    }

    async fn exists(&self, table: &TableName, id: &str) -> DocumentStoreResult<bool> {
        let mut params = SqlParams::new();
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "SELECT {ID_COLUMN} FROM {} WHERE {ID_COLUMN} = {id_param}",
            table.qualified()
        );
        Ok(self
            .fetch_optional(&sql, params.as_slice())
            .await?
            .is_some())
    }

    async fn create_collection_inner(&self, def: &CollectionDef) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        debug!(collection = %def.name, table = %table.qualified(), "creating collection");
        let sql = format!(
            "CREATE TABLE {} ({ID_COLUMN} TEXT PRIMARY KEY, {DOC_COLUMN} JSONB NOT NULL)",
            table.qualified()
        );
        self.engine.execute(&sql, &[]).await?;
        for index in &def.indexes {
            self.create_index_inner(def, &table, index).await?;
        }
        Ok(())
    }

    async fn create_index_inner(
        &self,
        def: &CollectionDef,
        table: &TableName,
        index: &IndexDef,
    ) -> DocumentStoreResult<()> {
        for statement in index::create_statements(&table.qualified(), def, index) {
            self.engine.execute(&statement, &[]).await?;
        }
        Ok(())
    }

    async fn insert_inner(
        &self,
        def: &CollectionDef,
        id: &str,
        doc: &Doc,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let (body, assignments) = split_metadata(def, doc, true)?;

        let mut params = SqlParams::new();
        let mut columns = vec![ID_COLUMN.to_string(), DOC_COLUMN.to_string()];
        let mut values = vec![
            params.bind(SqlValue::Text(id.to_string())),
            params.bind(SqlValue::Json(Value::Object(body))),
        ];
        for (column, value) in assignments {
            columns.push(column);
            values.push(params.bind(value));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.qualified(),
            columns.join(", "),
            values.join(", ")
        );
        self.engine.execute(&sql, params.as_slice()).await?;
        Ok(())
    }

    async fn update_inner(
        &self,
        def: &CollectionDef,
        id: &str,
        patch: &Doc,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let (body, assignments) = split_metadata(def, patch, false)?;

        let mut params = SqlParams::new();
        let sets = merge_set_list(&mut params, body, assignments);
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "UPDATE {} SET {sets} WHERE {ID_COLUMN} = {id_param}",
            table.qualified()
        );
        // Zero rows affected is an absent id, which is not an error.
        self.engine.execute(&sql, params.as_slice()).await?;
        Ok(())
    }

    async fn replace_inner(
        &self,
        def: &CollectionDef,
        id: &str,
        doc: &Doc,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let (body, assignments) = split_metadata(def, doc, true)?;

        let mut params = SqlParams::new();
        let sets = replace_set_list(&mut params, body, assignments);
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "UPDATE {} SET {sets} WHERE {ID_COLUMN} = {id_param}",
            table.qualified()
        );
        self.engine.execute(&sql, params.as_slice()).await?;
        Ok(())
    }

    fn document_select_list(def: &CollectionDef) -> String {
        let mut list = format!("{ID_COLUMN}, {DOC_COLUMN}");
        for column in def.metadata_columns() {
            list.push_str(", ");
            list.push_str(&column.name);
        }
        list
    }
}

/// SET list for a shallow merge: the patch body merged over the stored
/// document, plus one assignment per metadata column present in the patch.
fn merge_set_list(params: &mut SqlParams, body: Doc, assignments: Vec<NamedParam>) -> String {
    let patch = params.bind(SqlValue::Json(Value::Object(body)));
    let mut sets = vec![format!("{DOC_COLUMN} = {DOC_COLUMN} || {patch}")];
    for (column, value) in assignments {
        sets.push(format!("{column} = {}", params.bind(value)));
    }
    sets.join(", ")
}

/// SET list for a full replace: the body overwritten wholesale, every declared
/// metadata column reassigned (absent fields become NULL).
fn replace_set_list(params: &mut SqlParams, body: Doc, assignments: Vec<NamedParam>) -> String {
    let doc = params.bind(SqlValue::Json(Value::Object(body)));
    let mut sets = vec![format!("{DOC_COLUMN} = {doc}")];
    for (column, value) in assignments {
        sets.push(format!("{column} = {}", params.bind(value)));
    }
    sets.join(", ")
}

/// Splits the reserved `metadata` sub-object out of a document body into
/// physical column assignments. With metadata columns disabled the body passes
/// through untouched, `metadata` key included.
///
/// `exhaustive` assigns every declared column (absent fields become NULL), for
/// insert and full replace; without it only the fields present in the payload
/// are assigned, for partial update.
///
/// # Errors
///
/// Returns a configuration error when `metadata` is not an object or carries a
/// field with no declared column.
fn split_metadata(
    def: &CollectionDef,
    doc: &Doc,
    exhaustive: bool,
) -> DocumentStoreResult<(Doc, Vec<NamedParam>)> {
    let mut body = doc.clone();
    if !def.has_metadata_columns() {
        return Ok((body, Vec::new()));
    }

    let declared = def.metadata_columns();
    let fields = match body.remove(METADATA_KEY) {
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            return Err(DocumentStoreError::Configuration(format!(
                "`{METADATA_KEY}` must be an object when metadata columns are declared, got {other}"
            )));
        }
        None => Doc::new(),
    };
    for field in fields.keys() {
        if !declared.iter().any(|column| column.name == *field) {
            return Err(DocumentStoreError::Configuration(format!(
                "metadata field `{field}` has no declared column on collection `{}`",
                def.name
            )));
        }
    }

    let mut assignments = Vec::new();
    for column in declared {
        match fields.get(&column.name) {
            Some(value) => assignments.push((column.name.clone(), SqlValue::native(value))),
            None if exhaustive => assignments.push((column.name.clone(), SqlValue::Null)),
            None => {}
        }
    }
    Ok((body, assignments))
}

/// Rebuilds the `metadata` sub-object of a fetched document from its promoted
/// column values. NULL columns stay absent; with no non-NULL column the
/// `metadata` key is not re-added at all.
fn rebuild_metadata(doc: &mut Doc, row: &SqlRow, columns: &[MetadataColumn]) {
    let mut metadata = Doc::new();
    for column in columns {
        match row.get(&column.name) {
            Some(SqlValue::Null) | None => {}
            Some(value) => {
                metadata.insert(column.name.clone(), value.clone().into_json());
            }
        }
    }
    if !metadata.is_empty() {
        doc.insert(METADATA_KEY.to_string(), Value::Object(metadata));
    }
}

/// Decodes one full-document row into an `(id, document)` pair, re-attaching
/// promoted metadata fields.
fn decode_document(row: &SqlRow, columns: &[MetadataColumn]) -> DocumentStoreResult<(String, Doc)> {
    let id = match row.get(ID_COLUMN) {
        Some(SqlValue::Text(id)) => id.clone(),
        other => {
            return Err(DocumentStoreError::Serialization(format!(
                "identifier column decoded to {other:?}, expected text"
            )));
        }
    };
    let mut doc = match row.get(DOC_COLUMN).cloned().map(SqlValue::into_json) {
        Some(Value::Object(doc)) => doc,
        other => {
            return Err(DocumentStoreError::Serialization(format!(
                "document column decoded to {other:?}, expected a JSON object"
            )));
        }
    };
    rebuild_metadata(&mut doc, row, columns);
    Ok((id, doc))
}

fn page_sql(options: &FindOptions) -> String {
    let mut sql = String::new();
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(skip) = options.skip {
        sql.push_str(&format!(" OFFSET {skip}"));
    }
    sql
}

fn order_clause(options: &FindOptions, def: &CollectionDef) -> String {
    match &options.order {
        Some(order_by) => order::order_sql(order_by, def),
        None => String::new(),
    }
}

#[async_trait]
impl<E: SqlEngine> DocumentBackend for SqlDocumentStore<E> {
    async fn create_collection(&self, def: &CollectionDef) -> DocumentStoreResult<()> {
        let managed = self.begin_managed().await?;
        let result = self.create_collection_inner(def).await;
        self.conclude(managed, result).await
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let table = self.table_name(name);
        debug!(collection = %name, table = %table.qualified(), "dropping collection");
        let managed = self.begin_managed().await?;
        let result = self
            .engine
            .execute(&format!("DROP TABLE {}", table.qualified()), &[])
            .await
            .map(|_| ());
        self.conclude(managed, result).await
    }

    async fn has_collection(&self, name: &str) -> DocumentStoreResult<bool> {
        let table = self.table_name(name);
        let matches = self
            .engine
            .list_tables(table.schema.as_deref(), &escape_like(&table.table))
            .await?;
        Ok(matches.iter().any(|m| m == &table.table))
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.engine
            .list_tables(self.options.schema.as_deref(), "%")
            .await
    }

    async fn list_collections_with_prefix(&self, prefix: &str) -> DocumentStoreResult<Vec<String>> {
        let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
        self.engine
            .list_tables(self.options.schema.as_deref(), &pattern)
            .await
    }

    async fn create_index(
        &self,
        def: &CollectionDef,
        index: &IndexDef,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let managed = self.begin_managed().await?;
        let result = self.create_index_inner(def, &table, index).await;
        self.conclude(managed, result).await
    }

    async fn drop_index(&self, def: &CollectionDef, index: &IndexRef) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let statements = index::drop_statements(&table.qualified(), table.schema.as_deref(), index)?;
        let managed = self.begin_managed().await?;
        let mut result = Ok(());
        for statement in &statements {
            if let Err(error) = self.engine.execute(statement, &[]).await {
                result = Err(error);
                break;
            }
        }
        self.conclude(managed, result).await
    }

    async fn has_index(&self, def: &CollectionDef, name: &str) -> DocumentStoreResult<bool> {
        let table = self.table_name(&def.name);
        let indexes = self
            .engine
            .list_indexes(table.schema.as_deref(), &table.table)
            .await?;
        Ok(indexes.iter().any(|index| index == name))
    }

    async fn insert(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        let managed = self.begin_managed().await?;
        let result = self.insert_inner(def, id, doc).await;
        self.conclude(managed, result).await
    }

    async fn update(&self, def: &CollectionDef, id: &str, patch: &Doc) -> DocumentStoreResult<()> {
        let managed = self.begin_managed().await?;
        let result = self.update_inner(def, id, patch).await;
        self.conclude(managed, result).await
    }

    async fn replace(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        let managed = self.begin_managed().await?;
        let result = self.replace_inner(def, id, doc).await;
        self.conclude(managed, result).await
    }

    async fn upsert(&self, def: &CollectionDef, id: &str, doc: &Doc) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let managed = self.begin_managed().await?;
        // Read-then-branch: the check and the write are two statements inside
        // one transaction, not a single atomic unit.
        let result = match self.exists(&table, id).await {
            Ok(true) => self.update_inner(def, id, doc).await,
            Ok(false) => self.insert_inner(def, id, doc).await,
            Err(error) => Err(error),
        };
        self.conclude(managed, result).await
    }

    async fn update_where(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        patch: &Doc,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let (body, assignments) = split_metadata(def, patch, false)?;

        let where_sql = compiled.where_sql();
        let CompiledFilter { mut params, .. } = compiled;
        let sets = merge_set_list(&mut params, body, assignments);
        let sql = format!("UPDATE {} SET {sets}{where_sql}", table.qualified());

        let managed = self.begin_managed().await?;
        let result = self
            .engine
            .execute(&sql, params.as_slice())
            .await
            .map(|_| ());
        self.conclude(managed, result).await
    }

    async fn replace_where(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        doc: &Doc,
    ) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let (body, assignments) = split_metadata(def, doc, true)?;

        let where_sql = compiled.where_sql();
        let CompiledFilter { mut params, .. } = compiled;
        let sets = replace_set_list(&mut params, body, assignments);
        let sql = format!("UPDATE {} SET {sets}{where_sql}", table.qualified());

        let managed = self.begin_managed().await?;
        let result = self
            .engine
            .execute(&sql, params.as_slice())
            .await
            .map(|_| ());
        self.conclude(managed, result).await
    }

    async fn delete(&self, def: &CollectionDef, id: &str) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let mut params = SqlParams::new();
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "DELETE FROM {} WHERE {ID_COLUMN} = {id_param}",
            table.qualified()
        );

        let managed = self.begin_managed().await?;
        let result = self
            .engine
            .execute(&sql, params.as_slice())
            .await
            .map(|_| ());
        self.conclude(managed, result).await
    }

    async fn delete_where(&self, def: &CollectionDef, filter: &Filter) -> DocumentStoreResult<()> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let sql = format!("DELETE FROM {}{}", table.qualified(), compiled.where_sql());

        let managed = self.begin_managed().await?;
        let result = self
            .engine
            .execute(&sql, compiled.params.as_slice())
            .await
            .map(|_| ());
        self.conclude(managed, result).await
    }

    async fn get(&self, def: &CollectionDef, id: &str) -> DocumentStoreResult<Option<Doc>> {
        let table = self.table_name(&def.name);
        let mut params = SqlParams::new();
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "SELECT {} FROM {} WHERE {ID_COLUMN} = {id_param}",
            Self::document_select_list(def),
            table.qualified()
        );

        match self.fetch_optional(&sql, params.as_slice()).await? {
            Some(row) => {
                let (_, doc) = decode_document(&row, &def.metadata_columns_owned())?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn get_partial(
        &self,
        def: &CollectionDef,
        id: &str,
        select: &PartialSelect,
    ) -> DocumentStoreResult<Option<Doc>> {
        let table = self.table_name(&def.name);
        let select_list = compile_select(select, def)?;
        let mut params = SqlParams::new();
        let id_param = params.bind(SqlValue::Text(id.to_string()));
        let sql = format!(
            "SELECT {select_list} FROM {} WHERE {ID_COLUMN} = {id_param}",
            table.qualified()
        );

        match self.fetch_optional(&sql, params.as_slice()).await? {
            Some(row) => {
                let (_, doc) = reassemble(&row, select)?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let sql = format!(
            "SELECT {} FROM {}{}{}{}",
            Self::document_select_list(def),
            table.qualified(),
            compiled.where_sql(),
            order_clause(options, def),
            page_sql(options)
        );

        let rows = self.engine.query(&sql, compiled.params.as_slice()).await?;
        let columns = def.metadata_columns_owned();
        Ok(rows
            .map(move |row| row.and_then(|row| decode_document(&row, &columns)))
            .boxed())
    }

    async fn find_partial(
        &self,
        def: &CollectionDef,
        filter: &Filter,
        select: &PartialSelect,
        options: &FindOptions,
    ) -> DocumentStoreResult<DocStream<'static>> {
        let table = self.table_name(&def.name);
        let select_list = compile_select(select, def)?;
        let compiled = compile_filter(filter, def)?;
        let sql = format!(
            "SELECT {select_list} FROM {}{}{}{}",
            table.qualified(),
            compiled.where_sql(),
            order_clause(options, def),
            page_sql(options)
        );

        let rows = self.engine.query(&sql, compiled.params.as_slice()).await?;
        let select = select.clone();
        Ok(rows
            .map(move |row| row.and_then(|row| reassemble(&row, &select)))
            .boxed())
    }

    async fn find_ids(
        &self,
        def: &CollectionDef,
        filter: &Filter,
    ) -> DocumentStoreResult<Vec<String>> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let sql = format!(
            "SELECT {ID_COLUMN} FROM {}{}",
            table.qualified(),
            compiled.where_sql()
        );

        let mut rows = self.engine.query(&sql, compiled.params.as_slice()).await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await {
            match row?.get(ID_COLUMN) {
                Some(SqlValue::Text(id)) => ids.push(id.clone()),
                other => {
                    return Err(DocumentStoreError::Serialization(format!(
                        "identifier column decoded to {other:?}, expected text"
                    )));
                }
            }
        }
        Ok(ids)
    }

    async fn count(&self, def: &CollectionDef, filter: &Filter) -> DocumentStoreResult<u64> {
        let table = self.table_name(&def.name);
        let compiled = compile_filter(filter, def)?;
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {}{}",
            table.qualified(),
            compiled.where_sql()
        );

        let row = self
            .fetch_optional(&sql, compiled.params.as_slice())
            .await?
            .ok_or_else(|| {
                DocumentStoreError::Engine("count query returned no rows".to_string())
            })?;
        match row.get("count") {
            Some(SqlValue::Int(count)) => u64::try_from(*count).map_err(|_| {
                DocumentStoreError::Serialization(format!("negative count: {count}"))
            }),
            other => Err(DocumentStoreError::Serialization(format!(
                "count column decoded to {other:?}, expected an integer"
            ))),
        }
    }
}

/// Owned metadata-column list, for moving into stream decode closures.
trait MetadataColumnsOwned {
    fn metadata_columns_owned(&self) -> Vec<MetadataColumn>;
}

impl MetadataColumnsOwned for CollectionDef {
    fn metadata_columns_owned(&self) -> Vec<MetadataColumn> {
        self.metadata_columns().into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldoc_core::{index::IndexDef, order::Direction};
    use serde_json::json;

    fn age_column_def() -> CollectionDef {
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

    #[test]
    fn like_escaping_neutralizes_wildcards() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn split_metadata_passes_through_without_columns() {
        let def = CollectionDef::new("people");
        let original = doc(json!({"name": "Jack", "metadata": {"age": 5}}));
        let (body, assignments) = split_metadata(&def, &original, true).unwrap();
        assert_eq!(body, original);
        assert!(assignments.is_empty());
    }

    #[test]
    fn split_metadata_extracts_declared_columns() {
        let original = doc(json!({"name": "Jack", "metadata": {"age": 5}}));
        let (body, assignments) = split_metadata(&age_column_def(), &original, true).unwrap();
        assert_eq!(Value::Object(body), json!({"name": "Jack"}));
        assert_eq!(assignments, vec![("age".to_string(), SqlValue::Int(5))]);
    }

    #[test]
    fn exhaustive_split_nulls_absent_columns() {
        let original = doc(json!({"name": "Jack"}));
        let (_, assignments) = split_metadata(&age_column_def(), &original, true).unwrap();
        assert_eq!(assignments, vec![("age".to_string(), SqlValue::Null)]);

        let (_, assignments) = split_metadata(&age_column_def(), &original, false).unwrap();
        assert!(assignments.is_empty());
    }

    #[test]
    fn undeclared_metadata_field_is_rejected() {
        let original = doc(json!({"metadata": {"height": 180}}));
        assert!(matches!(
            split_metadata(&age_column_def(), &original, true),
            Err(DocumentStoreError::Configuration(_))
        ));

        let scalar = doc(json!({"metadata": 5}));
        assert!(matches!(
            split_metadata(&age_column_def(), &scalar, true),
            Err(DocumentStoreError::Configuration(_))
        ));
    }

    #[test]
    fn rebuild_metadata_reattaches_non_null_columns() {
        let row = SqlRow::from_pairs([
            (ID_COLUMN.to_string(), SqlValue::Text("d1".into())),
            (DOC_COLUMN.to_string(), SqlValue::Json(json!({"name": "Jack"}))),
            ("age".to_string(), SqlValue::Int(5)),
        ]);
        let columns = vec![MetadataColumn::new("age", "BIGINT")];
        let (id, rebuilt) = decode_document(&row, &columns).unwrap();
        assert_eq!(id, "d1");
        assert_eq!(
            Value::Object(rebuilt),
            json!({"name": "Jack", "metadata": {"age": 5}})
        );
    }

    #[test]
    fn rebuild_metadata_skips_all_null_columns() {
        let row = SqlRow::from_pairs([
            (ID_COLUMN.to_string(), SqlValue::Text("d1".into())),
            (DOC_COLUMN.to_string(), SqlValue::Json(json!({"name": "Jack"}))),
            ("age".to_string(), SqlValue::Null),
        ]);
        let columns = vec![MetadataColumn::new("age", "BIGINT")];
        let (_, rebuilt) = decode_document(&row, &columns).unwrap();
        assert_eq!(Value::Object(rebuilt), json!({"name": "Jack"}));
    }
}
