//! A small in-memory catalog used to drive the crate's RPC surface
//! end-to-end. Grounded on the `users`/`products` shape from the
//! end-to-end scenarios: one schema `main` holding two tables, one of
//! which accepts inserts, row-id-keyed updates/deletes, and reports
//! column statistics.

use airport_flight::catalog::ddl::{CreateSchema, IfExists};
use airport_flight::catalog::dml::{ColumnStats, DmlResult, InsertRows, UpdateByBatch};
use airport_flight::catalog::table::BatchStream;
use airport_flight::catalog::transaction::{BeginTransaction, Transaction, TransactionState};
use airport_flight::catalog::{Catalog, Schema as CatalogSchema, Table};
use airport_flight::error::{AirportError, Result};
use airport_flight::scan::ScanOptions;
use arrow::array::{Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// `users(id:int64 [rowid], name:string, email:string)`, backed by a
/// `Vec<RecordBatch>` behind a mutex so insert/update/delete can mutate it.
pub struct UsersTable {
    schema: SchemaRef,
    rows: Mutex<Vec<(i64, String, String)>>,
}

impl UsersTable {
    fn new() -> Self {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false).with_metadata(
                [(airport_flight::catalog::FIELD_META_IS_ROWID.to_string(), "true".to_string())]
                    .into_iter()
                    .collect(),
            ),
            Field::new("name", DataType::Utf8, false),
            Field::new("email", DataType::Utf8, false),
        ]));
        Self {
            schema,
            rows: Mutex::new(Vec::new()),
        }
    }

    fn to_batch(&self, rows: &[(i64, String, String)]) -> RecordBatch {
        let ids = Int64Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>());
        let names = StringArray::from(rows.iter().map(|r| r.1.clone()).collect::<Vec<_>>());
        let emails = StringArray::from(rows.iter().map(|r| r.2.clone()).collect::<Vec<_>>());
        RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![Arc::new(ids), Arc::new(names), Arc::new(emails)],
        )
        .expect("well-formed users batch")
    }
}

#[async_trait]
impl Table for UsersTable {
    fn name(&self) -> &str {
        "users"
    }

    fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    async fn scan(&self, _options: ScanOptions) -> Result<BatchStream> {
        let rows = self.rows.lock().expect("lock poisoned").clone();
        let batch = self.to_batch(&rows);
        Ok(stream::once(async move { Ok(batch) }).boxed())
    }

    fn as_insert_rows(&self) -> Option<&dyn InsertRows> {
        Some(self)
    }

    fn as_update_by_batch(&self) -> Option<&dyn UpdateByBatch> {
        Some(self)
    }

    fn as_column_statistics(&self) -> Option<&dyn airport_flight::catalog::dml::ColumnStatistics> {
        Some(self)
    }
}

#[async_trait]
impl InsertRows for UsersTable {
    async fn insert_batch(&self, batch: RecordBatch, returning: bool) -> Result<DmlResult> {
        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("id column is Int64");
        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("name column is Utf8");
        let emails = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("email column is Utf8");

        let mut inserted = Vec::with_capacity(batch.num_rows());
        {
            let mut rows = self.rows.lock().expect("lock poisoned");
            for i in 0..batch.num_rows() {
                let row = (ids.value(i), names.value(i).to_string(), emails.value(i).to_string());
                rows.push(row.clone());
                inserted.push(row);
            }
        }

        let returning_stream = if returning {
            let batch = self.to_batch(&inserted);
            Some(stream::once(async move { Ok(batch) }).boxed())
        } else {
            None
        };

        Ok(DmlResult {
            affected_rows: batch.num_rows() as i64,
            returning: returning_stream,
        })
    }
}

#[async_trait]
impl UpdateByBatch for UsersTable {
    async fn update_batch(&self, batch: RecordBatch, _returning: bool) -> Result<DmlResult> {
        // Reaching this point means the pump already rejected null rowids;
        // a real storage still re-validates here.
        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("id column is Int64");
        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("name column is Utf8");

        let mut rows = self.rows.lock().expect("lock poisoned");
        let mut changed = 0i64;
        for i in 0..batch.num_rows() {
            if let Some(row) = rows.iter_mut().find(|r| r.0 == ids.value(i)) {
                row.1 = names.value(i).to_string();
                changed += 1;
            }
        }
        Ok(DmlResult::affected(changed))
    }
}

#[async_trait]
impl airport_flight::catalog::dml::ColumnStatistics for UsersTable {
    async fn column_statistics(&self, column: &str, _duckdb_type: &str) -> Result<ColumnStats> {
        let rows = self.rows.lock().expect("lock poisoned");
        if column == "id" {
            return Ok(ColumnStats {
                has_not_null: Some(true),
                has_null: Some(false),
                distinct_count: Some(rows.len() as u64),
                min: Some(Arc::new(Int64Array::from(vec![rows.iter().map(|r| r.0).min()]))),
                max: Some(Arc::new(Int64Array::from(vec![rows.iter().map(|r| r.0).max()]))),
                max_string_length: None,
                contains_unicode: None,
            });
        }
        Ok(ColumnStats::default())
    }
}

/// `products(id:int64, name:string, price:float64)`; read-only.
pub struct ProductsTable {
    schema: SchemaRef,
}

impl ProductsTable {
    fn new() -> Self {
        Self {
            schema: Arc::new(Schema::new(vec![
                Field::new("id", DataType::Int64, false),
                Field::new("name", DataType::Utf8, false),
                Field::new("price", DataType::Float64, false),
            ])),
        }
    }
}

#[async_trait]
impl Table for ProductsTable {
    fn name(&self) -> &str {
        "products"
    }

    fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    async fn scan(&self, _options: ScanOptions) -> Result<BatchStream> {
        let schema = Arc::clone(&self.schema);
        let batch = RecordBatch::new_empty(schema);
        Ok(stream::once(async move { Ok(batch) }).boxed())
    }
}

pub struct MainSchema {
    tables: Vec<Arc<dyn Table>>,
}

impl MainSchema {
    fn new() -> Self {
        Self {
            tables: vec![Arc::new(UsersTable::new()), Arc::new(ProductsTable::new())],
        }
    }
}

#[async_trait]
impl CatalogSchema for MainSchema {
    fn name(&self) -> &str {
        "main"
    }

    async fn tables(&self) -> Result<Vec<Arc<dyn Table>>> {
        Ok(self.tables.clone())
    }
}

/// The root catalog. Implements `BeginTransaction`/`Transaction` so the
/// transaction verbs have something to call; deliberately does NOT
/// implement `CreateSchema`, so `create_schema` against it exercises the
/// capability-probing / `unimplemented` path.
pub struct TestCatalog {
    schema: Arc<MainSchema>,
    version: AtomicU64,
    next_tx: AtomicI64,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self {
            schema: Arc::new(MainSchema::new()),
            version: AtomicU64::new(1),
            next_tx: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl Catalog for TestCatalog {
    fn name(&self) -> &str {
        ""
    }

    async fn schemas(&self) -> Result<Vec<Arc<dyn CatalogSchema>>> {
        Ok(vec![self.schema.clone() as Arc<dyn CatalogSchema>])
    }

    async fn version(&self) -> Result<airport_flight::catalog::CatalogVersion> {
        Ok(airport_flight::catalog::CatalogVersion {
            version: self.version.load(Ordering::SeqCst),
            fixed: false,
        })
    }

    fn as_begin_transaction(&self) -> Option<&dyn BeginTransaction> {
        Some(self)
    }

    fn as_transaction(&self) -> Option<&dyn Transaction> {
        Some(self)
    }
}

#[async_trait]
impl BeginTransaction for TestCatalog {
    async fn begin_transaction(&self) -> Result<String> {
        let id = self.next_tx.fetch_add(1, Ordering::SeqCst);
        Ok(format!("tx-{id}"))
    }
}

#[async_trait]
impl Transaction for TestCatalog {
    async fn status(&self, tx_id: &str) -> Result<TransactionState> {
        if tx_id.starts_with("tx-") {
            Ok(TransactionState::Active)
        } else {
            Err(AirportError::not_found(format!("no transaction '{tx_id}'")))
        }
    }

    async fn commit(&self, _tx_id: &str) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self, _tx_id: &str) -> Result<()> {
        Ok(())
    }
}

/// A catalog that only implements `CreateSchema`, used to exercise the
/// success path of DDL capability probing.
pub struct DynamicCatalog {
    schemas: Mutex<Vec<String>>,
}

impl DynamicCatalog {
    pub fn new() -> Self {
        Self {
            schemas: Mutex::new(vec!["main".to_string()]),
        }
    }
}

struct EmptySchema(String);

#[async_trait]
impl CatalogSchema for EmptySchema {
    fn name(&self) -> &str {
        &self.0
    }

    async fn tables(&self) -> Result<Vec<Arc<dyn Table>>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl Catalog for DynamicCatalog {
    fn name(&self) -> &str {
        ""
    }

    async fn schemas(&self) -> Result<Vec<Arc<dyn CatalogSchema>>> {
        Ok(self
            .schemas
            .lock()
            .expect("lock poisoned")
            .iter()
            .cloned()
            .map(|name| Arc::new(EmptySchema(name)) as Arc<dyn CatalogSchema>)
            .collect())
    }

    fn as_create_schema(&self) -> Option<&dyn CreateSchema> {
        Some(self)
    }
}

#[async_trait]
impl CreateSchema for DynamicCatalog {
    async fn create_schema(&self, name: &str, if_exists: IfExists) -> Result<()> {
        let mut schemas = self.schemas.lock().expect("lock poisoned");
        if schemas.iter().any(|s| s == name) {
            return match if_exists {
                IfExists::Error => Err(AirportError::already_exists(format!("schema '{name}' exists"))),
                IfExists::Ignore | IfExists::Replace => Ok(()),
            };
        }
        schemas.push(name.to_string());
        Ok(())
    }
}
