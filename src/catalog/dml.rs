/*
Copyright 2024-2025 The Airport Flight Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! DML capabilities and the column/struct-field DDL
//! capabilities that mutate an existing table.

use crate::error::Result;
use arrow::array::RecordBatch;
use arrow_schema::Schema;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// The result of a DML call against one input batch. Affected-row counts
/// from successive calls are summed by the exchange pump and communicated
/// once, in the trailing `app_metadata` of the final outbound message
///. `-1` means "unknown".
pub struct DmlResult {
    pub affected_rows: i64,
    /// RETURNING rows produced by this batch, in submission order.
    pub returning: Option<BoxStream<'static, Result<RecordBatch>>>,
}

impl DmlResult {
    #[must_use]
    pub fn affected(count: i64) -> Self {
        Self {
            affected_rows: count,
            returning: None,
        }
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self::affected(-1)
    }
}

#[async_trait]
pub trait InsertRows: Send + Sync {
    /// Inserts one input batch (schema matches the table schema minus any
    /// rowid pseudo-column).
    async fn insert_batch(&self, batch: RecordBatch, returning: bool) -> Result<DmlResult>;
}

/// Legacy UPDATE form: the pump extracts the rowid column into a `Vec<i64>`
/// before calling. Preferred only when `UpdateByBatch` is absent.
#[async_trait]
pub trait UpdateByRowIdSlice: Send + Sync {
    async fn update_batch(
        &self,
        row_ids: Vec<i64>,
        batch: RecordBatch,
        returning: bool,
    ) -> Result<DmlResult>;
}

/// Preferred UPDATE form: receives the full batch, including the rowid
/// column identified by name `rowid` or per-field metadata `is_rowid`.
#[async_trait]
pub trait UpdateByBatch: Send + Sync {
    async fn update_batch(&self, batch: RecordBatch, returning: bool) -> Result<DmlResult>;
}

#[async_trait]
pub trait DeleteByRowIdSlice: Send + Sync {
    async fn delete_batch(&self, row_ids: Vec<i64>, returning: bool) -> Result<DmlResult>;
}

#[async_trait]
pub trait DeleteByBatch: Send + Sync {
    /// `batch` contains only the rowid column.
    async fn delete_batch(&self, batch: RecordBatch, returning: bool) -> Result<DmlResult>;
}

/// Column statistics for one column. Fields a table can't
/// compute are left `None`; the caller serializes them as Arrow nulls.
#[derive(Debug, Clone, Default)]
pub struct ColumnStats {
    pub has_not_null: Option<bool>,
    pub has_null: Option<bool>,
    pub distinct_count: Option<u64>,
    /// A single-element array holding the value, matching the column's
    /// declared Arrow type (arrow-rs has no standalone scalar type).
    pub min: Option<arrow::array::ArrayRef>,
    pub max: Option<arrow::array::ArrayRef>,
    pub max_string_length: Option<u64>,
    pub contains_unicode: Option<bool>,
}

#[async_trait]
pub trait ColumnStatistics: Send + Sync {
    async fn column_statistics(&self, column: &str, duckdb_type: &str) -> Result<ColumnStats>;
}

#[async_trait]
pub trait AddColumn: Send + Sync {
    /// `field_schema` is a single-field Arrow schema (deserialized from the
    /// client's IPC bytes).
    async fn add_column(&self, field_schema: &Schema) -> Result<()>;
}

#[async_trait]
pub trait RemoveColumn: Send + Sync {
    async fn remove_column(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait RenameColumn: Send + Sync {
    async fn rename_column(&self, old_name: &str, new_name: &str) -> Result<()>;
}

#[async_trait]
pub trait ChangeColumnType: Send + Sync {
    /// `field_schema` carries the new single-field type; `sql_expression`
    /// is the backend conversion expression supplied by the client.
    async fn change_column_type(&self, field_schema: &Schema, sql_expression: &str) -> Result<()>;
}

#[async_trait]
pub trait SetNotNull: Send + Sync {
    async fn set_not_null(&self, column: &str) -> Result<()>;
}

#[async_trait]
pub trait DropNotNull: Send + Sync {
    async fn drop_not_null(&self, column: &str) -> Result<()>;
}

#[async_trait]
pub trait SetDefault: Send + Sync {
    async fn set_default(&self, column: &str, default_sql_expression: Option<&str>) -> Result<()>;
}

/// Struct-field mutation capabilities on a struct-typed column.
#[async_trait]
pub trait AddField: Send + Sync {
    async fn add_field(&self, column: &str, field_schema: &Schema) -> Result<()>;
}

#[async_trait]
pub trait RenameField: Send + Sync {
    async fn rename_field(&self, column: &str, old_name: &str, new_name: &str) -> Result<()>;
}

#[async_trait]
pub trait RemoveField: Send + Sync {
    async fn remove_field(&self, column: &str, field_name: &str) -> Result<()>;
}
