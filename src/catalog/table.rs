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

use super::dml::{
    AddColumn, AddField, ChangeColumnType, ColumnStatistics, DeleteByBatch, DeleteByRowIdSlice,
    DropNotNull, InsertRows, RemoveColumn, RemoveField, RenameColumn, RenameField, SetDefault,
    SetNotNull, UpdateByBatch, UpdateByRowIdSlice,
};
use crate::error::Result;
use crate::scan::ScanOptions;
use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A stream of record batches owned by its producer until it is dropped.
pub type BatchStream = BoxStream<'static, Result<RecordBatch>>;

/// One local function call a client should execute itself, in place of a
/// ticket-based `DoGet` against this server, to read one partition of a
/// table. `params` is the single-row argument batch the client-native
/// reader is invoked with.
pub struct DataUriCall {
    pub function_name: String,
    pub params: RecordBatch,
}

/// Tables that can delegate reads to a client-native local function
/// (e.g. a file reader) instead of streaming through `DoGet`, partitioned
/// into one [`DataUriCall`] per endpoint for parallelism.
pub trait DataUriScan: Send + Sync {
    /// Returns the calls to partition this scan across. An empty vec
    /// means fall back to a normal ticket-based endpoint.
    fn data_uri_calls(&self, options: &ScanOptions) -> Result<Vec<DataUriCall>>;
}

/// A table: the only required capability is `Scan`.
#[async_trait]
pub trait Table: Send + Sync {
    fn name(&self) -> &str;
    fn comment(&self) -> Option<&str> {
        None
    }

    /// The table's full, ordered Arrow schema. Per-field metadata may carry
    /// `is_rowid` / `is_any_type`.
    fn arrow_schema(&self) -> SchemaRef;

    /// Whether this table can produce column statistics; surfaced in the
    /// catalog snapshot so the client doesn't ask for columns the table
    /// declines to produce.
    fn can_produce_statistics(&self) -> bool {
        self.as_column_statistics().is_some()
    }

    /// Scans the table. MUST return batches whose schema equals
    /// `arrow_schema()` regardless of `options.columns`.
    async fn scan(&self, options: ScanOptions) -> Result<BatchStream>;

    fn as_insert_rows(&self) -> Option<&dyn InsertRows> {
        None
    }

    fn as_update_by_row_id_slice(&self) -> Option<&dyn UpdateByRowIdSlice> {
        None
    }

    fn as_update_by_batch(&self) -> Option<&dyn UpdateByBatch> {
        None
    }

    fn as_delete_by_row_id_slice(&self) -> Option<&dyn DeleteByRowIdSlice> {
        None
    }

    fn as_delete_by_batch(&self) -> Option<&dyn DeleteByBatch> {
        None
    }

    fn as_column_statistics(&self) -> Option<&dyn ColumnStatistics> {
        None
    }

    fn as_add_column(&self) -> Option<&dyn AddColumn> {
        None
    }

    fn as_remove_column(&self) -> Option<&dyn RemoveColumn> {
        None
    }

    fn as_rename_column(&self) -> Option<&dyn RenameColumn> {
        None
    }

    fn as_change_column_type(&self) -> Option<&dyn ChangeColumnType> {
        None
    }

    fn as_set_not_null(&self) -> Option<&dyn SetNotNull> {
        None
    }

    fn as_drop_not_null(&self) -> Option<&dyn DropNotNull> {
        None
    }

    fn as_set_default(&self) -> Option<&dyn SetDefault> {
        None
    }

    fn as_add_field(&self) -> Option<&dyn AddField> {
        None
    }

    fn as_rename_field(&self) -> Option<&dyn RenameField> {
        None
    }

    fn as_remove_field(&self) -> Option<&dyn RemoveField> {
        None
    }

    fn as_data_uri_scan(&self) -> Option<&dyn DataUriScan> {
        None
    }
}
