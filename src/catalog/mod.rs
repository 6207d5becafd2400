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

//! The capability model the server consumes from user code.
//!
//! A catalog is polymorphic over an optional capability set; the server
//! probes for a capability with `as_*` accessor methods on the base trait
//! rather than runtime type reflection, so a missing capability is a plain
//! `None` at the call site (see DESIGN.md OQ-1).

pub mod ddl;
pub mod dml;
pub mod function;
pub mod table;
pub mod transaction;

pub use ddl::{CreateSchema, CreateTable, DropSchema, DropTable, RenameTable};
pub use dml::{
    AddColumn, AddField, ChangeColumnType, ColumnStatistics, DeleteByBatch, DeleteByRowIdSlice,
    DropNotNull, InsertRows, RemoveColumn, RemoveField, RenameColumn, RenameField, SetDefault,
    SetNotNull, UpdateByBatch, UpdateByRowIdSlice,
};
pub use function::{InOutTableFunction, ScalarFunction, TableFunction};
pub use table::Table;
pub use transaction::{BeginTransaction, Transaction, TransactionState};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Metadata key marking a pseudo-column used for UPDATE/DELETE targeting.
pub const FIELD_META_IS_ROWID: &str = "is_rowid";
/// Metadata key marking a field whose concrete type is not constrained.
pub const FIELD_META_IS_ANY_TYPE: &str = "is_any_type";

/// A process-wide catalog version handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogVersion {
    pub version: u64,
    /// `true` tells the client the version is stable for the session.
    pub fixed: bool,
}

/// The root of a catalog tree.
///
/// Implementors are required to be safe for concurrent call: the server may
/// invoke any method from multiple tasks simultaneously.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// The catalog's own name; used as the multi-catalog router key.
    fn name(&self) -> &str;

    /// Lazily lists the schemas in this catalog.
    async fn schemas(&self) -> Result<Vec<Arc<dyn Schema>>>;

    /// Looks up a single schema by exact, case-sensitive name.
    async fn schema(&self, name: &str) -> Result<Option<Arc<dyn Schema>>> {
        Ok(self
            .schemas()
            .await?
            .into_iter()
            .find(|s| s.name() == name))
    }

    /// The current catalog version. Every successful DDL verb must cause
    /// this to advance.
    async fn version(&self) -> Result<CatalogVersion> {
        Ok(CatalogVersion {
            version: 0,
            fixed: true,
        })
    }

    fn as_create_schema(&self) -> Option<&dyn CreateSchema> {
        None
    }

    fn as_drop_schema(&self) -> Option<&dyn DropSchema> {
        None
    }

    fn as_begin_transaction(&self) -> Option<&dyn BeginTransaction> {
        None
    }

    fn as_transaction(&self) -> Option<&dyn Transaction> {
        None
    }
}

/// A schema: a named container of tables and functions.
#[async_trait]
pub trait Schema: Send + Sync {
    fn name(&self) -> &str;
    fn comment(&self) -> Option<&str> {
        None
    }

    async fn tables(&self) -> Result<Vec<Arc<dyn Table>>>;
    async fn table(&self, name: &str) -> Result<Option<Arc<dyn Table>>> {
        Ok(self.tables().await?.into_iter().find(|t| t.name() == name))
    }

    async fn scalar_functions(&self) -> Result<Vec<Arc<dyn ScalarFunction>>> {
        Ok(Vec::new())
    }

    async fn table_functions(&self) -> Result<Vec<Arc<dyn TableFunction>>> {
        Ok(Vec::new())
    }

    async fn in_out_table_functions(&self) -> Result<Vec<Arc<dyn InOutTableFunction>>> {
        Ok(Vec::new())
    }

    fn as_create_table(&self) -> Option<&dyn CreateTable> {
        None
    }

    fn as_drop_table(&self) -> Option<&dyn DropTable> {
        None
    }

    fn as_rename_table(&self) -> Option<&dyn RenameTable> {
        None
    }
}
