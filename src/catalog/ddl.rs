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

//! Catalog- and schema-level DDL capabilities.

use super::Table;
use crate::error::Result;
use arrow_schema::Schema;
use async_trait::async_trait;
use std::sync::Arc;

/// Conflict policy for `create_table` / `create_schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    Error,
    Ignore,
    Replace,
}

#[async_trait]
pub trait CreateSchema: Send + Sync {
    async fn create_schema(&self, name: &str, if_exists: IfExists) -> Result<()>;
}

#[async_trait]
pub trait DropSchema: Send + Sync {
    /// `drop_schema` fails with `precondition` when the schema is
    /// non-empty; the dispatcher enforces this before calling, but
    /// implementations MUST also refuse a non-empty schema defensively.
    async fn drop_schema(&self, name: &str, if_not_found_ignore: bool) -> Result<()>;
}

#[async_trait]
pub trait CreateTable: Send + Sync {
    /// `arrow_schema` arrives deserialized from the client's IPC bytes.
    async fn create_table(
        &self,
        name: &str,
        arrow_schema: &Schema,
        if_exists: IfExists,
    ) -> Result<Arc<dyn Table>>;
}

#[async_trait]
pub trait DropTable: Send + Sync {
    async fn drop_table(&self, name: &str, if_not_found_ignore: bool) -> Result<()>;
}

#[async_trait]
pub trait RenameTable: Send + Sync {
    async fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()>;
}
