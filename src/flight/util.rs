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

//! Small helpers shared across the RPC handlers: descriptor-path parsing,
//! header extraction, and Arrow schema IPC serialization.

use crate::catalog::{Catalog, Schema as CatalogSchema};
use crate::catalog::table::Table;
use crate::error::AirportError;
use crate::flight::middleware::Identity;
use crate::router::CatalogRouter;
use arrow::datatypes::Schema;
use arrow_flight::{IpcMessage, SchemaAsIpc};
use arrow_ipc::writer::IpcWriteOptions;
use bytes::Bytes;
use std::sync::Arc;

pub const CATALOG_HEADER: &str = "airport-catalog";

/// `path = [catalog?, schema, table]`: a 3-element path carries an
/// explicit catalog name, a 2-element path leaves catalog selection to
/// the `airport-catalog` request header.
pub fn parse_table_path(path: &[String]) -> Result<(Option<String>, String, String), AirportError> {
    match path {
        [catalog, schema, table] => Ok((Some(catalog.clone()), schema.clone(), table.clone())),
        [schema, table] => Ok((None, schema.clone(), table.clone())),
        _ => Err(AirportError::invalid_argument(
            "path must be [catalog?, schema, table]",
        )),
    }
}

pub fn catalog_header(metadata: &tonic::metadata::MetadataMap) -> Option<String> {
    metadata
        .get(CATALOG_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn identity(extensions: &http::Extensions) -> Option<String> {
    extensions.get::<Identity>().map(|i| i.0.clone())
}

/// Resolves `[catalog?, schema, table]` against the router: an explicit
/// path catalog name wins over the `airport-catalog` header.
pub async fn resolve_table(
    router: &CatalogRouter,
    path_catalog: Option<&str>,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    schema_name: &str,
    table_name: &str,
) -> Result<(Arc<dyn Catalog>, Arc<dyn CatalogSchema>, Arc<dyn Table>), AirportError> {
    let catalog_name = path_catalog.or(header_catalog);
    let catalog = router.resolve(catalog_name, identity).await?;
    let schema = catalog.schema(schema_name).await?.ok_or_else(|| {
        AirportError::not_found(format!("no schema named '{schema_name}'"))
    })?;
    let table = schema.table(table_name).await?.ok_or_else(|| {
        AirportError::not_found(format!("no table named '{table_name}' in schema '{schema_name}'"))
    })?;
    Ok((catalog, schema, table))
}

pub fn serialize_schema(schema: &Schema) -> Result<Bytes, AirportError> {
    let message: IpcMessage = SchemaAsIpc::new(schema, &IpcWriteOptions::default())
        .try_into()
        .map_err(|e| AirportError::internal(format!("failed to serialize schema: {e}")))?;
    let IpcMessage(bytes) = message;
    Ok(bytes)
}

/// The inverse of [`serialize_schema`]: decodes a schema-only Arrow IPC
/// message. DDL action bodies that carry a client-supplied schema (table
/// creation, column/field addition, type changes) wrap these bytes in a
/// msgpack envelope.
pub fn deserialize_schema(bytes: &[u8]) -> Result<Schema, AirportError> {
    arrow_ipc::convert::try_schema_from_flatbuffer_bytes(bytes)
        .map_err(|e| AirportError::invalid_argument(format!("malformed schema IPC bytes: {e}")))
}

/// Encodes a single batch as a self-contained Arrow IPC stream (schema
/// message, one batch message, end-of-stream marker). Table function
/// tickets embed the parameter row this way so the ticket needs no
/// server-side state to decode.
pub fn encode_params_ipc(batch: &arrow::record_batch::RecordBatch) -> Result<Vec<u8>, AirportError> {
    let mut buffer = Vec::new();
    {
        let mut writer = arrow_ipc::writer::StreamWriter::try_new(&mut buffer, &batch.schema())
            .map_err(|e| AirportError::internal(format!("failed to open IPC stream writer: {e}")))?;
        writer
            .write(batch)
            .map_err(|e| AirportError::internal(format!("failed to write parameter batch: {e}")))?;
        writer
            .finish()
            .map_err(|e| AirportError::internal(format!("failed to finish IPC stream: {e}")))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_element_path_with_catalog() {
        let path = vec!["cat".to_string(), "main".to_string(), "users".to_string()];
        let (catalog, schema, table) = parse_table_path(&path).expect("parse");
        assert_eq!(catalog.as_deref(), Some("cat"));
        assert_eq!(schema, "main");
        assert_eq!(table, "users");
    }

    #[test]
    fn parses_two_element_path_without_catalog() {
        let path = vec!["main".to_string(), "users".to_string()];
        let (catalog, schema, table) = parse_table_path(&path).expect("parse");
        assert_eq!(catalog, None);
        assert_eq!(schema, "main");
        assert_eq!(table, "users");
    }

    #[test]
    fn rejects_malformed_path() {
        let path = vec!["only_one".to_string()];
        let err = parse_table_path(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
