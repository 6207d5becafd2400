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

//! Catalog snapshot serialization for the `list_schemas` verb.

use crate::catalog::function::{FunctionSignature, InOutTableFunction, ScalarFunction, TableFunction};
use crate::catalog::Catalog;
use crate::codec::{msgpack, zstd};
use crate::error::Result;
use arrow::datatypes::DataType;
use arrow::ipc::writer::{IpcWriteOptions, StreamWriter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub name: String,
    pub comment: Option<String>,
    pub tables: Vec<TableRecord>,
    pub scalar_functions: Vec<FunctionRecord>,
    pub table_functions: Vec<FunctionRecord>,
    pub in_out_table_functions: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub name: String,
    pub comment: Option<String>,
    #[serde(with = "serde_bytes")]
    pub arrow_schema_ipc: Vec<u8>,
    pub can_produce_statistics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    /// `None` is the "any" sentinel type.
    pub data_type: Option<String>,
    pub is_table_input: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub comment: Option<String>,
    pub parameters: Vec<ParameterRecord>,
    /// `None` for table functions whose schema is only known at call time.
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub schemas: Vec<SchemaRecord>,
}

fn signature_to_record(name: &str, comment: Option<&str>, sig: FunctionSignature) -> FunctionRecord {
    FunctionRecord {
        name: name.to_string(),
        comment: comment.map(str::to_string),
        parameters: sig
            .parameters
            .into_iter()
            .map(|p| ParameterRecord {
                name: p.name,
                data_type: p.data_type.as_ref().map(data_type_name),
                is_table_input: p.is_table_input,
            })
            .collect(),
        return_type: sig.return_type.as_ref().map(data_type_name),
    }
}

fn data_type_name(dt: &DataType) -> String {
    format!("{dt:?}")
}

fn schema_to_ipc_bytes(schema: &arrow::datatypes::Schema) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new_with_options(&mut buf, schema, IpcWriteOptions::default())
            .map_err(|e| crate::error::AirportError::internal(format!("failed to build schema IPC: {e}")))?;
        writer
            .finish()
            .map_err(|e| crate::error::AirportError::internal(format!("failed to finish schema IPC: {e}")))?;
    }
    Ok(buf)
}

/// Builds the full catalog snapshot document by walking every
/// schema/table/function the catalog reports.
pub async fn build_snapshot(catalog: &dyn Catalog) -> Result<CatalogSnapshot> {
    let mut schemas = Vec::new();
    for schema in catalog.schemas().await? {
        let mut tables = Vec::new();
        for table in schema.tables().await? {
            tables.push(TableRecord {
                name: table.name().to_string(),
                comment: table.comment().map(str::to_string),
                arrow_schema_ipc: schema_to_ipc_bytes(&table.arrow_schema())?,
                can_produce_statistics: table.can_produce_statistics(),
            });
        }

        let scalar_functions: Vec<FunctionRecord> = schema
            .scalar_functions()
            .await?
            .iter()
            .map(|f: &std::sync::Arc<dyn ScalarFunction>| {
                signature_to_record(f.name(), f.comment(), f.signature())
            })
            .collect();

        let table_functions: Vec<FunctionRecord> = schema
            .table_functions()
            .await?
            .iter()
            .map(|f: &std::sync::Arc<dyn TableFunction>| {
                signature_to_record(f.name(), f.comment(), f.signature())
            })
            .collect();

        let in_out_table_functions: Vec<FunctionRecord> = schema
            .in_out_table_functions()
            .await?
            .iter()
            .map(|f: &std::sync::Arc<dyn InOutTableFunction>| {
                signature_to_record(f.name(), f.comment(), f.signature())
            })
            .collect();

        schemas.push(SchemaRecord {
            name: schema.name().to_string(),
            comment: schema.comment().map(str::to_string),
            tables,
            scalar_functions,
            table_functions,
            in_out_table_functions,
        });
    }

    Ok(CatalogSnapshot { schemas })
}

/// Serializes a snapshot to the required wire shape: an outer msgpack
/// tuple `[uncompressed_len, zstd(msgpack(snapshot))]`.
pub fn encode_snapshot_wire(snapshot: &CatalogSnapshot, compression_level: i32) -> Result<Vec<u8>> {
    let body = msgpack::encode(snapshot)?;
    zstd::wrap(&body, compression_level)
}

/// Inverse of [`encode_snapshot_wire`]; exercised by tests and by clients
/// under test that need to assert on what the server emitted.
pub fn decode_snapshot_wire(wire_bytes: &[u8]) -> Result<CatalogSnapshot> {
    let body = zstd::unwrap(wire_bytes)?;
    msgpack::decode(&body)
}
