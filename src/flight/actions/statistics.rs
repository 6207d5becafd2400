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

//! `column_statistics`: returns a single-row Arrow record describing one
//! column, encoded as a self-contained IPC stream.

use crate::catalog::Catalog;
use crate::codec::msgpack;
use crate::error::AirportError;
use crate::flight::util;
use crate::stats;
use serde::Deserialize;
use tonic::Status;

#[derive(Deserialize)]
struct ColumnStatisticsParams {
    schema: String,
    table: String,
    column: String,
    duckdb_type: String,
}

pub async fn column_statistics(catalog: &dyn Catalog, body: &[u8]) -> Result<Vec<u8>, Status> {
    let params: ColumnStatisticsParams = msgpack::decode(body).map_err(Status::from)?;
    let schema_obj = catalog
        .schema(&params.schema)
        .await?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", params.schema)))?;
    let table = schema_obj
        .table(&params.table)
        .await?
        .ok_or_else(|| {
            Status::not_found(format!(
                "no table named '{}' in schema '{}'",
                params.table, params.schema
            ))
        })?;

    let field = table
        .arrow_schema()
        .field_with_name(&params.column)
        .map_err(|_| Status::not_found(format!("no column named '{}'", params.column)))?
        .clone();

    let capability = table.as_column_statistics().ok_or_else(|| {
        Status::from(AirportError::unimplemented("table does not support column_statistics"))
    })?;

    let column_stats = capability
        .column_statistics(&params.column, &params.duckdb_type)
        .await?;
    let batch = stats::stats_to_record_batch(&column_stats, field.data_type())?;
    util::encode_params_ipc(&batch).map_err(Status::from)
}
