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

//! `endpoints`, `flight_info`, and `table_function_flight_info`: action-verb
//! equivalents of `GetFlightInfo` that additionally carry a time-travel
//! point or a table function's call parameters.

use crate::catalog::table::DataUriCall;
use crate::flight::util;
use crate::router::CatalogRouter;
use crate::scan::{ScanOptions, TimePoint};
use crate::ticket::{EntityKind, Ticket};
use arrow_flight::{FlightEndpoint, FlightInfo, Location};
use base64::Engine;
use prost::Message;
use serde::{Deserialize, Serialize};
use tonic::Status;

/// Body of a `data:` URI endpoint: names the local function a client should
/// call instead of requesting this endpoint over `DoGet`, with its single
/// parameter row encoded as an Arrow IPC stream.
#[derive(Serialize)]
struct DataUriFunctionCall {
    function_name: String,
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
}

/// Builds a `data:application/x-msgpack-duckdb-function-call;base64,<b64>`
/// endpoint carrying no ticket, just the local call a client should make.
fn data_uri_endpoint(call: &DataUriCall) -> Result<FlightEndpoint, Status> {
    let data = util::encode_params_ipc(&call.params).map_err(Status::from)?;
    let body = DataUriFunctionCall {
        function_name: call.function_name.clone(),
        data,
    };
    let encoded = crate::codec::msgpack::encode(&body).map_err(Status::from)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(encoded);
    let uri = format!("data:application/x-msgpack-duckdb-function-call;base64,{b64}");
    Ok(FlightEndpoint {
        location: vec![Location { uri }],
        ..Default::default()
    })
}

#[derive(Deserialize)]
struct EndpointsParams {
    catalog: Option<String>,
    schema: String,
    table: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    filter: Option<Vec<u8>>,
    #[serde(default)]
    limit: u64,
    #[serde(default)]
    time_point: Option<TimePoint>,
}

fn encode_flight_info(info: &FlightInfo) -> Vec<u8> {
    info.encode_to_vec()
}

async fn flight_info_for_table(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    catalog: Option<&str>,
    schema_name: &str,
    table_name: &str,
    options: ScanOptions,
) -> Result<FlightInfo, Status> {
    let (catalog_obj, schema_obj, table) =
        util::resolve_table(router, catalog, header_catalog, identity, schema_name, table_name).await?;

    let data_uri_calls = match table.as_data_uri_scan() {
        Some(scan) => scan.data_uri_calls(&options).map_err(Status::from)?,
        None => Vec::new(),
    };

    let endpoints = if data_uri_calls.is_empty() {
        let ticket = Ticket::new(
            catalog_obj.name(),
            schema_obj.name(),
            EntityKind::Table,
            table.name(),
            options,
        )
        .encode()
        .map_err(Status::from)?;
        vec![FlightEndpoint::new().with_ticket(arrow_flight::Ticket { ticket: ticket.into() })]
    } else {
        data_uri_calls
            .iter()
            .map(data_uri_endpoint)
            .collect::<Result<Vec<_>, Status>>()?
    };

    let info = FlightInfo::new()
        .try_with_schema(&table.arrow_schema())
        .map_err(|e| Status::internal(format!("failed to encode schema: {e}")))?;
    let info = endpoints
        .into_iter()
        .fold(info, |info, endpoint| info.with_endpoint(endpoint))
        .with_total_records(-1)
        .with_total_bytes(-1);
    Ok(info)
}

pub async fn endpoints(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>, Status> {
    let params: EndpointsParams = crate::codec::msgpack::decode(body).map_err(Status::from)?;
    let options = ScanOptions {
        columns: params.columns,
        filter: params.filter,
        limit: params.limit,
        batch_size: 0,
        time_point: params.time_point,
    };
    let info = flight_info_for_table(
        router,
        header_catalog,
        identity,
        params.catalog.as_deref(),
        &params.schema,
        &params.table,
        options,
    )
    .await?;
    Ok(encode_flight_info(&info))
}

#[derive(Deserialize)]
struct FlightInfoParams {
    catalog: Option<String>,
    schema: String,
    table: String,
}

pub async fn flight_info(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>, Status> {
    let params: FlightInfoParams = crate::codec::msgpack::decode(body).map_err(Status::from)?;
    let info = flight_info_for_table(
        router,
        header_catalog,
        identity,
        params.catalog.as_deref(),
        &params.schema,
        &params.table,
        ScanOptions::default(),
    )
    .await?;
    Ok(encode_flight_info(&info))
}

#[derive(Deserialize)]
struct TableFunctionFlightInfoParams {
    catalog: Option<String>,
    schema: String,
    function: String,
    /// A self-contained Arrow IPC stream carrying the single parameter row,
    /// produced by the client the way [`super::super::util::encode_params_ipc`]
    /// does on the server side.
    params_ipc: Vec<u8>,
}

pub async fn table_function_flight_info(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>, Status> {
    let params: TableFunctionFlightInfoParams =
        crate::codec::msgpack::decode(body).map_err(Status::from)?;
    let catalog_name = params.catalog.as_deref().or(header_catalog);
    let catalog = router.resolve(catalog_name, identity).await?;
    let schema = catalog
        .schema(&params.schema)
        .await?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", params.schema)))?;
    let functions = schema.table_functions().await?;
    let function = functions
        .into_iter()
        .find(|f| f.name() == params.function)
        .ok_or_else(|| Status::not_found("no table function with that name"))?;

    let ticket = Ticket::new(
        catalog.name(),
        schema.name(),
        EntityKind::TableFunction,
        function.name(),
        ScanOptions::default(),
    )
    .with_params_ipc(params.params_ipc)
    .encode()
    .map_err(Status::from)?;

    let endpoint = FlightEndpoint::new().with_ticket(arrow_flight::Ticket { ticket: ticket.into() });
    let info = FlightInfo::new()
        .with_endpoint(endpoint)
        .with_total_records(-1)
        .with_total_bytes(-1);

    Ok(encode_flight_info(&info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn one_row_params() -> arrow::record_batch::RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("arg_0", DataType::Int32, false)]));
        arrow::record_batch::RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![7]))])
            .expect("batch")
    }

    #[test]
    fn builds_data_uri_endpoint_with_no_ticket() {
        let call = DataUriCall {
            function_name: "read_parquet".to_string(),
            params: one_row_params(),
        };
        let endpoint = data_uri_endpoint(&call).expect("endpoint");
        assert!(endpoint.ticket.is_none());
        assert_eq!(endpoint.location.len(), 1);
        let uri = &endpoint.location[0].uri;
        assert!(uri.starts_with("data:application/x-msgpack-duckdb-function-call;base64,"));

        let b64 = uri.rsplit_once(',').expect("comma").1;
        let bytes = base64::engine::general_purpose::STANDARD.decode(b64).expect("decode base64");
        let decoded: DataUriFunctionCallOwned = crate::codec::msgpack::decode(&bytes).expect("decode msgpack");
        assert_eq!(decoded.function_name, "read_parquet");
        assert!(!decoded.data.is_empty());
    }

    #[derive(serde::Deserialize)]
    struct DataUriFunctionCallOwned {
        function_name: String,
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    }
}
