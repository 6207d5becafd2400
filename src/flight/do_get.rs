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

//! `DoGet`: decodes the opaque ticket, re-resolves the table, and streams
//! whatever the user's `Scan` produces as Arrow IPC `FlightData` — no
//! server-side re-batching.

use crate::flight::util;
use crate::router::CatalogRouter;
use crate::ticket::{EntityKind, Ticket};
use arrow::record_batch::RecordBatch;
use arrow_flight::encode::FlightDataEncoderBuilder;
use arrow_flight::error::FlightError;
use arrow_flight::FlightData;
use futures::stream::{BoxStream, StreamExt};
use tonic::{Request, Response, Status};

pub async fn handle(
    router: &CatalogRouter,
    request: Request<arrow_flight::Ticket>,
) -> Result<Response<BoxStream<'static, Result<FlightData, Status>>>, Status> {
    let identity = util::identity(request.extensions());
    let header_catalog = util::catalog_header(request.metadata());
    let ticket = Ticket::decode(&request.into_inner().ticket)?;

    match ticket.entity_kind {
        EntityKind::Table => table_scan(router, header_catalog.as_deref(), identity.as_deref(), ticket).await,
        EntityKind::TableFunction => {
            table_function_call(router, header_catalog.as_deref(), identity.as_deref(), ticket).await
        }
        EntityKind::InOutTableFunction => Err(Status::invalid_argument(
            "in/out table functions are invoked via DoExchange, not DoGet",
        )),
    }
}

async fn table_scan(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    ticket: Ticket,
) -> Result<Response<BoxStream<'static, Result<FlightData, Status>>>, Status> {
    let (_catalog, _schema, table) = util::resolve_table(
        router,
        Some(ticket.catalog.as_str()),
        header_catalog,
        identity,
        &ticket.schema,
        &ticket.entity,
    )
    .await?;

    let schema = table.arrow_schema();
    let batches = table
        .scan(ticket.scan_options)
        .await?
        .map(|result| result.map_err(|e| FlightError::ExternalError(Box::new(e))));

    let flight_stream = FlightDataEncoderBuilder::new()
        .with_schema(schema)
        .build(batches)
        .map_err(|e| Status::internal(format!("flight encoding error: {e}")));

    Ok(Response::new(flight_stream.boxed()))
}

/// Decodes a self-contained Arrow IPC stream (written by
/// [`util::encode_params_ipc`]) back into its single batch.
fn decode_params_ipc(bytes: &[u8]) -> Result<RecordBatch, Status> {
    let mut reader = arrow_ipc::reader::StreamReader::try_new(std::io::Cursor::new(bytes), None)
        .map_err(|e| Status::invalid_argument(format!("malformed parameter IPC stream: {e}")))?;
    let batch = reader
        .next()
        .ok_or_else(|| Status::invalid_argument("parameter IPC stream carries no batch"))?
        .map_err(|e| Status::invalid_argument(format!("malformed parameter batch: {e}")))?;
    Ok(batch)
}

async fn table_function_call(
    router: &CatalogRouter,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    ticket: Ticket,
) -> Result<Response<BoxStream<'static, Result<FlightData, Status>>>, Status> {
    let catalog_name = Some(ticket.catalog.as_str());
    let catalog = router.resolve(catalog_name, identity).await?;
    let schema_obj = catalog
        .schema(&ticket.schema)
        .await?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", ticket.schema)))?;
    let functions = schema_obj.table_functions().await?;
    let function = functions
        .into_iter()
        .find(|f| f.name() == ticket.entity)
        .ok_or_else(|| Status::not_found("no table function with that name"))?;

    let params_ipc = ticket
        .params_ipc
        .ok_or_else(|| Status::invalid_argument("table function ticket carries no parameter row"))?;
    let params = decode_params_ipc(&params_ipc)?;

    let result_schema = function.result_schema(&params).await?;
    let batches = function
        .execute(params, ticket.scan_options)
        .await?
        .map(|result| result.map_err(|e| FlightError::ExternalError(Box::new(e))));

    let flight_stream = FlightDataEncoderBuilder::new()
        .with_schema(result_schema)
        .build(batches)
        .map_err(|e| Status::internal(format!("flight encoding error: {e}")));

    Ok(Response::new(flight_stream.boxed()))
}
