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

//! `GetFlightInfo`: resolves `[catalog?, schema, table]`, folds in any
//! columns/filter/limit hints carried in the descriptor's `cmd` bytes, and
//! emits a single same-server endpoint carrying an opaque ticket.

use crate::codec::msgpack;
use crate::flight::util;
use crate::router::CatalogRouter;
use crate::scan::ScanHints;
use crate::ticket::{EntityKind, Ticket};
use arrow_flight::{FlightDescriptor, FlightEndpoint, FlightInfo};
use tonic::{Request, Response, Status};

pub async fn handle(
    router: &CatalogRouter,
    request: Request<FlightDescriptor>,
) -> Result<Response<FlightInfo>, Status> {
    let identity = util::identity(request.extensions());
    let header_catalog = util::catalog_header(request.metadata());
    let descriptor = request.into_inner();

    let (path_catalog, schema_name, table_name) = util::parse_table_path(&descriptor.path)?;
    let (catalog, schema, table) = util::resolve_table(
        router,
        path_catalog.as_deref(),
        header_catalog.as_deref(),
        identity.as_deref(),
        &schema_name,
        &table_name,
    )
    .await?;

    let hints = if descriptor.cmd.is_empty() {
        ScanHints::default()
    } else {
        msgpack::decode::<ScanHints>(&descriptor.cmd)?
    };

    let ticket = Ticket::new(
        catalog.name(),
        schema.name(),
        EntityKind::Table,
        table.name(),
        hints.into_scan_options(),
    )
    .encode()?;

    let endpoint = FlightEndpoint::new().with_ticket(arrow_flight::Ticket { ticket: ticket.into() });

    let info = FlightInfo::new()
        .with_descriptor(descriptor)
        .try_with_schema(&table.arrow_schema())
        .map_err(|e| Status::internal(format!("failed to encode schema: {e}")))?
        .with_endpoint(endpoint)
        .with_total_records(-1)
        .with_total_bytes(-1);

    Ok(Response::new(info))
}
