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

//! `GetSchema`: resolves a `[catalog?, schema, table]` descriptor path and
//! returns the table's Arrow schema, IPC-encoded.

use crate::flight::util;
use crate::router::CatalogRouter;
use arrow_flight::{FlightDescriptor, SchemaResult};
use tonic::{Request, Response, Status};

pub async fn handle(
    router: &CatalogRouter,
    request: Request<FlightDescriptor>,
) -> Result<Response<SchemaResult>, Status> {
    let identity = util::identity(request.extensions());
    let header_catalog = util::catalog_header(request.metadata());
    let descriptor = request.into_inner();

    let (path_catalog, schema_name, table_name) = util::parse_table_path(&descriptor.path)?;
    let (_catalog, _schema, table) = util::resolve_table(
        router,
        path_catalog.as_deref(),
        header_catalog.as_deref(),
        identity.as_deref(),
        &schema_name,
        &table_name,
    )
    .await?;

    let schema_bytes = util::serialize_schema(&table.arrow_schema())?;
    Ok(Response::new(SchemaResult {
        schema: schema_bytes,
    }))
}
