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

//! `DoExchange`: the single bidirectional RPC multiplexing scalar function
//! calls, table-valued and in/out table function calls, and INSERT /
//! UPDATE / DELETE. The first inbound message carries a `FlightDescriptor`
//! whose `cmd` bytes name the operation; the second carries the schema of
//! the rows the client is about to send (present even for operations with
//! no row input, to keep the framing uniform).

mod command;
mod dml;
mod function;
mod scalar;
mod wire;

use crate::flight::util;
use crate::router::CatalogRouter;
use command::ExchangeCommand;
use dml::DmlOp;
use tonic::{Request, Response, Status, Streaming};

pub async fn handle(
    router: &CatalogRouter,
    max_parallel_scalar_calls: usize,
    request: Request<Streaming<arrow_flight::FlightData>>,
) -> Result<Response<futures::stream::BoxStream<'static, Result<arrow_flight::FlightData, Status>>>, Status>
{
    let identity = util::identity(request.extensions());
    let header_catalog = util::catalog_header(request.metadata());
    let mut inbound = request.into_inner();

    let Some(first) = inbound
        .message()
        .await
        .map_err(|e| Status::internal(format!("error reading exchange input: {e}")))?
    else {
        return Err(Status::invalid_argument("DoExchange stream carries no messages"));
    };

    let descriptor = first
        .flight_descriptor
        .as_ref()
        .ok_or_else(|| Status::invalid_argument("first DoExchange message carries no descriptor"))?;
    let command = ExchangeCommand::decode(&descriptor.cmd)?;

    let schema = if first.data_header.is_empty() {
        None
    } else {
        Some(wire::schema_from_header(&first)?)
    };

    match command {
        ExchangeCommand::ScalarFunction {
            catalog,
            schema: schema_name,
            function,
        } => {
            let (_catalog, schema_obj) = resolve_schema(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
            )
            .await?;
            let functions = schema_obj.scalar_functions().await.map_err(Status::from)?;
            let function = functions
                .into_iter()
                .find(|f| f.name() == function)
                .ok_or_else(|| Status::not_found("no scalar function with that name"))?;
            let params_schema = schema.ok_or_else(|| {
                Status::invalid_argument("scalar function call carries no parameter schema")
            })?;
            Ok(Response::new(scalar::pump(
                inbound,
                params_schema,
                function,
                max_parallel_scalar_calls,
            )))
        }
        ExchangeCommand::TableFunction {
            catalog,
            schema: schema_name,
            function,
        } => {
            let (_catalog, schema_obj) = resolve_schema(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
            )
            .await?;
            let functions = schema_obj.table_functions().await.map_err(Status::from)?;
            let function = functions
                .into_iter()
                .find(|f| f.name() == function)
                .ok_or_else(|| Status::not_found("no table function with that name"))?;
            let params_schema = schema.ok_or_else(|| {
                Status::invalid_argument("table function call carries no parameter schema")
            })?;
            Ok(Response::new(function::table_function_pump(
                inbound,
                params_schema,
                crate::scan::ScanOptions::default(),
                function,
            )))
        }
        ExchangeCommand::InOutTableFunction {
            catalog,
            schema: schema_name,
            function,
        } => {
            let (_catalog, schema_obj) = resolve_schema(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
            )
            .await?;
            let functions = schema_obj.in_out_table_functions().await.map_err(Status::from)?;
            let function = functions
                .into_iter()
                .find(|f| f.name() == function)
                .ok_or_else(|| Status::not_found("no in/out table function with that name"))?;
            let input_schema = schema.ok_or_else(|| {
                Status::invalid_argument("in/out table function call carries no input row schema")
            })?;

            let Some(second) = inbound
                .message()
                .await
                .map_err(|e| Status::internal(format!("error reading exchange input: {e}")))?
            else {
                return Err(Status::invalid_argument(
                    "in/out table function call carries no scalar parameter schema",
                ));
            };
            if second.data_header.is_empty() {
                return Err(Status::invalid_argument(
                    "in/out table function call carries no scalar parameter schema",
                ));
            }
            let scalar_params_schema = wire::schema_from_header(&second)?;

            Ok(Response::new(function::in_out_table_function_pump(
                inbound,
                input_schema,
                scalar_params_schema,
                function,
            )))
        }
        ExchangeCommand::Insert {
            catalog,
            schema: schema_name,
            table,
            returning,
        } => {
            let (_catalog, _schema_obj, table_obj) = util::resolve_table(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
                &table,
            )
            .await
            .map_err(Status::from)?;
            let row_schema = schema
                .ok_or_else(|| Status::invalid_argument("insert carries no row schema"))?;
            Ok(Response::new(dml::pump(
                inbound,
                row_schema,
                table_obj,
                DmlOp::Insert,
                returning,
            )))
        }
        ExchangeCommand::Update {
            catalog,
            schema: schema_name,
            table,
            returning,
        } => {
            let (_catalog, _schema_obj, table_obj) = util::resolve_table(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
                &table,
            )
            .await
            .map_err(Status::from)?;
            let row_schema = schema
                .ok_or_else(|| Status::invalid_argument("update carries no row schema"))?;
            Ok(Response::new(dml::pump(
                inbound,
                row_schema,
                table_obj,
                DmlOp::Update,
                returning,
            )))
        }
        ExchangeCommand::Delete {
            catalog,
            schema: schema_name,
            table,
            returning,
        } => {
            let (_catalog, _schema_obj, table_obj) = util::resolve_table(
                router,
                catalog.as_deref(),
                header_catalog.as_deref(),
                identity.as_deref(),
                &schema_name,
                &table,
            )
            .await
            .map_err(Status::from)?;
            let row_schema = schema
                .ok_or_else(|| Status::invalid_argument("delete carries no row schema"))?;
            Ok(Response::new(dml::pump(
                inbound,
                row_schema,
                table_obj,
                DmlOp::Delete,
                returning,
            )))
        }
    }
}

async fn resolve_schema(
    router: &CatalogRouter,
    path_catalog: Option<&str>,
    header_catalog: Option<&str>,
    identity: Option<&str>,
    schema_name: &str,
) -> Result<(std::sync::Arc<dyn crate::catalog::Catalog>, std::sync::Arc<dyn crate::catalog::Schema>), Status>
{
    let catalog_name = path_catalog.or(header_catalog);
    let catalog = router.resolve(catalog_name, identity).await.map_err(Status::from)?;
    let schema = catalog
        .schema(schema_name)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no schema named '{schema_name}'")))?;
    Ok((catalog, schema))
}
