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

//! `DoAction` / `ListActions`: the closed set of Airport verbs. Anything
//! outside this set is rejected with `unimplemented`, per the wire
//! contract's insistence on a fixed, enumerable surface rather than an
//! open-ended command namespace.

mod catalog;
mod ddl;
mod flight_info;
mod statistics;
mod transaction;

use crate::flight::util;
use crate::router::CatalogRouter;
use arrow_flight::{Action, ActionType};
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tonic::{Request, Response, Status};

const VERBS: &[(&str, &str)] = &[
    ("list_schemas", "Returns a compressed snapshot of every schema, table, and function in the catalog."),
    ("catalog_version", "Returns the catalog's current version counter."),
    ("endpoints", "GetFlightInfo equivalent that additionally carries a time-travel point."),
    ("flight_info", "GetFlightInfo equivalent invoked as an action."),
    ("table_function_flight_info", "Resolves a ticket for invoking a table function via DoGet."),
    ("column_statistics", "Returns single-column statistics as an Arrow IPC stream."),
    ("create_schema", "Creates a new schema."),
    ("drop_schema", "Drops an empty schema."),
    ("create_table", "Creates a new table from a client-supplied Arrow schema."),
    ("drop_table", "Drops a table."),
    ("rename_table", "Renames a table."),
    ("add_column", "Adds a column to a table."),
    ("remove_column", "Removes a column from a table."),
    ("rename_column", "Renames a column."),
    ("change_column_type", "Changes a column's declared type."),
    ("set_not_null", "Marks a column NOT NULL."),
    ("drop_not_null", "Clears a column's NOT NULL constraint."),
    ("set_default", "Sets or clears a column's default expression."),
    ("add_field", "Adds a field to a struct-typed column."),
    ("rename_field", "Renames a field of a struct-typed column."),
    ("remove_field", "Removes a field from a struct-typed column."),
    ("create_transaction", "Begins a new transaction."),
    ("get_transaction_status", "Returns a transaction's current state."),
];

pub async fn list(
    _request: Request<arrow_flight::Empty>,
) -> Result<Response<BoxStream<'static, Result<ActionType, Status>>>, Status> {
    let actions = VERBS
        .iter()
        .map(|(name, description)| {
            Ok(ActionType {
                r#type: (*name).to_string(),
                description: (*description).to_string(),
            })
        })
        .collect::<Vec<_>>();
    Ok(Response::new(stream::iter(actions).boxed()))
}

pub async fn do_action(
    router: &CatalogRouter,
    max_parallel_scalar_calls: usize,
    compression_level: i32,
    request: Request<Action>,
) -> Result<Response<BoxStream<'static, Result<arrow_flight::Result, Status>>>, Status> {
    let identity = util::identity(request.extensions());
    let header_catalog = util::catalog_header(request.metadata());
    let action = request.into_inner();
    let body = action.body.as_ref();

    let resolve_catalog = || async {
        router
            .resolve(header_catalog.as_deref(), identity.as_deref())
            .await
    };

    let result: Result<Vec<u8>, Status> = match action.r#type.as_str() {
        "list_schemas" => {
            let catalog = resolve_catalog().await?;
            catalog::list_schemas(catalog.as_ref(), compression_level).await
        }
        "catalog_version" => {
            let catalog = resolve_catalog().await?;
            catalog::catalog_version(catalog.as_ref()).await
        }
        "endpoints" => {
            flight_info::endpoints(router, header_catalog.as_deref(), identity.as_deref(), body).await
        }
        "flight_info" => {
            flight_info::flight_info(router, header_catalog.as_deref(), identity.as_deref(), body).await
        }
        "table_function_flight_info" => {
            flight_info::table_function_flight_info(
                router,
                header_catalog.as_deref(),
                identity.as_deref(),
                body,
            )
            .await
        }
        "column_statistics" => {
            let catalog = resolve_catalog().await?;
            statistics::column_statistics(catalog.as_ref(), body).await
        }
        "create_schema" => {
            let catalog = resolve_catalog().await?;
            ddl::create_schema(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "drop_schema" => {
            let catalog = resolve_catalog().await?;
            ddl::drop_schema(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "create_table" => {
            let catalog = resolve_catalog().await?;
            ddl::create_table(catalog.as_ref(), body).await.map(Vec::from)
        }
        "drop_table" => {
            let catalog = resolve_catalog().await?;
            ddl::drop_table(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "rename_table" => {
            let catalog = resolve_catalog().await?;
            ddl::rename_table(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "add_column" => {
            let catalog = resolve_catalog().await?;
            ddl::add_column(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "remove_column" => {
            let catalog = resolve_catalog().await?;
            ddl::remove_column(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "rename_column" => {
            let catalog = resolve_catalog().await?;
            ddl::rename_column(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "change_column_type" => {
            let catalog = resolve_catalog().await?;
            ddl::change_column_type(catalog.as_ref(), body)
                .await
                .map(|()| Vec::new())
        }
        "set_not_null" => {
            let catalog = resolve_catalog().await?;
            ddl::set_not_null(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "drop_not_null" => {
            let catalog = resolve_catalog().await?;
            ddl::drop_not_null(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "set_default" => {
            let catalog = resolve_catalog().await?;
            ddl::set_default(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "add_field" => {
            let catalog = resolve_catalog().await?;
            ddl::add_field(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "rename_field" => {
            let catalog = resolve_catalog().await?;
            ddl::rename_field(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "remove_field" => {
            let catalog = resolve_catalog().await?;
            ddl::remove_field(catalog.as_ref(), body).await.map(|()| Vec::new())
        }
        "create_transaction" => {
            let catalog = resolve_catalog().await?;
            transaction::create_transaction(catalog.as_ref()).await
        }
        "get_transaction_status" => {
            let catalog = resolve_catalog().await?;
            transaction::get_transaction_status(catalog.as_ref(), body).await
        }
        other => Err(Status::unimplemented(format!("unknown action '{other}'"))),
    };

    let wire_result = result.map(|body| arrow_flight::Result { body: Bytes::from(body) });
    Ok(Response::new(stream::once(async { wire_result }).boxed()))
}
