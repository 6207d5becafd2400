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

//! Schema, table, column and struct-field DDL verbs. Every handler here
//! probes a capability accessor and returns `unimplemented` when the
//! catalog/schema/table declines it; the catalog itself is responsible for
//! advancing its version counter on success.

use crate::catalog::ddl::IfExists;
use crate::catalog::table::Table;
use crate::catalog::Catalog;
use crate::codec::msgpack;
use crate::error::AirportError;
use crate::flight::util;
use serde::Deserialize;
use tonic::Status;

fn if_exists_from(replace: bool, ignore: bool) -> IfExists {
    if replace {
        IfExists::Replace
    } else if ignore {
        IfExists::Ignore
    } else {
        IfExists::Error
    }
}

#[derive(Deserialize)]
struct CreateSchemaParams {
    name: String,
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    ignore: bool,
}

pub async fn create_schema(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: CreateSchemaParams = msgpack::decode(body).map_err(Status::from)?;
    let create = catalog
        .as_create_schema()
        .ok_or_else(|| Status::from(AirportError::unimplemented("catalog does not support create_schema")))?;
    create
        .create_schema(&params.name, if_exists_from(params.replace, params.ignore))
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct DropSchemaParams {
    name: String,
    #[serde(default)]
    if_not_found_ignore: bool,
}

pub async fn drop_schema(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: DropSchemaParams = msgpack::decode(body).map_err(Status::from)?;
    let schema = catalog
        .schema(&params.name)
        .await
        .map_err(Status::from)?;
    if let Some(schema) = &schema {
        if !schema.tables().await.map_err(Status::from)?.is_empty() {
            return Err(Status::from(AirportError::precondition(format!(
                "schema '{}' is not empty",
                params.name
            ))));
        }
    }
    let drop = catalog
        .as_drop_schema()
        .ok_or_else(|| Status::from(AirportError::unimplemented("catalog does not support drop_schema")))?;
    drop.drop_schema(&params.name, params.if_not_found_ignore)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct CreateTableParams {
    schema: String,
    name: String,
    schema_ipc: Vec<u8>,
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    ignore: bool,
}

pub async fn create_table(catalog: &dyn Catalog, body: &[u8]) -> Result<bytes::Bytes, Status> {
    let params: CreateTableParams = msgpack::decode(body).map_err(Status::from)?;
    let schema_obj = catalog
        .schema(&params.schema)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", params.schema)))?;
    let create = schema_obj
        .as_create_table()
        .ok_or_else(|| Status::from(AirportError::unimplemented("schema does not support create_table")))?;
    let arrow_schema = util::deserialize_schema(&params.schema_ipc).map_err(Status::from)?;
    let table = create
        .create_table(
            &params.name,
            &arrow_schema,
            if_exists_from(params.replace, params.ignore),
        )
        .await
        .map_err(Status::from)?;
    util::serialize_schema(&table.arrow_schema()).map_err(Status::from)
}

#[derive(Deserialize)]
struct DropTableParams {
    schema: String,
    name: String,
    #[serde(default)]
    if_not_found_ignore: bool,
}

pub async fn drop_table(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: DropTableParams = msgpack::decode(body).map_err(Status::from)?;
    let schema_obj = catalog
        .schema(&params.schema)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", params.schema)))?;
    let drop = schema_obj
        .as_drop_table()
        .ok_or_else(|| Status::from(AirportError::unimplemented("schema does not support drop_table")))?;
    drop.drop_table(&params.name, params.if_not_found_ignore)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct RenameTableParams {
    schema: String,
    old_name: String,
    new_name: String,
}

pub async fn rename_table(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: RenameTableParams = msgpack::decode(body).map_err(Status::from)?;
    let schema_obj = catalog
        .schema(&params.schema)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no schema named '{}'", params.schema)))?;
    let rename = schema_obj
        .as_rename_table()
        .ok_or_else(|| Status::from(AirportError::unimplemented("schema does not support rename_table")))?;
    rename
        .rename_table(&params.old_name, &params.new_name)
        .await
        .map_err(Status::from)
}

async fn find_table(
    catalog: &dyn Catalog,
    schema: &str,
    table: &str,
) -> Result<std::sync::Arc<dyn Table>, Status> {
    let schema_obj = catalog
        .schema(schema)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no schema named '{schema}'")))?;
    schema_obj
        .table(table)
        .await
        .map_err(Status::from)?
        .ok_or_else(|| Status::not_found(format!("no table named '{table}' in schema '{schema}'")))
}

#[derive(Deserialize)]
struct AddColumnParams {
    schema: String,
    table: String,
    field_ipc: Vec<u8>,
}

pub async fn add_column(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: AddColumnParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_add_column()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support add_column")))?;
    let field_schema = util::deserialize_schema(&params.field_ipc).map_err(Status::from)?;
    capability.add_column(&field_schema).await.map_err(Status::from)
}

#[derive(Deserialize)]
struct RemoveColumnParams {
    schema: String,
    table: String,
    name: String,
}

pub async fn remove_column(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: RemoveColumnParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_remove_column()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support remove_column")))?;
    capability.remove_column(&params.name).await.map_err(Status::from)
}

#[derive(Deserialize)]
struct RenameColumnParams {
    schema: String,
    table: String,
    old_name: String,
    new_name: String,
}

pub async fn rename_column(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: RenameColumnParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_rename_column()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support rename_column")))?;
    capability
        .rename_column(&params.old_name, &params.new_name)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct ChangeColumnTypeParams {
    schema: String,
    table: String,
    field_ipc: Vec<u8>,
    sql_expression: String,
}

pub async fn change_column_type(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: ChangeColumnTypeParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table.as_change_column_type().ok_or_else(|| {
        Status::from(AirportError::unimplemented("table does not support change_column_type"))
    })?;
    let field_schema = util::deserialize_schema(&params.field_ipc).map_err(Status::from)?;
    capability
        .change_column_type(&field_schema, &params.sql_expression)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct ColumnNameParams {
    schema: String,
    table: String,
    column: String,
}

pub async fn set_not_null(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: ColumnNameParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_set_not_null()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support set_not_null")))?;
    capability.set_not_null(&params.column).await.map_err(Status::from)
}

pub async fn drop_not_null(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: ColumnNameParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_drop_not_null()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support drop_not_null")))?;
    capability.drop_not_null(&params.column).await.map_err(Status::from)
}

#[derive(Deserialize)]
struct SetDefaultParams {
    schema: String,
    table: String,
    column: String,
    default_sql_expression: Option<String>,
}

pub async fn set_default(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: SetDefaultParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_set_default()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support set_default")))?;
    capability
        .set_default(&params.column, params.default_sql_expression.as_deref())
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct AddFieldParams {
    schema: String,
    table: String,
    column: String,
    field_ipc: Vec<u8>,
}

pub async fn add_field(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: AddFieldParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_add_field()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support add_field")))?;
    let field_schema = util::deserialize_schema(&params.field_ipc).map_err(Status::from)?;
    capability
        .add_field(&params.column, &field_schema)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct RenameFieldParams {
    schema: String,
    table: String,
    column: String,
    old_name: String,
    new_name: String,
}

pub async fn rename_field(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: RenameFieldParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_rename_field()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support rename_field")))?;
    capability
        .rename_field(&params.column, &params.old_name, &params.new_name)
        .await
        .map_err(Status::from)
}

#[derive(Deserialize)]
struct RemoveFieldParams {
    schema: String,
    table: String,
    column: String,
    field_name: String,
}

pub async fn remove_field(catalog: &dyn Catalog, body: &[u8]) -> Result<(), Status> {
    let params: RemoveFieldParams = msgpack::decode(body).map_err(Status::from)?;
    let table = find_table(catalog, &params.schema, &params.table).await?;
    let capability = table
        .as_remove_field()
        .ok_or_else(|| Status::from(AirportError::unimplemented("table does not support remove_field")))?;
    capability
        .remove_field(&params.column, &params.field_name)
        .await
        .map_err(Status::from)
}
