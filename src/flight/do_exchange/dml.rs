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

//! INSERT/UPDATE/DELETE pump: drains input batches, calls the matching
//! capability, interleaves any RETURNING rows, and ends with a control
//! message carrying `{total_changed}`. Batch-form UPDATE/DELETE is
//! preferred over the row-id-slice form when a table implements both.

use crate::catalog::dml::DmlResult;
use crate::catalog::table::Table;
use crate::catalog::FIELD_META_IS_ROWID;
use crate::error::AirportError;
use crate::flight::do_exchange::wire;
use arrow::array::{Int64Array, RecordBatch};
use arrow::datatypes::SchemaRef;
use arrow_flight::FlightData;
use async_stream::stream;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tonic::{Status, Streaming};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlOp {
    Insert,
    Update,
    Delete,
}

#[derive(Serialize)]
struct ChangeTrailer {
    total_changed: i64,
}

fn rowid_column_index(schema: &SchemaRef) -> Option<usize> {
    schema.fields().iter().position(|f| {
        f.name() == "rowid" || f.metadata().get(FIELD_META_IS_ROWID).is_some_and(|v| v == "true")
    })
}

fn extract_row_ids(
    batch: &RecordBatch,
    rowid_index: usize,
    table_name: &str,
    operation: &str,
) -> Result<Vec<i64>, AirportError> {
    let column = batch
        .column(rowid_index)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| AirportError::invalid_argument("rowid column must be Int64"))?;

    if column.null_count() > 0 {
        return Err(AirportError::NullRowid {
            table: table_name.to_string(),
            operation: operation.to_string(),
        });
    }

    Ok(column.values().to_vec())
}

async fn call_insert(
    table: &Arc<dyn Table>,
    batch: RecordBatch,
    returning: bool,
) -> Result<DmlResult, AirportError> {
    let insert = table
        .as_insert_rows()
        .ok_or_else(|| AirportError::unimplemented("table does not support insert"))?;
    insert.insert_batch(batch, returning).await
}

async fn call_update(
    table: &Arc<dyn Table>,
    batch: RecordBatch,
    rowid_index: Option<usize>,
    returning: bool,
) -> Result<DmlResult, AirportError> {
    let rowid_index = rowid_index.ok_or_else(|| {
        AirportError::invalid_argument(
            "batch carries no rowid column (named `rowid` or flagged `is_rowid`)",
        )
    })?;

    if let Some(by_batch) = table.as_update_by_batch() {
        extract_row_ids(&batch, rowid_index, table.name(), "update")?;
        return by_batch.update_batch(batch, returning).await;
    }
    if let Some(by_slice) = table.as_update_by_row_id_slice() {
        let row_ids = extract_row_ids(&batch, rowid_index, table.name(), "update")?;
        return by_slice.update_batch(row_ids, batch, returning).await;
    }
    Err(AirportError::unimplemented("table does not support update"))
}

async fn call_delete(
    table: &Arc<dyn Table>,
    batch: RecordBatch,
    rowid_index: Option<usize>,
    returning: bool,
) -> Result<DmlResult, AirportError> {
    let rowid_index = rowid_index.ok_or_else(|| {
        AirportError::invalid_argument(
            "batch carries no rowid column (named `rowid` or flagged `is_rowid`)",
        )
    })?;

    if let Some(by_batch) = table.as_delete_by_batch() {
        extract_row_ids(&batch, rowid_index, table.name(), "delete")?;
        return by_batch.delete_batch(batch, returning).await;
    }
    if let Some(by_slice) = table.as_delete_by_row_id_slice() {
        let row_ids = extract_row_ids(&batch, rowid_index, table.name(), "delete")?;
        return by_slice.delete_batch(row_ids, returning).await;
    }
    Err(AirportError::unimplemented("table does not support delete"))
}

pub fn pump(
    mut inbound: Streaming<FlightData>,
    schema: SchemaRef,
    table: Arc<dyn Table>,
    op: DmlOp,
    returning: bool,
) -> BoxStream<'static, Result<FlightData, Status>> {
    let output = stream! {
        let mut total_changed: i64 = 0;
        let rowid_index = rowid_column_index(&schema);

        loop {
            let message = match inbound.message().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    yield Err(Status::internal(format!("error reading exchange input: {e}")));
                    return;
                }
            };

            if message.data_header.is_empty() {
                continue;
            }

            let batch = match wire::decode_batch(&message, &schema) {
                Ok(batch) => batch,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let result = match op {
                DmlOp::Insert => call_insert(&table, batch, returning).await,
                DmlOp::Update => call_update(&table, batch, rowid_index, returning).await,
                DmlOp::Delete => call_delete(&table, batch, rowid_index, returning).await,
            };

            match result {
                Ok(dml_result) => {
                    total_changed = if dml_result.affected_rows < 0 || total_changed < 0 {
                        -1
                    } else {
                        total_changed + dml_result.affected_rows
                    };

                    if let Some(mut returning_stream) = dml_result.returning {
                        while let Some(row) = returning_stream.next().await {
                            match row {
                                Ok(row_batch) => match wire::encode_batch(&row_batch) {
                                    Ok(flights) => {
                                        for fd in flights {
                                            yield Ok(fd);
                                        }
                                    }
                                    Err(e) => {
                                        yield Err(e);
                                        return;
                                    }
                                },
                                Err(e) => {
                                    yield Err(Status::from(e));
                                    return;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(Status::from(e));
                    return;
                }
            }
        }

        match wire::control_message(&ChangeTrailer { total_changed }) {
            Ok(fd) => yield Ok(fd),
            Err(e) => yield Err(e),
        }
    };

    output.boxed()
}
