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

//! Table-valued and in/out table function pumps.
//!
//! A table function takes a single parameter row and produces a result row
//! stream; an in/out table function additionally consumes a row stream, so
//! fan-in/fan-out need not be 1-to-1.

use crate::catalog::function::{InOutTableFunction, TableFunction};
use crate::flight::do_exchange::wire;
use crate::scan::ScanOptions;
use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow_flight::FlightData;
use async_stream::stream;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tonic::{Status, Streaming};

/// Reads every inbound data message as a single concatenated parameter
/// batch; a table function call carries exactly one row of parameters.
async fn read_single_batch(
    inbound: &mut Streaming<FlightData>,
    schema: &SchemaRef,
) -> Result<Option<RecordBatch>, Status> {
    while let Some(message) = inbound
        .message()
        .await
        .map_err(|e| Status::internal(format!("error reading exchange input: {e}")))?
    {
        if message.data_header.is_empty() {
            continue;
        }
        return Ok(Some(wire::decode_batch(&message, schema)?));
    }
    Ok(None)
}

async fn emit_batches(
    output: &mut BoxStream<'static, Result<RecordBatch, crate::error::AirportError>>,
) -> Vec<Result<FlightData, Status>> {
    let mut out = Vec::new();
    while let Some(row_batch) = output.next().await {
        match row_batch {
            Ok(batch) => match wire::encode_batch(&batch) {
                Ok(flights) => out.extend(flights.into_iter().map(Ok)),
                Err(e) => {
                    out.push(Err(e));
                    return out;
                }
            },
            Err(e) => {
                out.push(Err(Status::from(e)));
                return out;
            }
        }
    }
    out
}

pub fn table_function_pump(
    mut inbound: Streaming<FlightData>,
    params_schema: SchemaRef,
    options: ScanOptions,
    function: Arc<dyn TableFunction>,
) -> BoxStream<'static, Result<FlightData, Status>> {
    let output = stream! {
        let params = match read_single_batch(&mut inbound, &params_schema).await {
            Ok(Some(batch)) => batch,
            Ok(None) => {
                yield Err(Status::invalid_argument("table function call carries no parameter row"));
                return;
            }
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut rows = match function.execute(params, options).await {
            Ok(rows) => rows,
            Err(e) => {
                yield Err(Status::from(e));
                return;
            }
        };

        for item in emit_batches(&mut rows).await {
            let stop = item.is_err();
            yield item;
            if stop {
                return;
            }
        }
    };

    output.boxed()
}

pub fn in_out_table_function_pump(
    mut inbound: Streaming<FlightData>,
    input_schema: SchemaRef,
    scalar_params_schema: SchemaRef,
    function: Arc<dyn InOutTableFunction>,
) -> BoxStream<'static, Result<FlightData, Status>> {
    let output = stream! {
        let scalar_params = match read_single_batch(&mut inbound, &scalar_params_schema).await {
            Ok(Some(batch)) => batch,
            Ok(None) => {
                yield Err(Status::invalid_argument("in/out table function call carries no scalar parameter row"));
                return;
            }
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<RecordBatch, crate::error::AirportError>>(16);
        let input_stream: crate::catalog::table::BatchStream =
            Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx));

        let drain = async move {
            loop {
                match inbound.message().await {
                    Ok(Some(message)) => {
                        if message.data_header.is_empty() {
                            continue;
                        }
                        let batch = wire::decode_batch(&message, &input_schema)
                            .map_err(|_| crate::error::AirportError::invalid_argument("malformed input batch"));
                        let batch = match batch {
                            Ok(b) => b,
                            Err(e) => {
                                let _ = tx.send(Err(e)).await;
                                break;
                            }
                        };
                        if tx.send(Ok(batch)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
        };
        tokio::spawn(drain);

        let mut rows = match function.execute(input_stream, scalar_params).await {
            Ok(rows) => rows,
            Err(e) => {
                yield Err(Status::from(e));
                return;
            }
        };

        for item in emit_batches(&mut rows).await {
            let stop = item.is_err();
            yield item;
            if stop {
                return;
            }
        }
    };

    output.boxed()
}
