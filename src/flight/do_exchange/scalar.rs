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

//! Scalar function pump: one result batch per input batch, strict 1-to-1
//! row-count correspondence, with dispatch bounded by a global worker cap
//! and output re-ordered by input-batch index before emitting.

use crate::catalog::function::ScalarFunction;
use crate::error::AirportError;
use crate::flight::do_exchange::wire;
use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow_flight::FlightData;
use async_stream::stream;
use futures::stream::{BoxStream, FuturesOrdered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tonic::{Status, Streaming};

async fn invoke(
    function: Arc<dyn ScalarFunction>,
    batch: RecordBatch,
) -> Result<RecordBatch, AirportError> {
    let input_rows = batch.num_rows();
    let array = match function.timeout() {
        Some(duration) => tokio::time::timeout(duration, function.call(&batch))
            .await
            .map_err(|_| AirportError::Timeout {
                message: format!("scalar function '{}' exceeded its timeout", function.name()),
            })??,
        None => function.call(&batch).await?,
    };

    if array.len() != input_rows {
        return Err(AirportError::internal(format!(
            "scalar function '{}' returned {} rows for {input_rows} input rows",
            function.name(),
            array.len()
        )));
    }

    let field = arrow::datatypes::Field::new("value", array.data_type().clone(), true);
    let schema = Arc::new(arrow::datatypes::Schema::new(vec![field]));
    RecordBatch::try_new(schema, vec![array])
        .map_err(|e| AirportError::internal(format!("failed to build scalar result batch: {e}")))
}

pub fn pump(
    mut inbound: Streaming<FlightData>,
    schema: SchemaRef,
    function: Arc<dyn ScalarFunction>,
    max_parallel: usize,
) -> BoxStream<'static, Result<FlightData, Status>> {
    let output = stream! {
        let permits = max_parallel.max(1);
        let semaphore = Arc::new(Semaphore::new(if function.enable_parallel_execution() {
            permits
        } else {
            1
        }));

        let mut in_flight: FuturesOrdered<tokio::task::JoinHandle<Result<RecordBatch, AirportError>>> =
            FuturesOrdered::new();
        let mut pending = 0usize;

        loop {
            let message = match inbound.message().await {
                Ok(Some(message)) => Some(message),
                Ok(None) => None,
                Err(e) => {
                    yield Err(Status::internal(format!("error reading exchange input: {e}")));
                    return;
                }
            };

            match message {
                Some(message) if !message.data_header.is_empty() => {
                    let batch = match wire::decode_batch(&message, &schema) {
                        Ok(batch) => batch,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };

                    let permit = Arc::clone(&semaphore).acquire_owned().await.expect("semaphore not closed");
                    let function = Arc::clone(&function);
                    in_flight.push_back(tokio::spawn(async move {
                        let result = invoke(function, batch).await;
                        drop(permit);
                        result
                    }));
                    pending += 1;

                    if pending >= permits {
                        if let Some(joined) = in_flight.next().await {
                            pending -= 1;
                            match joined {
                                Ok(Ok(result_batch)) => match wire::encode_batch(&result_batch) {
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
                                Ok(Err(e)) => {
                                    yield Err(Status::from(e));
                                    return;
                                }
                                Err(e) => {
                                    yield Err(Status::internal(format!("scalar task panicked: {e}")));
                                    return;
                                }
                            }
                        }
                    }
                }
                Some(_) => continue,
                None => break,
            }
        }

        while let Some(joined) = in_flight.next().await {
            match joined {
                Ok(Ok(result_batch)) => match wire::encode_batch(&result_batch) {
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
                Ok(Err(e)) => {
                    yield Err(Status::from(e));
                    return;
                }
                Err(e) => {
                    yield Err(Status::internal(format!("scalar task panicked: {e}")));
                    return;
                }
            }
        }
    };

    output.boxed()
}
