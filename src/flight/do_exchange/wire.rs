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

//! Low-level FlightData encode/decode shared by every exchange operation.

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use arrow::ipc::writer::{DictionaryTracker, IpcDataGenerator};
use arrow_flight::FlightData;
use arrow_ipc::writer::IpcWriteOptions;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use tonic::Status;

/// Encodes one record batch as its (possibly empty) dictionary messages
/// followed by the batch message itself.
pub fn encode_batch(batch: &RecordBatch) -> Result<Vec<FlightData>, Status> {
    let options = IpcWriteOptions::default();
    let generator = IpcDataGenerator::default();
    let mut tracker = DictionaryTracker::new(false);

    let (dictionaries, encoded_batch) = generator
        .encoded_batch(batch, &mut tracker, &options)
        .map_err(|e| Status::internal(format!("failed to encode record batch: {e}")))?;

    let mut flights: Vec<FlightData> = dictionaries.into_iter().map(Into::into).collect();
    flights.push(encoded_batch.into());
    Ok(flights)
}

/// A control-only message carrying nothing but `app_metadata`: the only
/// supported channel for the affected-row trailer.
pub fn control_message(metadata: &impl Serialize) -> Result<FlightData, Status> {
    let body = crate::codec::msgpack::encode(metadata)
        .map_err(|e| Status::internal(format!("failed to encode app_metadata: {e}")))?;
    Ok(FlightData {
        flight_descriptor: None,
        data_header: Bytes::new(),
        data_body: Bytes::new(),
        app_metadata: Bytes::from(body),
    })
}

/// Decodes one inbound `FlightData` message into a `RecordBatch` against a
/// fixed schema; dictionaries are not supported on the inbound side (no
/// dictionary-typed fields are accepted in any exchange input).
pub fn decode_batch(message: &FlightData, schema: &SchemaRef) -> Result<RecordBatch, Status> {
    let dictionaries_by_id = HashMap::new();
    arrow_flight::utils::flight_data_to_arrow_batch(message, schema.clone(), &dictionaries_by_id)
        .map_err(|e| Status::invalid_argument(format!("failed to decode record batch: {e}")))
}

/// Parses the Arrow schema carried in a message's `data_header`
/// (a schema-only IPC message, always the first message of an exchange).
pub fn schema_from_header(message: &FlightData) -> Result<SchemaRef, Status> {
    let schema = arrow_ipc::convert::try_schema_from_flatbuffer_bytes(&message.data_header)
        .map_err(|e| Status::invalid_argument(format!("failed to decode schema: {e}")))?;
    Ok(std::sync::Arc::new(schema))
}
