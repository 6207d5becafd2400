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

//! `create_transaction` and `get_transaction_status`.

use crate::catalog::Catalog;
use crate::codec::msgpack;
use crate::error::AirportError;
use serde::{Deserialize, Serialize};
use tonic::Status;

#[derive(Serialize)]
struct CreateTransactionResult {
    tx_id: String,
}

pub async fn create_transaction(catalog: &dyn Catalog) -> Result<Vec<u8>, Status> {
    let begin = catalog
        .as_begin_transaction()
        .ok_or_else(|| Status::from(AirportError::unimplemented("catalog does not support transactions")))?;
    let tx_id = begin.begin_transaction().await.map_err(Status::from)?;
    msgpack::encode(&CreateTransactionResult { tx_id }).map_err(Status::from)
}

#[derive(Deserialize)]
struct TransactionStatusParams {
    tx_id: String,
}

#[derive(Serialize)]
struct TransactionStatusResult {
    state: &'static str,
}

pub async fn get_transaction_status(catalog: &dyn Catalog, body: &[u8]) -> Result<Vec<u8>, Status> {
    let params: TransactionStatusParams = msgpack::decode(body).map_err(Status::from)?;
    let transaction = catalog
        .as_transaction()
        .ok_or_else(|| Status::from(AirportError::unimplemented("catalog does not support transactions")))?;
    let state = transaction.status(&params.tx_id).await.map_err(Status::from)?;
    msgpack::encode(&TransactionStatusResult {
        state: state.as_wire_str(),
    })
    .map_err(Status::from)
}
