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

//! Opaque routing tickets.
//!
//! A ticket decouples the client from server topology: it carries
//! everything needed to resume a scan, and the server holds no per-ticket
//! state. Decoding must round-trip exactly, and must reject a ticket
//! referencing an unknown catalog/schema/entity with `not-found` (checked
//! by the caller, since the ticket decoder itself has no catalog access).

use crate::codec::msgpack;
use crate::error::AirportError;
use crate::scan::ScanOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Table,
    TableFunction,
    InOutTableFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub catalog: String,
    pub schema: String,
    pub entity_kind: EntityKind,
    pub entity: String,
    pub scan_options: ScanOptions,
    /// A self-contained Arrow IPC stream (schema plus exactly one batch)
    /// carrying the parameter row for a `TableFunction` ticket. `None` for
    /// table tickets, which need no parameters.
    #[serde(default)]
    pub params_ipc: Option<Vec<u8>>,
}

impl Ticket {
    #[must_use]
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        entity_kind: EntityKind,
        entity: impl Into<String>,
        scan_options: ScanOptions,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            entity_kind,
            entity: entity.into(),
            scan_options,
            params_ipc: None,
        }
    }

    #[must_use]
    pub fn with_params_ipc(mut self, params_ipc: Vec<u8>) -> Self {
        self.params_ipc = Some(params_ipc);
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>, AirportError> {
        msgpack::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, AirportError> {
        msgpack::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let ticket = Ticket::new(
            "",
            "main",
            EntityKind::Table,
            "users",
            ScanOptions::default().with_columns(vec!["id".into()]).with_limit(10),
        );
        let bytes = ticket.encode().expect("encode");
        let decoded = Ticket::decode(&bytes).expect("decode");
        assert_eq!(ticket, decoded);
    }

    #[test]
    fn decode_garbage_is_invalid_argument() {
        let err = Ticket::decode(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
