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

//! The exchange command: the msgpack body carried in the first
//! `FlightData` message's descriptor `cmd` bytes, naming which of the
//! operations multiplexed over `DoExchange` this stream performs.

use crate::error::AirportError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ExchangeCommand {
    ScalarFunction {
        catalog: Option<String>,
        schema: String,
        function: String,
    },
    TableFunction {
        catalog: Option<String>,
        schema: String,
        function: String,
    },
    InOutTableFunction {
        catalog: Option<String>,
        schema: String,
        function: String,
    },
    Insert {
        catalog: Option<String>,
        schema: String,
        table: String,
        returning: bool,
    },
    Update {
        catalog: Option<String>,
        schema: String,
        table: String,
        returning: bool,
    },
    Delete {
        catalog: Option<String>,
        schema: String,
        table: String,
        returning: bool,
    },
}

impl ExchangeCommand {
    pub fn decode(bytes: &[u8]) -> Result<Self, AirportError> {
        if bytes.is_empty() {
            return Err(AirportError::invalid_argument(
                "DoExchange requires a descriptor cmd naming the operation",
            ));
        }
        crate::codec::msgpack::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_cmd() {
        let err = ExchangeCommand::decode(&[]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn round_trips_insert() {
        let cmd = ExchangeCommand::Insert {
            catalog: None,
            schema: "main".into(),
            table: "users".into(),
            returning: true,
        };
        let bytes = crate::codec::msgpack::encode(&cmd).expect("encode");
        let decoded = ExchangeCommand::decode(&bytes).expect("decode");
        match decoded {
            ExchangeCommand::Insert {
                schema,
                table,
                returning,
                ..
            } => {
                assert_eq!(schema, "main");
                assert_eq!(table, "users");
                assert!(returning);
            }
            _ => panic!("wrong variant"),
        }
    }
}
