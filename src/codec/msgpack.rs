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

//! Thin msgpack encode/decode wrappers.

use crate::error::AirportError;
use serde::{de::DeserializeOwned, Serialize};

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AirportError> {
    rmp_serde::to_vec_named(value)
        .map_err(|e| AirportError::internal(format!("msgpack encode failed: {e}")))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AirportError> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| AirportError::invalid_argument(format!("msgpack decode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Example {
        name: String,
        count: u64,
    }

    #[test]
    fn round_trips() {
        let value = Example {
            name: "users".into(),
            count: 3,
        };
        let bytes = encode(&value).expect("encode");
        let decoded: Example = decode(&bytes).expect("decode");
        assert_eq!(value, decoded);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode::<Example>(&[0xff, 0x00, 0x01]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }
}
