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

//! The catalog-snapshot wire wrapper: an outer msgpack tuple
//! `[uncompressed_len: u32, compressed: bin]` whose `compressed` element is
//! the Zstd-compressed msgpack document.
//!
//! The length prefix is required: decompression needs the original size to
//! allocate the output buffer ahead of time.

use crate::error::AirportError;

/// Compresses `body` at `level` and wraps it in the required tuple shape.
pub fn wrap(body: &[u8], level: i32) -> Result<Vec<u8>, AirportError> {
    let compressed = zstd::encode_all(body, level)
        .map_err(|e| AirportError::internal(format!("zstd compress failed: {e}")))?;

    let len_u32 = u32::try_from(body.len())
        .map_err(|_| AirportError::internal("catalog snapshot exceeds 4 GiB"))?;

    let value = rmpv::Value::Array(vec![
        rmpv::Value::from(len_u32),
        rmpv::Value::Binary(compressed),
    ]);

    let mut out = Vec::new();
    rmpv::encode::write_value(&mut out, &value)
        .map_err(|e| AirportError::internal(format!("msgpack encode failed: {e}")))?;
    Ok(out)
}

/// Unwraps and decompresses a document produced by [`wrap`].
pub fn unwrap(wire_bytes: &[u8]) -> Result<Vec<u8>, AirportError> {
    let mut cursor = std::io::Cursor::new(wire_bytes);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| AirportError::invalid_argument(format!("msgpack decode failed: {e}")))?;

    let elements = value
        .as_array()
        .ok_or_else(|| AirportError::invalid_argument("catalog snapshot is not a tuple"))?;
    let [len_elem, body_elem] = elements else {
        return Err(AirportError::invalid_argument(
            "catalog snapshot tuple must have exactly 2 elements",
        ));
    };

    let uncompressed_len = len_elem
        .as_u64()
        .ok_or_else(|| AirportError::invalid_argument("catalog snapshot length is not a u32"))?
        as usize;
    let compressed = body_elem
        .as_slice()
        .ok_or_else(|| AirportError::invalid_argument("catalog snapshot body is not binary"))?;

    let mut body = Vec::with_capacity(uncompressed_len);
    zstd::stream::copy_decode(compressed, &mut body)
        .map_err(|e| AirportError::invalid_argument(format!("zstd decompress failed: {e}")))?;

    if body.len() != uncompressed_len {
        return Err(AirportError::invalid_argument(format!(
            "catalog snapshot length mismatch: prefix said {uncompressed_len}, got {}",
            body.len()
        )));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let body = b"the quick brown fox jumps over the lazy dog".repeat(64);
        let wire = wrap(&body, 3).expect("wrap");
        let decoded = unwrap(&wire).expect("unwrap");
        assert_eq!(decoded, body);
    }

    #[test]
    fn rejects_length_mismatch() {
        let body = b"hello world".to_vec();
        let mut wire = wrap(&body, 3).expect("wrap");
        // Corrupt the length prefix byte (msgpack fixint/uint8 header sits
        // right after the array header and bin header bytes at index 1).
        wire[1] = 0xff;
        let result = unwrap(&wire);
        assert!(result.is_err());
    }
}
