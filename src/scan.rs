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

//! Scan options: the immutable descriptor passed to every `Scan` and
//! function-execute call.

use serde::{Deserialize, Serialize};

/// A logical point in time for time-travel scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub unit: TimePointUnit,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePointUnit {
    Timestamp,
    Version,
    Snapshot,
}

/// Scan options carried by a ticket and handed to `Scan`/function execute.
///
/// Projection is advisory only: the scan implementation MUST still return
/// the full declared schema regardless of `columns` — the server never
/// re-projects server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Requested columns; empty means "all". Advisory only.
    #[serde(default)]
    pub columns: Vec<String>,
    /// An opaque filter blob, produced by the filter compiler.
    #[serde(default)]
    pub filter: Option<Vec<u8>>,
    /// Row limit; 0 means unbounded.
    #[serde(default)]
    pub limit: u64,
    /// A hint for the batch size the scan should produce.
    #[serde(default)]
    pub batch_size: u64,
    #[serde(default)]
    pub time_point: Option<TimePoint>,
}

impl ScanOptions {
    #[must_use]
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_time_point(mut self, time_point: TimePoint) -> Self {
        self.time_point = Some(time_point);
        self
    }
}

/// The columns/filter/limit hints a client may attach to a `FlightDescriptor`
/// via its `cmd` bytes, msgpack-encoded. Absent `cmd` means no hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanHints {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub filter: Option<Vec<u8>>,
    #[serde(default)]
    pub limit: u64,
}

impl ScanHints {
    #[must_use]
    pub fn into_scan_options(self) -> ScanOptions {
        ScanOptions {
            columns: self.columns,
            filter: self.filter,
            limit: self.limit,
            batch_size: 0,
            time_point: None,
        }
    }
}
