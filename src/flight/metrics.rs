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

//! Per-RPC request counters and duration histograms.

use std::time::Instant;

/// Records the start of a request against `verb`, returning a guard whose
/// `Drop` records the duration. Call at the top of every handler.
pub fn track_request(verb: &'static str) -> RequestTimer {
    metrics::counter!("airport_flight_requests_total", "verb" => verb).increment(1);
    RequestTimer {
        verb,
        start: Instant::now(),
    }
}

pub struct RequestTimer {
    verb: &'static str,
    start: Instant,
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        metrics::histogram!("airport_flight_request_duration_seconds", "verb" => self.verb)
            .record(self.start.elapsed().as_secs_f64());
    }
}
