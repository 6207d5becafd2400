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

//! `ListFlights` is part of the recognized RPC surface but callers are
//! expected to discover tables through `list_schemas`/the catalog
//! snapshot, not by enumerating flights; this call has no contract beyond
//! returning `unimplemented`.

use arrow_flight::FlightInfo;
use futures::stream::BoxStream;
use tonic::{Response, Status};

pub async fn handle() -> Result<Response<BoxStream<'static, Result<FlightInfo, Status>>>, Status> {
    Err(Status::unimplemented("list_flights is not supported; use the list_schemas action"))
}
