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

//! The Flight service: wires every RPC to its submodule handler. Only
//! `ListFlights, GetFlightInfo, GetSchema, DoGet, DoExchange, DoAction,
//! ListActions` are recognized; `Handshake`, `DoPut`, and `PollFlightInfo`
//! are accepted calls that always fail with `unimplemented`.

pub mod actions;
mod do_exchange;
mod do_get;
mod get_flight_info;
mod get_schema;
mod handshake;
mod list_flights;
pub mod metrics;
pub mod middleware;
pub mod util;

use crate::router::CatalogRouter;
use arrow_flight::flight_service_server::FlightService;
use arrow_flight::{
    Action, ActionType, Criteria, Empty, FlightData, FlightDescriptor, FlightInfo, HandshakeRequest,
    HandshakeResponse, PollInfo, PutResult, SchemaResult, Ticket,
};
use futures::stream::BoxStream;
use std::sync::Arc;
use tonic::{Request, Response, Status, Streaming};

pub struct Service {
    router: Arc<CatalogRouter>,
    compression_level: i32,
    max_parallel_scalar_function_calls_per_batch: usize,
}

impl Service {
    #[must_use]
    pub fn new(
        router: Arc<CatalogRouter>,
        compression_level: i32,
        max_parallel_scalar_function_calls_per_batch: usize,
    ) -> Self {
        Self {
            router,
            compression_level,
            max_parallel_scalar_function_calls_per_batch,
        }
    }
}

#[tonic::async_trait]
impl FlightService for Service {
    type HandshakeStream = BoxStream<'static, Result<HandshakeResponse, Status>>;
    type ListFlightsStream = BoxStream<'static, Result<FlightInfo, Status>>;
    type DoGetStream = BoxStream<'static, Result<FlightData, Status>>;
    type DoPutStream = BoxStream<'static, Result<PutResult, Status>>;
    type DoActionStream = BoxStream<'static, Result<arrow_flight::Result, Status>>;
    type ListActionsStream = BoxStream<'static, Result<ActionType, Status>>;
    type DoExchangeStream = BoxStream<'static, Result<FlightData, Status>>;

    async fn handshake(
        &self,
        request: Request<Streaming<HandshakeRequest>>,
    ) -> Result<Response<Self::HandshakeStream>, Status> {
        let _timer = metrics::track_request("handshake");
        handshake::handle(request).await
    }

    async fn list_flights(
        &self,
        _request: Request<Criteria>,
    ) -> Result<Response<Self::ListFlightsStream>, Status> {
        let _timer = metrics::track_request("list_flights");
        list_flights::handle().await
    }

    async fn get_flight_info(
        &self,
        request: Request<FlightDescriptor>,
    ) -> Result<Response<FlightInfo>, Status> {
        let _timer = metrics::track_request("get_flight_info");
        get_flight_info::handle(&self.router, request).await
    }

    async fn poll_flight_info(
        &self,
        _request: Request<FlightDescriptor>,
    ) -> Result<Response<PollInfo>, Status> {
        let _timer = metrics::track_request("poll_flight_info");
        Err(Status::unimplemented(
            "poll_flight_info is not part of the recognized RPC surface",
        ))
    }

    async fn get_schema(
        &self,
        request: Request<FlightDescriptor>,
    ) -> Result<Response<SchemaResult>, Status> {
        let _timer = metrics::track_request("get_schema");
        get_schema::handle(&self.router, request).await
    }

    async fn do_get(
        &self,
        request: Request<Ticket>,
    ) -> Result<Response<Self::DoGetStream>, Status> {
        let _timer = metrics::track_request("do_get");
        do_get::handle(&self.router, request).await
    }

    async fn do_put(
        &self,
        _request: Request<Streaming<FlightData>>,
    ) -> Result<Response<Self::DoPutStream>, Status> {
        let _timer = metrics::track_request("do_put");
        Err(Status::unimplemented(
            "do_put is not part of the recognized RPC surface; use DoExchange for writes",
        ))
    }

    async fn do_action(
        &self,
        request: Request<Action>,
    ) -> Result<Response<Self::DoActionStream>, Status> {
        let _timer = metrics::track_request("do_action");
        actions::do_action(
            &self.router,
            self.max_parallel_scalar_function_calls_per_batch,
            self.compression_level,
            request,
        )
        .await
    }

    async fn list_actions(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<Self::ListActionsStream>, Status> {
        let _timer = metrics::track_request("list_actions");
        actions::list(request).await
    }

    async fn do_exchange(
        &self,
        request: Request<Streaming<FlightData>>,
    ) -> Result<Response<Self::DoExchangeStream>, Status> {
        let _timer = metrics::track_request("do_exchange");
        do_exchange::handle(
            &self.router,
            self.max_parallel_scalar_function_calls_per_batch.max(1),
            request,
        )
        .await
    }
}
