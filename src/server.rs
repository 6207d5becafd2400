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

//! Server bring-up: wires a [`ServerConfig`] into a running tonic server.

use crate::config::ServerConfig;
use crate::flight::middleware::{AuthLayer, ExchangeRateLimitLayer};
use crate::flight::Service;
use crate::router::{AllowAllAuthorizer, CatalogRouter};
use arrow_flight::flight_service_server::FlightServiceServer;
use governor::Quota;
use snafu::prelude::*;
use std::num::NonZeroU32;
use std::sync::Arc;
use tonic::transport::{Identity, Server, ServerTlsConfig};

const DEFAULT_EXCHANGE_QUOTA_PER_SECOND: u32 = 1_000;

#[derive(Debug, snafu::Snafu)]
pub enum Error {
    #[snafu(display("unable to configure TLS on the Flight server: {source}"))]
    ConfigureTls { source: tonic::transport::Error },

    #[snafu(display("unable to start Flight server: {source}"))]
    StartServer { source: tonic::transport::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Starts the Airport Flight server, blocking until it shuts down.
pub async fn start(config: ServerConfig) -> Result<()> {
    let router = Arc::new(
        CatalogRouter::new(config.catalog)
            .with_authorizer(config.catalog_authorizer.unwrap_or_else(|| Arc::new(AllowAllAuthorizer))),
    );

    let service = Service::new(
        router,
        config.compression_level,
        config.max_parallel_scalar_function_calls_per_batch,
    );
    let svc = FlightServiceServer::new(service)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let mut server = Server::builder();

    if let Some(tls) = &config.tls {
        let identity = Identity::from_pem(&tls.cert_pem, &tls.key_pem);
        let tls_config = ServerTlsConfig::new().identity(identity);
        server = server.tls_config(tls_config).context(ConfigureTlsSnafu)?;
    }

    let quota = Quota::per_second(
        NonZeroU32::new(DEFAULT_EXCHANGE_QUOTA_PER_SECOND).expect("nonzero quota constant"),
    );

    tracing::info!(address = %config.address, "starting Airport Flight server");

    server
        .layer(AuthLayer::new(config.auth))
        .layer(ExchangeRateLimitLayer::new(quota))
        .add_service(svc)
        .serve(config.address)
        .await
        .context(StartServerSnafu)?;

    Ok(())
}
