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

//! Server configuration, built with the same fluent-builder shape the
//! rest of this lineage uses for its runtime config types.

use crate::catalog::Catalog;
use crate::router::CatalogAuthorizer;
use std::net::SocketAddr;
use std::sync::Arc;

/// Validates a bearer token and resolves it to an identity string.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, bearer_token: &str) -> Result<String, crate::error::AirportError>;
}

pub struct ServerConfig {
    pub catalog: Arc<dyn Catalog>,
    pub auth: Option<Arc<dyn Authenticator>>,
    pub catalog_authorizer: Option<Arc<dyn CatalogAuthorizer>>,
    pub address: SocketAddr,
    pub max_message_size: usize,
    pub compression_level: i32,
    pub max_parallel_scalar_function_calls_per_batch: usize,
    pub tls: Option<TlsConfig>,
}

#[derive(Clone)]
pub struct TlsConfig {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

pub struct ServerConfigBuilder {
    catalog: Arc<dyn Catalog>,
    auth: Option<Arc<dyn Authenticator>>,
    catalog_authorizer: Option<Arc<dyn CatalogAuthorizer>>,
    address: SocketAddr,
    max_message_size: usize,
    compression_level: i32,
    max_parallel_scalar_function_calls_per_batch: usize,
    tls: Option<TlsConfig>,
}

impl ServerConfigBuilder {
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, address: SocketAddr) -> Self {
        Self {
            catalog,
            auth: None,
            catalog_authorizer: None,
            address,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_parallel_scalar_function_calls_per_batch: 0,
            tls: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_catalog_authorizer(mut self, authorizer: Arc<dyn CatalogAuthorizer>) -> Self {
        self.catalog_authorizer = Some(authorizer);
        self
    }

    #[must_use]
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    #[must_use]
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    #[must_use]
    pub fn with_max_parallel_scalar_function_calls_per_batch(mut self, max: usize) -> Self {
        self.max_parallel_scalar_function_calls_per_batch = max;
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            catalog: self.catalog,
            auth: self.auth,
            catalog_authorizer: self.catalog_authorizer,
            address: self.address,
            max_message_size: self.max_message_size,
            compression_level: self.compression_level,
            max_parallel_scalar_function_calls_per_batch: self.max_parallel_scalar_function_calls_per_batch,
            tls: self.tls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Schema;
    use crate::error::Result;
    use std::sync::Arc;

    struct EmptyCatalog;

    #[async_trait::async_trait]
    impl Catalog for EmptyCatalog {
        fn name(&self) -> &str {
            ""
        }
        async fn schemas(&self) -> Result<Vec<Arc<dyn Schema>>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfigBuilder::new(Arc::new(EmptyCatalog), "127.0.0.1:9000".parse().unwrap())
            .build();
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.max_parallel_scalar_function_calls_per_batch, 0);
    }
}
