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

//! Exposes a user-supplied tabular catalog over Arrow Flight, extended
//! with the Airport action-verb set: schema discovery, scan with
//! projection/filter/time-travel pushdown, scalar and table function
//! invocation, INSERT/UPDATE/DELETE, DDL, column statistics, and
//! transactions.
//!
//! Implement [`catalog::Catalog`] (and whichever of the optional
//! capability traits your storage supports) and hand it to
//! [`server::start`] via a [`config::ServerConfig`].

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod flight;
pub mod router;
pub mod scan;
pub mod server;
pub mod snapshot;
pub mod stats;
pub mod ticket;
pub mod version;

pub use catalog::Catalog;
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{AirportError, ErrorKind};
pub use router::CatalogRouter;
