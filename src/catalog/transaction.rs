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

//! Transaction capabilities.
//!
//! The server is a conduit: isolation semantics are entirely the user
//! storage's responsibility.

use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

impl TransactionState {
    #[must_use]
    pub fn as_wire_str(self) -> &'static str {
        match self {
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
            TransactionState::Aborted => "aborted",
        }
    }
}

#[async_trait]
pub trait Transaction: Send + Sync {
    async fn status(&self, tx_id: &str) -> Result<TransactionState>;
    async fn commit(&self, tx_id: &str) -> Result<()>;
    async fn rollback(&self, tx_id: &str) -> Result<()>;
}

#[async_trait]
pub trait BeginTransaction: Send + Sync {
    /// Starts a new transaction, returning its opaque id.
    async fn begin_transaction(&self) -> Result<String>;
}
