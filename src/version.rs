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

//! An atomic monotonic counter implementing [`crate::catalog::CatalogVersion`]
//! bookkeeping, for catalogs that want the server to own version tracking
//! instead of delegating to their own storage.

use crate::catalog::CatalogVersion;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct AtomicCatalogVersion {
    version: AtomicU64,
}

impl AtomicCatalogVersion {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn current(&self) -> CatalogVersion {
        CatalogVersion {
            version: self.version.load(Ordering::SeqCst),
            fixed: false,
        }
    }

    /// Advances the counter; every successful DDL verb must call this
    /// exactly once.
    pub fn advance(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for AtomicCatalogVersion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_monotonically() {
        let v = AtomicCatalogVersion::new();
        let before = v.current().version;
        v.advance();
        let after = v.current().version;
        assert!(after > before);
    }
}
