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

//! The multi-catalog router: dispatches by the
//! `airport-catalog` request header to one of N named catalogs, with
//! runtime add/drop and per-catalog authorization.

use crate::catalog::Catalog;
use crate::error::AirportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const CATALOG_HEADER: &str = "airport-catalog";
pub const DEFAULT_CATALOG_NAME: &str = "";

/// Authorizes an already-authenticated identity against a selected
/// catalog name. Returning `Err` with kind `forbidden` denies the request.
#[async_trait]
pub trait CatalogAuthorizer: Send + Sync {
    async fn authorize_catalog(
        &self,
        identity: Option<&str>,
        catalog_name: &str,
    ) -> Result<(), AirportError>;
}

/// Authorizer that permits every request; the default when no
/// authorizer is configured.
pub struct AllowAllAuthorizer;

#[async_trait]
impl CatalogAuthorizer for AllowAllAuthorizer {
    async fn authorize_catalog(
        &self,
        _identity: Option<&str>,
        _catalog_name: &str,
    ) -> Result<(), AirportError> {
        Ok(())
    }
}

/// A reader-writer-locked map of named catalogs: reads (request dispatch)
/// never block each other; writes (add/remove) take an exclusive lock
///.
pub struct CatalogRouter {
    catalogs: RwLock<HashMap<String, Arc<dyn Catalog>>>,
    authorizer: Arc<dyn CatalogAuthorizer>,
}

impl CatalogRouter {
    #[must_use]
    pub fn new(default_catalog: Arc<dyn Catalog>) -> Self {
        let mut map = HashMap::new();
        map.insert(DEFAULT_CATALOG_NAME.to_string(), default_catalog);
        Self {
            catalogs: RwLock::new(map),
            authorizer: Arc::new(AllowAllAuthorizer),
        }
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn CatalogAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Registers `catalog` keyed by its own `name()`.
    pub async fn add_catalog(&self, catalog: Arc<dyn Catalog>) {
        let name = catalog.name().to_string();
        self.catalogs.write().await.insert(name, catalog);
    }

    /// Removes a catalog by name. Callers are expected to have already
    /// drained in-flight requests against it; the router itself only
    /// guards the map, not individual request lifetimes.
    pub async fn remove_catalog(&self, name: &str) -> Option<Arc<dyn Catalog>> {
        self.catalogs.write().await.remove(name)
    }

    /// Resolves the catalog named by the `airport-catalog` header (or the
    /// default catalog `""` if absent), then authorizes `identity`
    /// against it.
    pub async fn resolve(
        &self,
        catalog_name: Option<&str>,
        identity: Option<&str>,
    ) -> Result<Arc<dyn Catalog>, AirportError> {
        let name = catalog_name.unwrap_or(DEFAULT_CATALOG_NAME);
        self.authorizer.authorize_catalog(identity, name).await?;

        self.catalogs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AirportError::not_found(format!("no catalog named '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Schema;
    use crate::error::Result;

    struct EmptyCatalog(&'static str);

    #[async_trait]
    impl Catalog for EmptyCatalog {
        fn name(&self) -> &str {
            self.0
        }
        async fn schemas(&self) -> Result<Vec<Arc<dyn Schema>>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn resolves_default_catalog_when_header_absent() {
        let router = CatalogRouter::new(Arc::new(EmptyCatalog("")));
        let resolved = router.resolve(None, None).await.expect("resolve");
        assert_eq!(resolved.name(), "");
    }

    #[tokio::test]
    async fn resolves_named_catalog_after_add() {
        let router = CatalogRouter::new(Arc::new(EmptyCatalog("")));
        router.add_catalog(Arc::new(EmptyCatalog("analytics"))).await;

        let resolved = router
            .resolve(Some("analytics"), None)
            .await
            .expect("resolve");
        assert_eq!(resolved.name(), "analytics");
    }

    #[tokio::test]
    async fn unknown_catalog_is_not_found() {
        let router = CatalogRouter::new(Arc::new(EmptyCatalog("")));
        let err = router.resolve(Some("missing"), None).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    struct DenyAll;

    #[async_trait]
    impl CatalogAuthorizer for DenyAll {
        async fn authorize_catalog(
            &self,
            _identity: Option<&str>,
            _catalog_name: &str,
        ) -> Result<(), AirportError> {
            Err(AirportError::Forbidden {
                message: "denied".into(),
            })
        }
    }

    #[tokio::test]
    async fn authorizer_can_forbid() {
        let router =
            CatalogRouter::new(Arc::new(EmptyCatalog(""))).with_authorizer(Arc::new(DenyAll));
        let err = router.resolve(None, None).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Forbidden);
    }
}
