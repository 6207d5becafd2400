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

//! `list_schemas` and `catalog_version`: the two no-argument catalog-wide
//! verbs.

use crate::catalog::Catalog;
use crate::codec::msgpack;
use crate::snapshot;
use serde::Serialize;
use tonic::Status;

pub async fn list_schemas(catalog: &dyn Catalog, compression_level: i32) -> Result<Vec<u8>, Status> {
    let snapshot = snapshot::build_snapshot(catalog).await.map_err(Status::from)?;
    snapshot::encode_snapshot_wire(&snapshot, compression_level).map_err(Status::from)
}

#[derive(Serialize)]
struct VersionBody {
    version: u64,
    fixed: bool,
}

pub async fn catalog_version(catalog: &dyn Catalog) -> Result<Vec<u8>, Status> {
    let version = catalog.version().await.map_err(Status::from)?;
    msgpack::encode(&VersionBody {
        version: version.version,
        fixed: version.fixed,
    })
    .map_err(Status::from)
}
