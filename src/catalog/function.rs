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

//! Scalar, table-valued, and in/out table function capabilities.

use super::table::BatchStream;
use crate::error::Result;
use crate::scan::ScanOptions;
use arrow::array::{ArrayRef, RecordBatch};
use arrow::datatypes::{DataType, SchemaRef};
use async_trait::async_trait;
use std::time::Duration;

/// One function parameter. `data_type: None` is the "any" sentinel type
/// flag from the catalog snapshot.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub data_type: Option<DataType>,
    pub is_table_input: bool,
}

/// A function's signature as reported in the catalog snapshot.
/// `return_type: None` for table functions with a schema that can only be
/// determined at call time.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<DataType>,
}

/// A scalar function invoked with one value-chunk batch per call, producing
/// a single result column; the exchange pump enforces row-count
/// preservation and 1-to-1 batch correspondence.
#[async_trait]
pub trait ScalarFunction: Send + Sync {
    fn name(&self) -> &str;
    fn comment(&self) -> Option<&str> {
        None
    }
    fn signature(&self) -> FunctionSignature;

    /// Gates whether this function participates in the pump's parallel
    /// dispatch across input batches.
    fn enable_parallel_execution(&self) -> bool {
        false
    }

    /// Wall-clock bound for a single invocation; `None` is unbounded.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn call(&self, args: &RecordBatch) -> Result<ArrayRef>;
}

/// A table-valued function: a single row of parameter values produces a
/// row stream.
#[async_trait]
pub trait TableFunction: Send + Sync {
    fn name(&self) -> &str;
    fn comment(&self) -> Option<&str> {
        None
    }
    fn signature(&self) -> FunctionSignature;

    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Resolves the concrete result schema for a given parameter row,
    /// needed even when `signature().return_type` is dynamic.
    async fn result_schema(&self, params: &RecordBatch) -> Result<SchemaRef>;

    async fn execute(&self, params: RecordBatch, options: ScanOptions) -> Result<BatchStream>;
}

/// A table function that consumes a row stream and produces a row stream;
/// fan-in/fan-out need not be 1-to-1.
#[async_trait]
pub trait InOutTableFunction: Send + Sync {
    fn name(&self) -> &str;
    fn comment(&self) -> Option<&str> {
        None
    }
    fn signature(&self) -> FunctionSignature;

    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn result_schema(&self, scalar_params: &RecordBatch) -> Result<SchemaRef>;

    async fn execute(
        &self,
        input: BatchStream,
        scalar_params: RecordBatch,
    ) -> Result<BatchStream>;
}
