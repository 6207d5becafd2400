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

//! Column statistics serialization for the `column_statistics` verb:
//! a single-row Arrow record with fields
//! `{has_not_null, has_null, distinct_count, min, max, max_string_length,
//! contains_unicode}`. Unavailable fields are null; `min`/`max` types must
//! match the column's Arrow type.

use crate::catalog::dml::ColumnStats;
use crate::error::{AirportError, Result};
use arrow::array::{ArrayRef, BooleanArray, RecordBatch, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

fn null_of_type(data_type: &DataType) -> Result<ArrayRef> {
    Ok(arrow::array::new_null_array(data_type, 1))
}

/// Builds the single-row statistics record for one column. `column_type`
/// is the column's declared Arrow type, used both to type the `min`/`max`
/// fields and to null-fill them when the table didn't provide a value.
pub fn stats_to_record_batch(stats: &ColumnStats, column_type: &DataType) -> Result<RecordBatch> {
    let min_array = stats.min.clone().map_or_else(
        || null_of_type(column_type),
        |arr| {
            if arr.data_type() != column_type {
                return Err(AirportError::internal(format!(
                    "column_statistics min type {:?} doesn't match column type {column_type:?}",
                    arr.data_type()
                )));
            }
            Ok(arr)
        },
    )?;
    let max_array = stats.max.clone().map_or_else(
        || null_of_type(column_type),
        |arr| {
            if arr.data_type() != column_type {
                return Err(AirportError::internal(format!(
                    "column_statistics max type {:?} doesn't match column type {column_type:?}",
                    arr.data_type()
                )));
            }
            Ok(arr)
        },
    )?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("has_not_null", DataType::Boolean, true),
        Field::new("has_null", DataType::Boolean, true),
        Field::new("distinct_count", DataType::UInt64, true),
        Field::new("min", column_type.clone(), true),
        Field::new("max", column_type.clone(), true),
        Field::new("max_string_length", DataType::UInt64, true),
        Field::new("contains_unicode", DataType::Boolean, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(BooleanArray::from(vec![stats.has_not_null])),
        Arc::new(BooleanArray::from(vec![stats.has_null])),
        Arc::new(UInt64Array::from(vec![stats.distinct_count])),
        min_array,
        max_array,
        Arc::new(UInt64Array::from(vec![stats.max_string_length])),
        Arc::new(BooleanArray::from(vec![stats.contains_unicode])),
    ];

    RecordBatch::try_new(schema, columns)
        .map_err(|e| AirportError::internal(format!("failed to build statistics record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_fields_are_null() {
        let stats = ColumnStats::default();
        let batch = stats_to_record_batch(&stats, &DataType::Int64).expect("batch");
        assert_eq!(batch.num_rows(), 1);
        assert!(batch.column(0).is_null(0));
        assert_eq!(batch.column(3).data_type(), &DataType::Int64);
    }

    #[test]
    fn mismatched_min_type_is_rejected() {
        let mut stats = ColumnStats::default();
        stats.min = Some(Arc::new(arrow::array::Int32Array::from(vec![1])));
        let err = stats_to_record_batch(&stats, &DataType::Int64).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
    }
}
