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

//! Compiles the client's JSON filter-pushdown document into a
//! dialect-correct SQL `WHERE` fragment: [`parse`] builds a typed
//! [`ast::Expr`] tree, [`dialect::emit`] walks it back out as SQL,
//! dropping or poisoning unpushable subexpressions according to their
//! enclosing conjunction.

pub mod ast;
pub mod dialect;
pub mod duckdb;
pub mod parse;
pub mod value;

use crate::error::AirportError;
use serde_json::Value as Json;

/// Parses and emits a filter document in one call, using the DuckDB
/// dialect. Returns `None` when every top-level conjunct was pruned.
pub fn compile_duckdb(document: &[Json], column_names: &[String]) -> Result<Option<String>, AirportError> {
    let exprs = parse::parse_filter_document(document, column_names)?;
    Ok(dialect::emit(&exprs, &duckdb::DuckDbDialect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_simple_equality_filter() {
        let document = vec![json!({
            "expression_class": "BOUND_OPERATOR",
            "operator_name": "=",
            "children": [
                {"expression_class": "BOUND_COLUMN_REF", "index": 0},
                {"expression_class": "BOUND_CONSTANT", "type_id": "INTEGER", "value": 42},
            ],
        })];
        let columns = vec!["id".to_string()];
        let sql = compile_duckdb(&document, &columns).expect("compile").expect("some sql");
        assert_eq!(sql, "(\"id\" = 42)");
    }

    #[test]
    fn compiles_comparison_class_equality_filter() {
        let document = vec![json!({
            "expression_class": "BOUND_COMPARISON",
            "comparison_type": "COMPARE_EQUAL",
            "left": {"expression_class": "BOUND_COLUMN_REF", "index": 0},
            "right": {"expression_class": "BOUND_CONSTANT", "type_id": "INTEGER", "value": 42},
        })];
        let columns = vec!["id".to_string()];
        let sql = compile_duckdb(&document, &columns).expect("compile").expect("some sql");
        assert_eq!(sql, "(\"id\" = 42)");
    }

    #[test]
    fn drops_unsupported_top_level_conjunct_entirely() {
        let document = vec![json!({"expression_class": "BOUND_AGGREGATE", "function_name": "sum"})];
        let sql = compile_duckdb(&document, &[]).expect("compile");
        assert_eq!(sql, None);
    }
}
