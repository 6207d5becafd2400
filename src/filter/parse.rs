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

//! Parses the client's JSON expression tree into [`Expr`]. The closed set
//! of `expression_class` tags mirrors the classes the wire format can
//! produce; a tag outside that set is a protocol violation and fails the
//! whole parse, while a recognized-but-unpushable class (aggregate,
//! window, subquery reference, parameter) parses to
//! [`Expr::Unsupported`] so its parent conjunction can decide whether to
//! drop it or give up.

use super::ast::{ConjunctionOp, Expr};
use super::value::{parse_value, LogicalType};
use crate::error::AirportError;
use serde_json::Value as Json;

/// Parses every top-level filter conjunct in `document` against
/// `column_names`, the projection-ordered column list the scan resolves
/// `BOUND_COLUMN_REF` indices against.
pub fn parse_filter_document(document: &[Json], column_names: &[String]) -> Result<Vec<Expr>, AirportError> {
    document
        .iter()
        .map(|node| parse_expr(node, column_names))
        .collect()
}

pub fn parse_expr(node: &Json, column_names: &[String]) -> Result<Expr, AirportError> {
    let class = node
        .get("expression_class")
        .and_then(Json::as_str)
        .ok_or_else(|| AirportError::invalid_argument("expression node missing 'expression_class'"))?;

    Ok(match class {
        "BOUND_CONSTANT" => {
            let type_id = node
                .get("type_id")
                .and_then(Json::as_str)
                .ok_or_else(|| AirportError::invalid_argument("BOUND_CONSTANT missing 'type_id'"))?;
            let logical_type = LogicalType::parse(type_id, node)?;
            let value_json = node.get("value").unwrap_or(&Json::Null);
            let value = parse_value(&logical_type, value_json)?;
            Expr::Constant { logical_type, value }
        }

        "BOUND_COLUMN_REF" => {
            let index = node
                .get("index")
                .and_then(Json::as_u64)
                .ok_or_else(|| AirportError::invalid_argument("BOUND_COLUMN_REF missing 'index'"))?
                as usize;
            let name = column_names.get(index).ok_or_else(|| {
                AirportError::invalid_argument(format!(
                    "column index {index} out of range for {} bound columns",
                    column_names.len()
                ))
            })?;
            Expr::Column {
                index,
                name: name.clone(),
            }
        }

        "BOUND_PARAMETER" => Expr::Parameter,

        "BOUND_FUNCTION" | "BOUND_OPERATOR" => {
            let name_key = if class == "BOUND_FUNCTION" {
                "function_name"
            } else {
                "operator_name"
            };
            let name = node
                .get(name_key)
                .and_then(Json::as_str)
                .ok_or_else(|| AirportError::invalid_argument(format!("{class} missing '{name_key}'")))?
                .to_string();
            let children = parse_children(node, "children", column_names)?;
            Expr::Call {
                name,
                is_operator: class == "BOUND_OPERATOR",
                children,
            }
        }

        "BOUND_COMPARISON" => {
            let comparison_type = node
                .get("comparison_type")
                .or_else(|| node.get("type"))
                .and_then(Json::as_str)
                .ok_or_else(|| AirportError::invalid_argument("BOUND_COMPARISON missing 'comparison_type'"))?;
            let name = comparison_symbol(comparison_type)?.to_string();
            let left = parse_required_child(node, "left", column_names)?;
            let right = parse_required_child(node, "right", column_names)?;
            Expr::Call {
                name,
                is_operator: true,
                children: vec![left, right],
            }
        }

        "BOUND_CAST" => {
            let child = node
                .get("child")
                .ok_or_else(|| AirportError::invalid_argument("BOUND_CAST missing 'child'"))?;
            let type_id = node
                .get("type_id")
                .and_then(Json::as_str)
                .ok_or_else(|| AirportError::invalid_argument("BOUND_CAST missing 'type_id'"))?;
            Expr::Cast {
                child: Box::new(parse_expr(child, column_names)?),
                target_type: LogicalType::parse(type_id, node)?,
            }
        }

        "BOUND_BETWEEN" => {
            let input = parse_required_child(node, "input", column_names)?;
            let lower = parse_required_child(node, "lower", column_names)?;
            let upper = parse_required_child(node, "upper", column_names)?;
            let lower_inclusive = node
                .get("lower_inclusive")
                .and_then(Json::as_bool)
                .unwrap_or(true);
            let upper_inclusive = node
                .get("upper_inclusive")
                .and_then(Json::as_bool)
                .unwrap_or(true);
            Expr::Between {
                input: Box::new(input),
                lower: Box::new(lower),
                upper: Box::new(upper),
                lower_inclusive,
                upper_inclusive,
            }
        }

        "BOUND_CASE" => {
            let branches_json = node
                .get("branches")
                .and_then(Json::as_array)
                .ok_or_else(|| AirportError::invalid_argument("BOUND_CASE missing 'branches'"))?;
            let mut branches = Vec::with_capacity(branches_json.len());
            for branch in branches_json {
                let when = parse_required_child(branch, "when", column_names)?;
                let then = parse_required_child(branch, "then", column_names)?;
                branches.push((when, then));
            }
            let else_branch = match node.get("else") {
                Some(Json::Null) | None => None,
                Some(else_node) => Some(Box::new(parse_expr(else_node, column_names)?)),
            };
            Expr::Case {
                branches,
                else_branch,
            }
        }

        "BOUND_CONJUNCTION" => {
            let op = match node.get("conjunction_type").and_then(Json::as_str) {
                Some("AND") => ConjunctionOp::And,
                Some("OR") => ConjunctionOp::Or,
                other => {
                    return Err(AirportError::invalid_argument(format!(
                        "BOUND_CONJUNCTION has unrecognized conjunction_type: {other:?}"
                    )))
                }
            };
            let children = parse_children(node, "children", column_names)?;
            Expr::Conjunction { op, children }
        }

        "BOUND_AGGREGATE" | "BOUND_WINDOW" | "BOUND_SUBQUERY" | "BOUND_REF" => Expr::Unsupported,

        other => {
            return Err(AirportError::invalid_argument(format!(
                "unrecognized expression_class: {other}"
            )))
        }
    })
}

/// Maps DuckDB's `BOUND_COMPARISON` `comparison_type` tag to the bare SQL
/// symbol string this crate's [`super::dialect::Dialect::operator_symbol`]
/// implementations already recognize for `BOUND_OPERATOR` calls.
fn comparison_symbol(comparison_type: &str) -> Result<&'static str, AirportError> {
    Ok(match comparison_type {
        "COMPARE_EQUAL" => "=",
        "COMPARE_NOTEQUAL" => "<>",
        "COMPARE_LESSTHAN" => "<",
        "COMPARE_GREATERTHAN" => ">",
        "COMPARE_LESSTHANOREQUALTO" => "<=",
        "COMPARE_GREATERTHANOREQUALTO" => ">=",
        "COMPARE_DISTINCT_FROM" => "is distinct from",
        "COMPARE_NOT_DISTINCT_FROM" => "is not distinct from",
        other => {
            return Err(AirportError::invalid_argument(format!(
                "unrecognized comparison_type: {other}"
            )))
        }
    })
}

fn parse_children(node: &Json, key: &str, column_names: &[String]) -> Result<Vec<Expr>, AirportError> {
    let children = node
        .get(key)
        .and_then(Json::as_array)
        .ok_or_else(|| AirportError::invalid_argument(format!("expression node missing '{key}'")))?;
    children.iter().map(|c| parse_expr(c, column_names)).collect()
}

fn parse_required_child(node: &Json, key: &str, column_names: &[String]) -> Result<Expr, AirportError> {
    let child = node
        .get(key)
        .ok_or_else(|| AirportError::invalid_argument(format!("expression node missing '{key}'")))?;
    parse_expr(child, column_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn parses_constant_and_column_ref() {
        let node = json!({"expression_class": "BOUND_COLUMN_REF", "index": 1});
        let expr = parse_expr(&node, &cols()).expect("parse");
        assert_eq!(
            expr,
            Expr::Column {
                index: 1,
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn out_of_range_column_ref_is_rejected() {
        let node = json!({"expression_class": "BOUND_COLUMN_REF", "index": 9});
        let err = parse_expr(&node, &cols()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn aggregate_parses_to_unsupported() {
        let node = json!({"expression_class": "BOUND_AGGREGATE", "function_name": "sum"});
        let expr = parse_expr(&node, &cols()).expect("parse");
        assert_eq!(expr, Expr::Unsupported);
    }

    #[test]
    fn unknown_class_is_rejected() {
        let node = json!({"expression_class": "BOUND_NONSENSE"});
        let err = parse_expr(&node, &cols()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn parses_comparison_into_operator_call() {
        let node = json!({
            "expression_class": "BOUND_COMPARISON",
            "comparison_type": "COMPARE_EQUAL",
            "left": {"expression_class": "BOUND_COLUMN_REF", "index": 0},
            "right": {"expression_class": "BOUND_CONSTANT", "type_id": "INTEGER", "value": 42},
        });
        let expr = parse_expr(&node, &cols()).expect("parse");
        match expr {
            Expr::Call {
                name,
                is_operator,
                children,
            } => {
                assert_eq!(name, "=");
                assert!(is_operator);
                assert_eq!(children.len(), 2);
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_comparison_type_is_rejected() {
        let node = json!({
            "expression_class": "BOUND_COMPARISON",
            "comparison_type": "COMPARE_NONSENSE",
            "left": {"expression_class": "BOUND_COLUMN_REF", "index": 0},
            "right": {"expression_class": "BOUND_COLUMN_REF", "index": 1},
        });
        let err = parse_expr(&node, &cols()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn parses_conjunction_with_children() {
        let node = json!({
            "expression_class": "BOUND_CONJUNCTION",
            "conjunction_type": "AND",
            "children": [
                {"expression_class": "BOUND_COLUMN_REF", "index": 0},
                {"expression_class": "BOUND_COLUMN_REF", "index": 1},
            ],
        });
        let expr = parse_expr(&node, &cols()).expect("parse");
        match expr {
            Expr::Conjunction { op, children } => {
                assert_eq!(op, ConjunctionOp::And);
                assert_eq!(children.len(), 2);
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }
}
