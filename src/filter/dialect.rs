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

//! Dialect-parameterized SQL emission from the typed expression tree.
//!
//! Unsupported-subexpression policy: a conjunction's job is to salvage
//! whatever it can push down. An `AND` drops any child that can't be
//! rendered and keeps going, because `col = 1 AND <unpushable>` is still
//! safe to prune to `col = 1` (rows that don't match the dropped clause
//! are simply not excluded server-side, and the engine re-checks them
//! locally). An `OR` can't do that: dropping one arm of an `OR` would
//! silently exclude rows the full expression would have kept, so one
//! unpushable child poisons the entire `OR`. Every other node kind
//! (function, cast, between, case) has no such child to sacrifice, so any
//! unpushable child poisons the whole node, which then poisons its own
//! parent the same way.

use super::ast::{ConjunctionOp, Expr};
use super::value::{LogicalType, TimestampUnit, Value};

pub trait Dialect {
    fn quote_ident(&self, name: &str) -> String;
    fn string_literal(&self, s: &str) -> String;
    fn blob_literal(&self, bytes: &[u8]) -> String;
    fn uuid_literal(&self, uuid: &uuid::Uuid) -> String;
    fn date_literal(&self, days_since_epoch: i32) -> String;
    fn time_literal(&self, micros_since_midnight: i64) -> String;
    fn timestamp_literal(&self, value: i64, unit: TimestampUnit, tz: Option<&str>) -> String;
    fn interval_literal(&self, months: i32, days: i32, micros: i64) -> String;
    fn decimal_literal(&self, unscaled: f64, width: u8, scale: u8) -> String;
    /// Renders a known infix/prefix operator; `None` if `name` isn't
    /// recognized as an operator symbol by this dialect.
    fn operator_symbol(&self, name: &str) -> Option<&'static str>;
    fn cast_type_name(&self, target: &LogicalType) -> String;
}

/// Emits a dialect-correct `WHERE` fragment from the top-level conjuncts,
/// joining surviving conjuncts with `AND`. Returns `None` (omit the
/// `WHERE` clause) when nothing survives.
pub fn emit(exprs: &[Expr], dialect: &dyn Dialect) -> Option<String> {
    join_with(exprs.iter().map(|e| emit_expr(e, dialect)), "AND")
}

/// Collects already-emitted fragments and joins survivors with `verb`,
/// parenthesizing each only when more than one fragment is joined.
fn join_with<I: Iterator<Item = Option<String>>>(parts: I, verb: &str) -> Option<String> {
    let parts: Vec<String> = parts.flatten().collect();
    match parts.len() {
        0 => None,
        1 => Some(parts.into_iter().next().expect("len checked")),
        _ => Some(
            parts
                .into_iter()
                .map(|p| format!("({p})"))
                .collect::<Vec<_>>()
                .join(&format!(" {verb} ")),
        ),
    }
}

fn emit_expr(expr: &Expr, dialect: &dyn Dialect) -> Option<String> {
    match expr {
        Expr::Unsupported | Expr::Parameter => None,

        Expr::Constant { logical_type, value } => Some(emit_constant(logical_type, value, dialect)),

        Expr::Column { name, .. } => Some(dialect.quote_ident(name)),

        Expr::Conjunction { op, children } => emit_conjunction(*op, children, dialect),

        Expr::Call {
            name,
            is_operator,
            children,
        } => emit_call(name, *is_operator, children, dialect),

        Expr::Cast { child, target_type } => {
            let child_sql = emit_expr(child, dialect)?;
            Some(format!("CAST({child_sql} AS {})", dialect.cast_type_name(target_type)))
        }

        Expr::Between {
            input,
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        } => {
            let input_sql = emit_expr(input, dialect)?;
            let lower_sql = emit_expr(lower, dialect)?;
            let upper_sql = emit_expr(upper, dialect)?;
            if *lower_inclusive && *upper_inclusive {
                Some(format!("{input_sql} BETWEEN {lower_sql} AND {upper_sql}"))
            } else {
                let lower_op = if *lower_inclusive { ">=" } else { ">" };
                let upper_op = if *upper_inclusive { "<=" } else { "<" };
                Some(format!(
                    "({input_sql} {lower_op} {lower_sql} AND {input_sql} {upper_op} {upper_sql})"
                ))
            }
        }

        Expr::Case {
            branches,
            else_branch,
        } => {
            let mut rendered = Vec::with_capacity(branches.len());
            for (when, then) in branches {
                let when_sql = emit_expr(when, dialect)?;
                let then_sql = emit_expr(then, dialect)?;
                rendered.push(format!("WHEN {when_sql} THEN {then_sql}"));
            }
            let else_sql = match else_branch {
                Some(e) => Some(emit_expr(e, dialect)?),
                None => None,
            };
            let mut sql = format!("CASE {}", rendered.join(" "));
            if let Some(else_sql) = else_sql {
                sql.push_str(" ELSE ");
                sql.push_str(&else_sql);
            }
            sql.push_str(" END");
            Some(sql)
        }
    }
}

fn emit_conjunction(op: ConjunctionOp, children: &[Expr], dialect: &dyn Dialect) -> Option<String> {
    match op {
        // AND: salvage whatever children render, dropping the rest.
        ConjunctionOp::And => join_with(children.iter().map(|c| emit_expr(c, dialect)), "AND"),
        // OR: one unrenderable child poisons the whole expression.
        ConjunctionOp::Or => {
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                parts.push(emit_expr(child, dialect)?);
            }
            join_with(parts.into_iter().map(Some), "OR")
        }
    }
}

fn emit_call(name: &str, is_operator: bool, children: &[Expr], dialect: &dyn Dialect) -> Option<String> {
    let lowered = name.to_ascii_lowercase();

    if lowered == "in" || lowered == "not in" {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            parts.push(emit_expr(child, dialect)?);
        }
        let (target, values) = parts.split_first()?;
        let verb = if lowered == "in" { "IN" } else { "NOT IN" };
        return Some(format!("{target} {verb} ({})", values.join(", ")));
    }

    let mut rendered = Vec::with_capacity(children.len());
    for child in children {
        rendered.push(emit_expr(child, dialect)?);
    }

    if is_operator {
        if let Some(symbol) = dialect.operator_symbol(&lowered) {
            return Some(match rendered.as_slice() {
                [only] => format!("({symbol} {only})"),
                [left, right] => format!("({left} {symbol} {right})"),
                many => format!("({})", many.join(&format!(" {symbol} "))),
            });
        }
        return None;
    }

    Some(format!("{name}({})", rendered.join(", ")))
}

fn emit_constant(logical_type: &LogicalType, value: &Value, dialect: &dyn Dialect) -> String {
    if matches!(value, Value::Null) {
        return "NULL".to_string();
    }

    match (logical_type, value) {
        (LogicalType::Boolean, Value::Boolean(b)) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        (_, Value::Int128(i)) => i.to_string(),
        (_, Value::UInt128(u)) => u.to_string(),
        (LogicalType::Decimal { width, scale }, Value::Double(d)) => {
            dialect.decimal_literal(*d, *width, *scale)
        }
        (_, Value::Double(d)) => {
            if d.is_nan() {
                "'NaN'".to_string()
            } else if d.is_infinite() {
                if *d > 0.0 {
                    "'Infinity'".to_string()
                } else {
                    "'-Infinity'".to_string()
                }
            } else {
                format!("{d}")
            }
        }
        (_, Value::String(s)) => dialect.string_literal(s),
        (_, Value::Blob(b)) => dialect.blob_literal(b),
        (_, Value::Date(days)) => dialect.date_literal(*days),
        (_, Value::Time(micros)) => dialect.time_literal(*micros),
        (LogicalType::Timestamp { unit, tz }, Value::Timestamp(v)) => {
            dialect.timestamp_literal(*v, *unit, tz.as_deref())
        }
        (_, Value::Interval { months, days, micros }) => dialect.interval_literal(*months, *days, *micros),
        (_, Value::Uuid(u)) => dialect.uuid_literal(u),
        (LogicalType::List(_) | LogicalType::Array(_, _), Value::List(items)) => {
            let inner_type = match logical_type {
                LogicalType::List(t) | LogicalType::Array(t, _) => t.as_ref(),
                _ => unreachable!(),
            };
            let rendered: Vec<String> = items
                .iter()
                .map(|v| emit_constant(inner_type, v, dialect))
                .collect();
            format!("[{}]", rendered.join(", "))
        }
        (LogicalType::Struct(fields), Value::Struct(values)) => {
            let rendered: Vec<String> = fields
                .iter()
                .zip(values.iter())
                .map(|((_, t), (name, v))| format!("{}: {}", dialect.string_literal(name).trim_matches('\''), emit_constant(t, v, dialect)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        (LogicalType::Map(key_type, value_type), Value::Map(entries)) => {
            let keys: Vec<String> = entries
                .iter()
                .map(|(k, _)| emit_constant(key_type, k, dialect))
                .collect();
            let values: Vec<String> = entries
                .iter()
                .map(|(_, v)| emit_constant(value_type, v, dialect))
                .collect();
            format!("MAP([{}], [{}])", keys.join(", "), values.join(", "))
        }
        _ => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::duckdb::DuckDbDialect;
    use super::*;
    use crate::filter::ast::Expr;

    fn col(name: &str) -> Expr {
        Expr::Column {
            index: 0,
            name: name.to_string(),
        }
    }

    fn int(v: i64) -> Expr {
        Expr::Constant {
            logical_type: LogicalType::BigInt,
            value: Value::Int128(v as i128),
        }
    }

    #[test]
    fn and_drops_unsupported_children() {
        let expr = Expr::Conjunction {
            op: ConjunctionOp::And,
            children: vec![
                Expr::Call {
                    name: "=".to_string(),
                    is_operator: true,
                    children: vec![col("a"), int(1)],
                },
                Expr::Unsupported,
            ],
        };
        let sql = emit(&[expr], &DuckDbDialect).expect("sql");
        assert_eq!(sql, "(\"a\" = 1)");
    }

    #[test]
    fn or_with_unsupported_child_is_entirely_dropped() {
        let expr = Expr::Conjunction {
            op: ConjunctionOp::Or,
            children: vec![
                Expr::Call {
                    name: "=".to_string(),
                    is_operator: true,
                    children: vec![col("a"), int(1)],
                },
                Expr::Unsupported,
            ],
        };
        assert_eq!(emit(&[expr], &DuckDbDialect), None);
    }

    #[test]
    fn in_renders_target_and_value_list() {
        let expr = Expr::Call {
            name: "in".to_string(),
            is_operator: false,
            children: vec![col("a"), int(1), int(2)],
        };
        let sql = emit(&[expr], &DuckDbDialect).expect("sql");
        assert_eq!(sql, "\"a\" IN (1, 2)");
    }
}
