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

//! The DuckDB SQL dialect: the only emitter shipped today, but kept
//! behind the [`Dialect`] trait so a second backend doesn't need to
//! touch the expression walker.

use super::dialect::Dialect;
use super::value::{LogicalType, TimestampUnit};

pub struct DuckDbDialect;

impl Dialect for DuckDbDialect {
    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn string_literal(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    fn blob_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("'\\x{hex}'::BLOB")
    }

    fn uuid_literal(&self, uuid: &uuid::Uuid) -> String {
        format!("'{uuid}'::UUID")
    }

    fn date_literal(&self, days_since_epoch: i32) -> String {
        let date = epoch_date() + chrono::Duration::days(days_since_epoch as i64);
        format!("DATE '{}'", date.format("%Y-%m-%d"))
    }

    fn time_literal(&self, micros_since_midnight: i64) -> String {
        let total_micros = micros_since_midnight.rem_euclid(24 * 3_600 * 1_000_000);
        let hours = total_micros / 3_600_000_000;
        let minutes = (total_micros / 60_000_000) % 60;
        let seconds = (total_micros / 1_000_000) % 60;
        let micros = total_micros % 1_000_000;
        format!("TIME '{hours:02}:{minutes:02}:{seconds:02}.{micros:06}'")
    }

    fn timestamp_literal(&self, value: i64, unit: TimestampUnit, tz: Option<&str>) -> String {
        use chrono::TimeZone;
        let (secs, nanos) = match unit {
            TimestampUnit::Sec => (value, 0),
            TimestampUnit::Ms => (value.div_euclid(1_000), (value.rem_euclid(1_000) * 1_000_000) as u32),
            TimestampUnit::Us => (value.div_euclid(1_000_000), (value.rem_euclid(1_000_000) * 1_000) as u32),
            TimestampUnit::Ns => (value.div_euclid(1_000_000_000), value.rem_euclid(1_000_000_000) as u32),
        };
        let naive = chrono::Utc.timestamp_opt(secs, nanos).single().unwrap_or_default();
        if tz.is_some() {
            format!("TIMESTAMPTZ '{}'", naive.format("%Y-%m-%d %H:%M:%S%.6f+00"))
        } else {
            format!("TIMESTAMP '{}'", naive.format("%Y-%m-%d %H:%M:%S%.6f"))
        }
    }

    fn interval_literal(&self, months: i32, days: i32, micros: i64) -> String {
        format!("INTERVAL '{months} months {days} days {micros} microseconds'")
    }

    fn decimal_literal(&self, unscaled: f64, width: u8, scale: u8) -> String {
        format!("{unscaled:.*}::DECIMAL({width},{scale})", scale as usize)
    }

    fn operator_symbol(&self, name: &str) -> Option<&'static str> {
        Some(match name {
            "=" | "equal" => "=",
            "<>" | "!=" | "notequal" => "<>",
            "<" | "lessthan" => "<",
            "<=" | "lessthanorequal" => "<=",
            ">" | "greaterthan" => ">",
            ">=" | "greaterthanorequal" => ">=",
            "and" => "AND",
            "or" => "OR",
            "not" => "NOT",
            "+" | "add" => "+",
            "-" | "subtract" => "-",
            "*" | "multiply" => "*",
            "/" | "divide" => "/",
            "is not distinct from" => "IS NOT DISTINCT FROM",
            "is distinct from" => "IS DISTINCT FROM",
            _ => return None,
        })
    }

    fn cast_type_name(&self, target: &LogicalType) -> String {
        match target {
            LogicalType::Boolean => "BOOLEAN".to_string(),
            LogicalType::TinyInt => "TINYINT".to_string(),
            LogicalType::SmallInt => "SMALLINT".to_string(),
            LogicalType::Integer => "INTEGER".to_string(),
            LogicalType::BigInt => "BIGINT".to_string(),
            LogicalType::HugeInt => "HUGEINT".to_string(),
            LogicalType::UTinyInt => "UTINYINT".to_string(),
            LogicalType::USmallInt => "USMALLINT".to_string(),
            LogicalType::UInteger => "UINTEGER".to_string(),
            LogicalType::UBigInt => "UBIGINT".to_string(),
            LogicalType::UHugeInt => "UHUGEINT".to_string(),
            LogicalType::Float => "FLOAT".to_string(),
            LogicalType::Double => "DOUBLE".to_string(),
            LogicalType::Decimal { width, scale } => format!("DECIMAL({width},{scale})"),
            LogicalType::Varchar => "VARCHAR".to_string(),
            LogicalType::Char => "VARCHAR".to_string(),
            LogicalType::Blob => "BLOB".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Time { with_tz: false } => "TIME".to_string(),
            LogicalType::Time { with_tz: true } => "TIMETZ".to_string(),
            LogicalType::Timestamp { tz: Some(_), .. } => "TIMESTAMPTZ".to_string(),
            LogicalType::Timestamp { tz: None, .. } => "TIMESTAMP".to_string(),
            LogicalType::Interval => "INTERVAL".to_string(),
            LogicalType::Uuid => "UUID".to_string(),
            LogicalType::List(child) => format!("{}[]", self.cast_type_name(child)),
            LogicalType::Array(child, size) => format!("{}[{size}]", self.cast_type_name(child)),
            LogicalType::Struct(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, t)| format!("{} {}", self.quote_ident(name), self.cast_type_name(t)))
                    .collect();
                format!("STRUCT({})", rendered.join(", "))
            }
            LogicalType::Map(key, value) => {
                format!("MAP({}, {})", self.cast_type_name(key), self.cast_type_name(value))
            }
            LogicalType::Enum(_) => "VARCHAR".to_string(),
        }
    }
}

fn epoch_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_embedded_quotes() {
        let dialect = DuckDbDialect;
        assert_eq!(dialect.quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn renders_date_literal_from_epoch_days() {
        let dialect = DuckDbDialect;
        assert_eq!(dialect.date_literal(0), "DATE '1970-01-01'");
        assert_eq!(dialect.date_literal(1), "DATE '1970-01-02'");
    }

    #[test]
    fn renders_hugeint_cast_type() {
        let dialect = DuckDbDialect;
        assert_eq!(dialect.cast_type_name(&LogicalType::HugeInt), "HUGEINT");
    }
}
