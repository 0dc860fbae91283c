//! Raw query responses and their conversion into tidy records.
//!
//! A [`QueryResponse`] is whatever the endpoint sent back. It is parsed into a
//! typed [`ResultSet`] at this boundary, rejecting backend errors and payloads
//! without the `columns` / `values` shape, before rows are converted.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tracing::warn;

use super::types::{ColumnInfo, TidyData, TidyRecord, TidyValue};
use crate::error::{ReportError, Result};

/// Formats accepted for zone-less timestamps, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// The raw body returned by the query endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    raw: Value,
}

impl QueryResponse {
    /// Creates a response from an already-decoded JSON body.
    pub fn from_json(raw: Value) -> Self {
        Self { raw }
    }

    /// Creates a response from a body as received on the wire.
    ///
    /// A body that is not JSON is kept as a JSON string so that normalization
    /// can report it verbatim.
    pub fn from_body(body: &str) -> Self {
        let raw = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        Self { raw }
    }

    /// The empty-shaped response substituted for transport failures.
    pub fn empty() -> Self {
        Self {
            raw: json!({ "columns": [], "values": [] }),
        }
    }

    /// The raw JSON body.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Parses the body into a typed result set.
    ///
    /// A falsy body is an empty result. Otherwise checks run in order: a
    /// truthy `error` field, missing `columns`, missing `values`, then the
    /// shape of both.
    pub fn parse(&self) -> Result<ResultSet> {
        // A falsy body (`null`, `""`, ...) reads as an empty result.
        if !is_truthy(&self.raw) {
            return Ok(ResultSet::default());
        }

        let Some(body) = self.raw.as_object() else {
            return Err(ReportError::malformed("a body that is not a JSON object", &self.raw));
        };

        if body.get("error").is_some_and(is_truthy) {
            return Err(ReportError::backend(&self.raw));
        }

        let columns = match body.get("columns") {
            None | Some(Value::Null) => {
                return Err(ReportError::malformed("no columns", &self.raw));
            }
            Some(columns) => columns,
        };

        let values = match body.get("values") {
            None | Some(Value::Null) => {
                return Err(ReportError::malformed("no values", &self.raw));
            }
            Some(values) => values,
        };

        let columns: Vec<ColumnInfo> = serde_json::from_value(columns.clone())
            .map_err(|e| ReportError::malformed(format!("invalid columns ({e})"), &self.raw))?;
        let values: Vec<Vec<Value>> = serde_json::from_value(values.clone())
            .map_err(|e| ReportError::malformed(format!("invalid values ({e})"), &self.raw))?;

        Ok(ResultSet { columns, values })
    }
}

/// A validated, columnar query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column metadata, positionally aligned with every row.
    pub columns: Vec<ColumnInfo>,

    /// Rows of raw values.
    pub values: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Converts the columnar rows into tidy records, one per row, in order.
    ///
    /// Values in `date` columns become timestamps; everything else is copied.
    /// A date cell that cannot be read becomes `null` and is logged.
    /// Duplicate column names are not merged: the later column's value wins.
    /// Missing trailing cells become `null`.
    pub fn into_records(self) -> TidyData {
        let is_date: HashMap<&str, bool> = self
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.is_date()))
            .collect();

        self.values
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let mut record = TidyRecord::with_capacity(self.columns.len());

                for column in &self.columns {
                    let raw = cells.next().unwrap_or(Value::Null);
                    let value = if is_date.get(column.name.as_str()).copied().unwrap_or(false) {
                        parse_date(&raw).unwrap_or_else(|| {
                            warn!("unparseable date {} in column \"{}\"", raw, column.name);
                            TidyValue::Scalar(Value::Null)
                        })
                    } else {
                        TidyValue::Scalar(raw)
                    };
                    record.insert(column.name.clone(), value);
                }

                record
            })
            .collect()
    }
}

/// Validates a raw response and converts it into tidy records.
///
/// Fails only on the response shape; cell values never fail the call.
pub fn normalize(response: &QueryResponse) -> Result<TidyData> {
    Ok(response.parse()?.into_records())
}

/// Mirrors JavaScript truthiness, which is how the backend's error marker is tested.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a date cell. `null` stays `null`; numbers are epoch milliseconds.
fn parse_date(raw: &Value) -> Option<TidyValue> {
    match raw {
        Value::Null => Some(TidyValue::Scalar(Value::Null)),
        Value::String(s) => parse_date_str(s).map(TidyValue::Date),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .map(TidyValue::Date),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
