//! Query result types for esql-reports.
//!
//! Defines the structures used to represent ES|QL columns and the tidy,
//! row-oriented records handed to chart scripts.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Column type tag the backend uses for timestamps.
pub const DATE_TYPE: &str = "date";

/// Metadata about a column in a query response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type as reported by the backend (e.g. "date", "double").
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Returns true if the column holds timestamps.
    pub fn is_date(&self) -> bool {
        self.data_type == DATE_TYPE
    }
}

/// A single value in a tidy record.
#[derive(Debug, Clone, PartialEq)]
pub enum TidyValue {
    /// Any value passed through unchanged from the response.
    Scalar(serde_json::Value),

    /// A value from a date column, converted to a timestamp.
    Date(DateTime<Utc>),
}

impl TidyValue {
    /// Returns the timestamp if this is a date value.
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(date),
            Self::Scalar(_) => None,
        }
    }

    /// Returns the raw JSON value if this is a scalar.
    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Date(_) => None,
        }
    }
}

// Dates serialize the way a browser's `Date.toISOString()` does, which is
// what Vega-Lite's temporal parsing expects.
impl Serialize for TidyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Scalar(value) => value.serialize(serializer),
            Self::Date(date) => {
                serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

impl From<serde_json::Value> for TidyValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Scalar(v)
    }
}

impl From<DateTime<Utc>> for TidyValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<f64> for TidyValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i64> for TidyValue {
    fn from(v: i64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<&str> for TidyValue {
    fn from(v: &str) -> Self {
        Self::Scalar(v.into())
    }
}

/// One response row keyed by column name.
pub type TidyRecord = IndexMap<String, TidyValue>;

/// All rows of one query, in response order.
pub type TidyData = Vec<TidyRecord>;

/// Named queries declared by a chart script, in declaration order.
pub type QuerySet = IndexMap<String, String>;

/// Normalized results keyed by the same names as the originating [`QuerySet`].
pub type QueryResults = IndexMap<String, TidyData>;
