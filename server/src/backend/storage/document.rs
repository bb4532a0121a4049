//! Document and query types shared by every document store backend.
//!
//! Repositories build a [`DocumentQuery`], hand it to a
//! [`DocumentStore`](super::traits::DocumentStore) and decode the returned
//! [`Document`]s into domain models. Nothing above the repository layer sees
//! these types.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Pseudo-field addressing the document's own key in filters.
pub const DOCUMENT_ID_FIELD: &str = "__name__";

/// A single field value as stored in the document database
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    /// Document path relative to the database root, e.g. `customer/abc123`
    Reference(String),
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Reference to `collection/id`
    pub fn reference(collection: &str, id: &str) -> Self {
        FieldValue::Reference(format!("{}/{}", collection, id))
    }

    /// Numeric view of the value. Numeric strings count as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Double(d) => Some(*d),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            FieldValue::Reference(path) => Some(path.as_str()),
            _ => None,
        }
    }

    /// Id of the referenced document. Plain strings are treated as ids.
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            FieldValue::Reference(path) => path.rsplit('/').next().filter(|id| !id.is_empty()),
            FieldValue::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// Display form used when a loosely typed field has to be searched or printed
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Double(d) => d.to_string(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Timestamp(t) => t.to_rfc3339(),
            FieldValue::Reference(path) => path.clone(),
            FieldValue::Array(values) => values
                .iter()
                .map(FieldValue::to_display_string)
                .collect::<Vec<_>>()
                .join(" "),
            FieldValue::Map(_) => String::new(),
        }
    }
}

/// Ordering between two values of comparable kinds. Integers and doubles
/// compare numerically; mismatched kinds are unordered.
pub fn compare_values(left: &FieldValue, right: &FieldValue) -> Option<Ordering> {
    match (left, right) {
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
        (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
        (FieldValue::Reference(a), FieldValue::Reference(b)) => Some(a.cmp(b)),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
        (FieldValue::Integer(_) | FieldValue::Double(_), FieldValue::Integer(_) | FieldValue::Double(_)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        _ => None,
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        FieldValue::Array(value)
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldValue {
    fn from(value: BTreeMap<String, FieldValue>) -> Self {
        FieldValue::Map(value)
    }
}

/// A stored document: its key, full path and top-level fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// `collection/id`
    pub path: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(collection: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            path: format!("{}/{}", collection, id),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Collection segment of the document path
    pub fn collection(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((parent, _)) => parent.rsplit('/').next().unwrap_or(parent),
            None => "",
        }
    }

    /// Look up a field. Dotted paths descend into maps (`userType.customer`).
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        let mut segments = field.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            match current {
                FieldValue::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Non-empty string field
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            FieldValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Numeric field, absent or non-numeric values read as zero
    pub fn number(&self, field: &str) -> f64 {
        self.get(field).and_then(FieldValue::as_f64).unwrap_or(0.0)
    }

    pub fn opt_number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(FieldValue::as_timestamp)
    }

    pub fn reference(&self, field: &str) -> Option<String> {
        self.get(field).and_then(FieldValue::as_reference).map(str::to_string)
    }

    /// Id of a referenced document; string ids are accepted too
    pub fn reference_id(&self, field: &str) -> Option<String> {
        self.get(field).and_then(FieldValue::reference_id).map(str::to_string)
    }

    /// A field holding either one reference or an array of them
    pub fn references(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(FieldValue::Reference(path)) => vec![path.clone()],
            Some(FieldValue::Array(values)) => values
                .iter()
                .filter_map(FieldValue::as_reference)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn array(&self, field: &str) -> Option<&[FieldValue]> {
        self.get(field).and_then(FieldValue::as_array)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-collection query: conjunction of filters, optional ordering and limit
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<u32>,
}

impl DocumentQuery {
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_string(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    fn filter(mut self, field: &str, op: FilterOp, value: FieldValue) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::Equal, value.into())
    }

    pub fn where_gte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::GreaterOrEqual, value.into())
    }

    pub fn where_lte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::LessOrEqual, value.into())
    }

    pub fn where_in(self, field: &str, values: Vec<FieldValue>) -> Self {
        self.filter(field, FilterOp::In, FieldValue::Array(values))
    }

    /// Inclusive timestamp range on `field`
    pub fn where_between(self, field: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.where_gte(field, start).where_lte(field, end)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same query without its ordering clause
    pub fn without_order(&self) -> Self {
        Self {
            order_by: None,
            ..self.clone()
        }
    }
}
