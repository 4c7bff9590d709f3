//! Value model for the document gateway.
//!
//! The gateway stores schemaless documents; this module gives the rest of the
//! workspace a typed vocabulary for them: which collection a document lives
//! in, the values a write may carry (including the server-timestamp marker),
//! and the values a stored document resolves to.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// Well-known field names shared by all backends. Documents keep the
/// camelCase names the original data set was written with.
pub mod fields {
    pub const NUMBER: &str = "number";
    pub const CREATED_AT: &str = "createdAt";
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const LINE_ID: &str = "lineId";
    pub const STATUS: &str = "status";
    pub const VALUE: &str = "value";
}

/// Counter document ids within [`Collection::Counters`].
pub mod counters {
    pub const TIMELINE_NUMBER: &str = "timelineNumber";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Timelines,
    Notes,
    Counters,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timelines => "timelines",
            Self::Notes => "notes",
            Self::Counters => "counters",
        }
    }
}

/// A value in a pending write. `ServerTime` is the marker the backend
/// resolves against its own clock at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    Str(String),
    Int(i64),
    ServerTime,
}

impl WriteValue {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }
}

/// A value read back from a stored document, timestamps resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Str(String),
    Int(i64),
    Time(DateTime<Utc>),
}

impl StoredValue {
    /// Ordering used by backend-side sorts. Values of different kinds do not
    /// occur under the same field name in practice and compare equal.
    pub fn sort_cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Fields of a create or update call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentWrite {
    fields: BTreeMap<String, WriteValue>,
}

impl DocumentWrite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: WriteValue) -> &mut Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn with(mut self, field: &str, value: WriteValue) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &WriteValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A stored document as returned by reads and queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    collection: Collection,
    id: String,
    fields: BTreeMap<String, StoredValue>,
}

impl Document {
    pub fn new(collection: Collection, id: String, fields: BTreeMap<String, StoredValue>) -> Self {
        Self {
            collection,
            id,
            fields,
        }
    }

    /// Applies a write on top of existing fields, resolving `ServerTime`
    /// markers against `server_time`. Backends use this for both creates
    /// (empty base) and in-place updates.
    pub fn resolve(
        collection: Collection,
        id: String,
        write: DocumentWrite,
        server_time: DateTime<Utc>,
    ) -> Self {
        let mut doc = Self::new(collection, id, BTreeMap::new());
        doc.apply(write, server_time);
        doc
    }

    pub fn apply(&mut self, write: DocumentWrite, server_time: DateTime<Utc>) {
        for (field, value) in write.fields {
            let resolved = match value {
                WriteValue::Str(s) => StoredValue::Str(s),
                WriteValue::Int(i) => StoredValue::Int(i),
                WriteValue::ServerTime => StoredValue::Time(server_time),
            };
            self.fields.insert(field, resolved);
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&StoredValue> {
        self.fields.get(field)
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(StoredValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(StoredValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn time(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(field) {
            Some(StoredValue::Time(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &StoredValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: StoredValue,
}

/// Query over one collection: optional equality filter, optional order,
/// optional limit. This is the whole query surface the board needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub order_by: Option<OrderBy>,
    pub filter: Option<Filter>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<StoredValue>) -> Self {
        self.filter = Some(Filter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_replaces_server_time_marker() {
        let now = Utc::now();
        let write = DocumentWrite::new()
            .with(fields::TITLE, WriteValue::str("T"))
            .with(fields::CREATED_AT, WriteValue::ServerTime);
        let doc = Document::resolve(Collection::Notes, "n1".to_string(), write, now);
        assert_eq!(doc.str(fields::TITLE), Some("T"));
        assert_eq!(doc.time(fields::CREATED_AT), Some(now));
    }

    #[test]
    fn apply_overwrites_only_named_fields() {
        let now = Utc::now();
        let mut doc = Document::resolve(
            Collection::Notes,
            "n1".to_string(),
            DocumentWrite::new()
                .with(fields::TITLE, WriteValue::str("old"))
                .with(fields::CONTENT, WriteValue::str("body")),
            now,
        );
        doc.apply(
            DocumentWrite::new().with(fields::TITLE, WriteValue::str("new")),
            now,
        );
        assert_eq!(doc.str(fields::TITLE), Some("new"));
        assert_eq!(doc.str(fields::CONTENT), Some("body"));
    }

    #[test]
    fn stored_value_sort_cmp_orders_numbers_and_times() {
        assert_eq!(
            StoredValue::Int(1).sort_cmp(&StoredValue::Int(2)),
            std::cmp::Ordering::Less
        );
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::seconds(5);
        assert_eq!(
            StoredValue::Time(later).sort_cmp(&StoredValue::Time(earlier)),
            std::cmp::Ordering::Greater
        );
    }
}
