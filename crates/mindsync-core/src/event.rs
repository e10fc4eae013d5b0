//! Row-level change events delivered by the source change feed.
//!
//! Events are fire-and-forget: the relay consumes each one exactly once and
//! never persists it. Insert and update carry the full new row image; delete
//! carries the old image, which the feed may reduce to the identity columns.

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::CoreError;

/// The three row mutations the feed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    /// Wire spelling used by the feed and in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row-level change observed on a source table.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A new row appeared; `record` is the full new row image.
    Insert {
        /// Full new row image.
        record: Map<String, Value>,
    },
    /// An existing row changed; `record` is the full new row image.
    Update {
        /// Full new row image.
        record: Map<String, Value>,
    },
    /// A row disappeared; `old_record` identifies it.
    Delete {
        /// Old row image (at minimum the identity columns).
        old_record: Map<String, Value>,
    },
}

impl ChangeEvent {
    /// The mutation kind of this event.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Insert { .. } => ChangeKind::Insert,
            Self::Update { .. } => ChangeKind::Update,
            Self::Delete { .. } => ChangeKind::Delete,
        }
    }

    /// The row image the destination write is keyed on: the new image for
    /// insert/update, the old image for delete.
    #[must_use]
    pub const fn row(&self) -> &Map<String, Value> {
        match self {
            Self::Insert { record } | Self::Update { record } => record,
            Self::Delete { old_record } => old_record,
        }
    }

    /// Extract the primary identifier from the relevant row image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingId`] when the image has no `id` column or
    /// its value is not a scalar string/number.
    pub fn row_id(&self, table: &str) -> Result<RowId, CoreError> {
        RowId::from_row(table, self.row())
    }
}

/// A primary identifier rendered to the form used in `id=eq.{value}` filters.
///
/// Identifier columns on the platform are either uuids (JSON strings, rendered
/// raw without quotes) or integers (rendered via display). Anything else is
/// rejected rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(String);

impl RowId {
    /// Extract the `id` column from a row image.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingId`] for a missing, null, or non-scalar id.
    pub fn from_row(table: &str, row: &Map<String, Value>) -> Result<Self, CoreError> {
        match row.get("id") {
            Some(Value::String(s)) if !s.is_empty() => Ok(Self(s.clone())),
            Some(Value::Number(n)) => Ok(Self(n.to_string())),
            Some(other) => Err(CoreError::MissingId {
                table: table.to_string(),
                reason: format!("id is {other}"),
            }),
            None => Err(CoreError::MissingId {
                table: table.to_string(),
                reason: "id column absent".to_string(),
            }),
        }
    }

    /// The rendered identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("fixture must be a JSON object");
        };
        map
    }

    #[test]
    fn insert_extracts_uuid_id() {
        let event = ChangeEvent::Insert {
            record: row(json!({"id": "b7f9c1e2-aaaa-bbbb-cccc-000000000042", "mood": 3})),
        };
        let id = event.row_id("emotion_diaries").unwrap();
        assert_eq!(id.as_str(), "b7f9c1e2-aaaa-bbbb-cccc-000000000042");
        assert_eq!(event.kind(), ChangeKind::Insert);
    }

    #[test]
    fn numeric_id_renders_without_quotes() {
        let event = ChangeEvent::Update {
            record: row(json!({"id": 42, "title": "calm"})),
        };
        assert_eq!(event.row_id("community_posts").unwrap().to_string(), "42");
    }

    #[test]
    fn delete_uses_old_record() {
        let event = ChangeEvent::Delete {
            old_record: row(json!({"id": 7})),
        };
        assert_eq!(event.kind(), ChangeKind::Delete);
        assert_eq!(event.row_id("post_likes").unwrap().as_str(), "7");
    }

    #[test]
    fn missing_id_is_an_error() {
        let event = ChangeEvent::Insert {
            record: row(json!({"name": "no id here"})),
        };
        let err = event.row_id("profiles").unwrap_err();
        assert!(matches!(err, CoreError::MissingId { .. }));
        assert!(err.to_string().contains("profiles"));
    }

    #[test]
    fn null_id_is_an_error() {
        let event = ChangeEvent::Delete {
            old_record: row(json!({"id": null})),
        };
        assert!(event.row_id("user_favorites").is_err());
    }

    #[test]
    fn kind_display_matches_wire_spelling() {
        assert_eq!(ChangeKind::Insert.to_string(), "INSERT");
        assert_eq!(ChangeKind::Update.to_string(), "UPDATE");
        assert_eq!(ChangeKind::Delete.to_string(), "DELETE");
    }
}
