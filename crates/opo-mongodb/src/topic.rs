//! Topic Record model and classification filters
//!
//! Topics live in `topics_uuid_map`. Legacy documents predate the `type`
//! field and carry no classification at all.

use bson::{doc, Bson, Document as BsonDocument};
use opo_common::OpoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection holding the topic records
pub const TOPICS_COLLECTION: &str = "topics_uuid_map";

/// Classification of a topic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    #[default]
    Topic,
    Exam,
    Misc,
}

impl TopicType {
    /// Every kind, in the order statistics are reported
    pub const ALL: [TopicType; 3] = [TopicType::Topic, TopicType::Exam, TopicType::Misc];

    pub fn as_str(self) -> &'static str {
        match self {
            TopicType::Topic => "topic",
            TopicType::Exam => "exam",
            TopicType::Misc => "misc",
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicType {
    type Err = OpoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "topic" => Ok(TopicType::Topic),
            "exam" => Ok(TopicType::Exam),
            "misc" => Ok(TopicType::Misc),
            other => Err(OpoError::Validation(format!(
                "Unknown topic type: {}. Use 'topic', 'exam' or 'misc'.",
                other
            ))),
        }
    }
}

/// A document of the topics collection, reduced to the fields the backfill reads.
///
/// `id` and `title` stay raw BSON: identifiers are strings in some records and
/// numbers in others.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Bson>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TopicRecord {
    /// The parsed classification, `None` when absent or not a known kind
    pub fn topic_type(&self) -> Option<TopicType> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }
}

/// Render an optional BSON value for the report; missing values print as `undefined`
pub fn display_bson(value: Option<&Bson>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Bson::String(s)) => s.clone(),
        Some(Bson::Null) => "null".to_string(),
        Some(Bson::Int32(n)) => n.to_string(),
        Some(Bson::Int64(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Matches records that have no classification field at all
pub fn missing_type_filter() -> BsonDocument {
    doc! { "type": { "$exists": false } }
}

/// Matches records of one classification
pub fn type_filter(kind: TopicType) -> BsonDocument {
    doc! { "type": kind.as_str() }
}

/// Update document assigning a classification
pub fn set_type_update(kind: TopicType) -> BsonDocument {
    doc! { "$set": { "type": kind.as_str() } }
}
