//! [`FlatEvent`] and [`EventStream`]
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp_utils::parse_timestamp_millis;

/// A single event of a flat event stream
///
/// The raw input unit for pattern mining: a timestamp, an activity label and,
/// optionally, the entity (e.g., process execution) the event belongs to and
/// the objects it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlatEvent {
    /// Timestamp of the event
    ///
    /// Only the order of timestamps matters to the miners.
    /// When deserializing, date strings are accepted and converted to milliseconds since the UNIX epoch.
    #[serde(deserialize_with = "deserialize_timestamp")]
    #[schemars(with = "TimestampRepr")]
    pub timestamp: i64,
    /// Activity label
    #[serde(alias = "activity")]
    pub label: String,
    /// Entity (e.g., process execution) the event belongs to
    #[serde(default, alias = "pid", skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// References to involved objects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,
}

impl FlatEvent {
    /// Create a new [`FlatEvent`] without entity and objects
    pub fn new(timestamp: i64, label: impl Into<String>) -> Self {
        Self {
            timestamp,
            label: label.into(),
            entity: None,
            objects: Vec::new(),
        }
    }

    /// Set the entity of this event
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the object references of this event
    pub fn with_objects<S: Into<String>>(mut self, objects: impl IntoIterator<Item = S>) -> Self {
        self.objects = objects.into_iter().map(Into::into).collect();
        self
    }
}

impl<L: Into<String>> From<(i64, L)> for FlatEvent {
    fn from((timestamp, label): (i64, L)) -> Self {
        FlatEvent::new(timestamp, label)
    }
}

impl<L: Into<String>, E: Into<String>, O: Into<String>> From<(i64, L, E, Vec<O>)> for FlatEvent {
    fn from((timestamp, label, entity, objects): (i64, L, E, Vec<O>)) -> Self {
        FlatEvent::new(timestamp, label)
            .with_entity(entity)
            .with_objects(objects)
    }
}

#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum TimestampRepr {
    Integer(i64),
    Date(String),
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match TimestampRepr::deserialize(deserializer)? {
        TimestampRepr::Integer(t) => Ok(t),
        TimestampRepr::Date(s) => parse_timestamp_millis(&s).map_err(serde::de::Error::custom),
    }
}

/// An ordered, fully materialized stream of [`FlatEvent`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EventStream {
    /// Events of the stream (in input order)
    pub events: Vec<FlatEvent>,
}

impl EventStream {
    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the stream contains no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Check if at least one event carries an entity
    ///
    /// If not, supports are counted by occurrence instead of by distinct entities.
    pub fn has_entities(&self) -> bool {
        self.events.iter().any(|e| e.entity.is_some())
    }
}

impl From<Vec<FlatEvent>> for EventStream {
    fn from(events: Vec<FlatEvent>) -> Self {
        Self { events }
    }
}

impl<E: Into<FlatEvent>> FromIterator<E> for EventStream {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl AsRef<[FlatEvent]> for EventStream {
    fn as_ref(&self) -> &[FlatEvent] {
        &self.events
    }
}
