//! Event log
//!
//! Append-only record of display rate changes and user clicks. Entries are
//! never edited or removed, and insertion order is chronological order.

use serde::{Deserialize, Deserializer, Serialize};

use crate::sim::BallSnapshot;

/// What was on screen when an event was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    /// Display rate in effect (the new rate, for rate changes)
    pub hz: u32,
    pub ball: BallSnapshot,
}

/// A recorded test event
///
/// Serialized with a `type` tag of `display` or `user`, matching the
/// export format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The display rate was set or changed
    #[serde(rename = "display")]
    RateChange {
        /// Wall clock time in milliseconds
        ts: f64,
        display: DisplaySnapshot,
        previous: u32,
        current: u32,
    },
    /// The user pressed the button
    #[serde(rename = "user")]
    UserClick { ts: f64, display: DisplaySnapshot },
}

/// Event type, for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RateChange,
    UserClick,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RateChange { .. } => EventKind::RateChange,
            Event::UserClick { .. } => EventKind::UserClick,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match *self {
            Event::RateChange { ts, .. } | Event::UserClick { ts, .. } => ts,
        }
    }

    /// Display rate in effect when the event was recorded
    pub fn rate_hz(&self) -> u32 {
        match self {
            Event::RateChange { display, .. } | Event::UserClick { display, .. } => display.hz,
        }
    }
}

/// Ordered, append-only event sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    ///
    /// Only the controller appends, and it stamps events from a clock that
    /// never runs backwards.
    pub(crate) fn record(&mut self, event: Event) {
        debug_assert!(
            self.events
                .last()
                .is_none_or(|last| last.timestamp() <= event.timestamp()),
            "event log timestamps must not decrease"
        );
        log::debug!("New event: {:?}", event);
        self.events.push(event);
    }

    /// All events in chronological order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Events of one kind, in order
    pub fn filter_by_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.filter_by_kind(kind).count()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl From<Vec<Event>> for EventLog {
    /// Rebuild a log from parsed export data, sorted by timestamp
    fn from(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| {
            a.timestamp()
                .partial_cmp(&b.timestamp())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { events }
    }
}

impl<'de> Deserialize<'de> for EventLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Event>::deserialize(deserializer).map(Self::from)
    }
}
