//! Results export and chart data
//!
//! Everything here is derived from a finished [`EventLog`]; nothing feeds
//! back into the test. Chart rendering itself is left to the front end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{DisplaySettings, TestConfig};
use crate::consts::TIMELINE_TAIL_MS;
use crate::events::{Event, EventKind, EventLog};

/// File export: settings plus the ordered event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub settings: DisplaySettings,
    pub data: EventLog,
}

impl ExportPayload {
    pub fn new(config: &TestConfig, log: &EventLog) -> Self {
        Self {
            settings: config.display_settings(),
            data: log.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a previously exported file
    ///
    /// Events come back in timestamp order whatever order the file lists them.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Display rate as a step series: `(timestamp, hz)` per rate event, plus a
/// closing point at the last event so the final rate extends to the end
pub fn rate_steps(log: &EventLog) -> Vec<(f64, u32)> {
    let mut steps: Vec<(f64, u32)> = log
        .filter_by_kind(EventKind::RateChange)
        .filter_map(|e| match *e {
            Event::RateChange { ts, current, .. } => Some((ts, current)),
            Event::UserClick { .. } => None,
        })
        .collect();
    if let Some(last) = log.last() {
        steps.push((last.timestamp(), last.rate_hz()));
    }
    steps
}

/// Timestamps of every user click
pub fn click_marks(log: &EventLog) -> Vec<f64> {
    log.filter_by_kind(EventKind::UserClick)
        .map(Event::timestamp)
        .collect()
}

/// One bar on the timeline chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRange {
    /// e.g. `"45 Hz"`
    pub label: String,
    pub start_ms: f64,
    pub end_ms: f64,
}

/// Timeline bars for one event kind
///
/// Each bar runs until the next event of the same kind; the last one runs
/// to the final event in the log plus a one second tail.
pub fn timeline(log: &EventLog, kind: EventKind) -> Vec<TimelineRange> {
    let Some(last) = log.last() else {
        return Vec::new();
    };
    let tail = last.timestamp() + TIMELINE_TAIL_MS;
    let picked: Vec<&Event> = log.filter_by_kind(kind).collect();

    picked
        .iter()
        .enumerate()
        .map(|(i, e)| TimelineRange {
            label: format!("{} Hz", e.rate_hz()),
            start_ms: e.timestamp(),
            end_ms: picked.get(i + 1).map_or(tail, |next| next.timestamp()),
        })
        .collect()
}

/// Headline numbers for a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// First to last event
    pub duration_ms: f64,
    /// Rate events, including the initial one
    pub rate_changes: usize,
    pub clicks: usize,
    /// Clicks grouped by the rate on screen at the time
    pub clicks_by_rate: BTreeMap<u32, usize>,
    /// Highest rate shown
    pub peak_rate_hz: Option<u32>,
    pub final_rate_hz: Option<u32>,
}

impl RunSummary {
    pub fn from_log(log: &EventLog) -> Self {
        let duration_ms = match (log.events().first(), log.last()) {
            (Some(first), Some(last)) => last.timestamp() - first.timestamp(),
            _ => 0.0,
        };
        let mut clicks_by_rate = BTreeMap::new();
        for e in log.filter_by_kind(EventKind::UserClick) {
            *clicks_by_rate.entry(e.rate_hz()).or_insert(0) += 1;
        }
        let rates = || log.filter_by_kind(EventKind::RateChange).map(Event::rate_hz);
        Self {
            duration_ms,
            rate_changes: log.count(EventKind::RateChange),
            clicks: log.count(EventKind::UserClick),
            clicks_by_rate,
            peak_rate_hz: rates().max(),
            final_rate_hz: rates().last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DisplaySnapshot;
    use crate::sim::Ball;

    fn rate(ts: f64, previous: u32, current: u32) -> Event {
        Event::RateChange {
            ts,
            display: DisplaySnapshot {
                hz: current,
                ball: Ball::default().snapshot(),
            },
            previous,
            current,
        }
    }

    fn click(ts: f64, hz: u32) -> Event {
        Event::UserClick {
            ts,
            display: DisplaySnapshot {
                hz,
                ball: Ball::default().snapshot(),
            },
        }
    }

    fn sample() -> EventLog {
        EventLog::from(vec![
            rate(1000.0, 30, 30),
            rate(8000.0, 30, 45),
            click(8500.0, 45),
            rate(15000.0, 45, 60),
            click(15600.0, 60),
            click(16000.0, 60),
        ])
    }

    #[test]
    fn test_rate_steps_close_at_last_event() {
        let steps = rate_steps(&sample());
        assert_eq!(
            steps,
            vec![(1000.0, 30), (8000.0, 45), (15000.0, 60), (16000.0, 60)]
        );
        assert!(rate_steps(&EventLog::new()).is_empty());
    }

    #[test]
    fn test_click_marks() {
        assert_eq!(click_marks(&sample()), vec![8500.0, 15600.0, 16000.0]);
    }

    #[test]
    fn test_timeline_ranges() {
        let log = sample();
        let display = timeline(&log, EventKind::RateChange);
        assert_eq!(display.len(), 3);
        assert_eq!(display[0].label, "30 Hz");
        assert_eq!((display[0].start_ms, display[0].end_ms), (1000.0, 8000.0));
        assert_eq!((display[2].start_ms, display[2].end_ms), (15000.0, 17000.0));

        let user = timeline(&log, EventKind::UserClick);
        assert_eq!(user[0].label, "45 Hz");
        assert_eq!(user[0].end_ms, 15600.0);
        assert_eq!(user[2].end_ms, 17000.0);

        assert!(timeline(&EventLog::new(), EventKind::UserClick).is_empty());
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary::from_log(&sample());
        assert_eq!(summary.duration_ms, 15000.0);
        assert_eq!(summary.rate_changes, 3);
        assert_eq!(summary.clicks, 3);
        assert_eq!(summary.clicks_by_rate.get(&45), Some(&1));
        assert_eq!(summary.clicks_by_rate.get(&60), Some(&2));
        assert_eq!(summary.peak_rate_hz, Some(60));
        assert_eq!(summary.final_rate_hz, Some(60));
    }

    #[test]
    fn test_export_shape() {
        let payload = ExportPayload::new(&TestConfig::default(), &sample());
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["settings"]["StartingHZ"], 30);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(6));
        assert_eq!(json["data"][1]["type"], "display");
        assert_eq!(json["data"][1]["previous"], 30);
        assert_eq!(json["data"][1]["current"], 45);
        assert_eq!(json["data"][2]["type"], "user");
        assert_eq!(json["data"][2]["ts"], 8500.0);
    }

    #[test]
    fn test_parse_legacy_export() {
        let json = r#"{"settings":{"TestLength":60,"StartingHZ":30,"MaxHZ":90,"UpdateHZBy":15,
            "AllowHZToDecrease":true,"ChanceToDecreaseHZ":0.2,"MinimumTimeBetweenChanges":4,
            "MaximumTimeBetweenChanges":8},"data":[
            {"type":"display","ts":1643831070964,"display":{"hz":30,"ball":{"position":{"x":1744,"y":192},"speed":{"x":2,"y":-2}}},"previous":10,"current":30},
            {"type":"user","ts":1643831079444,"display":{"hz":45,"ball":{"position":{"x":1744,"y":192},"speed":{"x":2,"y":-2}}}},
            {"type":"display","ts":1643831078965,"display":{"hz":45,"ball":{"position":{"x":1744,"y":192},"speed":{"x":2,"y":-2}}},"previous":30,"current":45}]}"#;
        let payload = ExportPayload::from_json(json).expect("legacy export parses");
        assert_eq!(payload.settings.max_hz, 90);
        assert_eq!(payload.data.len(), 3);
        // Re-sorted by timestamp
        assert_eq!(payload.data.events()[1].kind(), EventKind::RateChange);
        assert_eq!(click_marks(&payload.data), vec![1643831079444.0]);
    }

    #[test]
    fn test_payload_deserialize_sorts_data() {
        let json = serde_json::json!({
            "settings": TestConfig::default().display_settings(),
            "data": [rate(5000.0, 30, 45), click(1000.0, 30)],
        });
        let payload: ExportPayload = serde_json::from_value(json).unwrap();
        let ts: Vec<f64> = payload.data.iter().map(Event::timestamp).collect();
        assert_eq!(ts, vec![1000.0, 5000.0]);
    }
}
