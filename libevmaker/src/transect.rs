use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use super::error::{EventLogError, SurveyError};

/// Timestamp format used by the transect event log (MM/dd/yyyy hh:mm:ss.zzz).
const EVENT_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[month]/[day]/[year] [hour]:[minute]:[second].[subsecond digits:3]");

/// The event types recorded in a transect event log.
///
/// ST marks the start of a transect, ET its end. A BT/RT pair brackets a
/// temporary break in data collection; a transect may contain any number of
/// such pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "ST")]
    St,
    #[serde(rename = "ET")]
    Et,
    #[serde(rename = "BT")]
    Bt,
    #[serde(rename = "RT")]
    Rt,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::St => write!(f, "ST"),
            EventKind::Et => write!(f, "ET"),
            EventKind::Bt => write!(f, "BT"),
            EventKind::Rt => write!(f, "RT"),
        }
    }
}

/// One row of a transect event log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransectEvent {
    pub kind: EventKind,
    pub time: PrimitiveDateTime,
}

impl TransectEvent {
    pub fn new(kind: EventKind, time: PrimitiveDateTime) -> Self {
        Self { kind, time }
    }
}

/// A contiguous interval of active data collection within a transect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

/// Parse a timestamp in the event log format.
pub fn parse_event_time(value: &str) -> Result<PrimitiveDateTime, SurveyError> {
    PrimitiveDateTime::parse(value, EVENT_TIME_FORMAT)
        .map_err(|_| SurveyError::BadEventTime(value.to_string()))
}

enum SpanState {
    Idle,
    Active(PrimitiveDateTime),
    Paused(PrimitiveDateTime),
    Done,
}

/// Decompose an ordered transect event log into its active time spans.
///
/// A transect with no breaks yields a single span from ST to ET. Each BT/RT
/// pair closes the current span and opens the next, so a log with N breaks
/// yields N+1 spans; the final span always ends at ET. The log must hold
/// exactly one ST and one ET and every BT must be resumed before the next BT
/// or the ET, otherwise the spans are undefined and the log is rejected.
pub fn build_spans(events: &[TransectEvent]) -> Result<Vec<TimeSpan>, EventLogError> {
    if events.is_empty() {
        return Err(EventLogError::EmptyLog);
    }

    let mut spans: Vec<TimeSpan> = Vec::new();
    let mut state = SpanState::Idle;

    for event in events {
        state = match (state, event.kind) {
            (SpanState::Idle, EventKind::St) => SpanState::Active(event.time),
            (SpanState::Idle, _) => return Err(EventLogError::MissingStart),
            (SpanState::Active(start), EventKind::Bt) => {
                spans.push(TimeSpan {
                    start,
                    end: event.time,
                });
                SpanState::Paused(event.time)
            }
            (SpanState::Active(start), EventKind::Et) => {
                spans.push(TimeSpan {
                    start,
                    end: event.time,
                });
                SpanState::Done
            }
            (SpanState::Active(_), EventKind::St) => {
                return Err(EventLogError::DuplicateStart(event.time))
            }
            (SpanState::Active(_), EventKind::Rt) => {
                return Err(EventLogError::UnpairedResume(event.time))
            }
            (SpanState::Paused(_), EventKind::Rt) => SpanState::Active(event.time),
            (SpanState::Paused(_), EventKind::St) => {
                return Err(EventLogError::DuplicateStart(event.time))
            }
            (SpanState::Paused(bt), _) => return Err(EventLogError::UnpairedBreak(bt)),
            (SpanState::Done, kind) => return Err(EventLogError::EventAfterEnd(kind)),
        };
    }

    match state {
        SpanState::Done => Ok(spans),
        SpanState::Paused(bt) => Err(EventLogError::UnpairedBreak(bt)),
        _ => Err(EventLogError::MissingEnd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn ev(kind: EventKind, time: PrimitiveDateTime) -> TransectEvent {
        TransectEvent::new(kind, time)
    }

    #[test]
    fn test_parse_event_time() {
        let parsed = parse_event_time("02/19/2021 14:03:22.123").unwrap();
        assert_eq!(parsed, datetime!(2021-02-19 14:03:22.123));
        assert!(parse_event_time("2021-02-19 14:03:22").is_err());
    }

    #[test]
    fn test_unbroken_transect() {
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
        ];
        let spans = build_spans(&events).unwrap();
        assert_eq!(
            spans,
            vec![TimeSpan {
                start: datetime!(2024-06-21 09:00:00),
                end: datetime!(2024-06-21 10:00:00),
            }]
        );
    }

    #[test]
    fn test_single_break() {
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::Bt, datetime!(2024-06-21 09:20:00)),
            ev(EventKind::Rt, datetime!(2024-06-21 09:25:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
        ];
        let spans = build_spans(&events).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, datetime!(2024-06-21 09:00:00));
        assert_eq!(spans[0].end, datetime!(2024-06-21 09:20:00));
        assert_eq!(spans[1].start, datetime!(2024-06-21 09:25:00));
        assert_eq!(spans[1].end, datetime!(2024-06-21 10:00:00));
    }

    #[test]
    fn test_many_breaks() {
        // N break/resume pairs must give N+1 ordered, non-overlapping spans
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::Bt, datetime!(2024-06-21 09:10:00)),
            ev(EventKind::Rt, datetime!(2024-06-21 09:15:00)),
            ev(EventKind::Bt, datetime!(2024-06-21 09:30:00)),
            ev(EventKind::Rt, datetime!(2024-06-21 09:40:00)),
            ev(EventKind::Bt, datetime!(2024-06-21 09:45:00)),
            ev(EventKind::Rt, datetime!(2024-06-21 09:50:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
        ];
        let spans = build_spans(&events).unwrap();
        assert_eq!(spans.len(), 4);
        for span in &spans {
            assert!(span.start <= span.end);
        }
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(spans[3].end, datetime!(2024-06-21 10:00:00));
    }

    #[test]
    fn test_missing_end_fails() {
        let events = [ev(EventKind::St, datetime!(2024-06-21 09:00:00))];
        assert_eq!(build_spans(&events), Err(EventLogError::MissingEnd));
    }

    #[test]
    fn test_missing_start_fails() {
        let events = [ev(EventKind::Et, datetime!(2024-06-21 10:00:00))];
        assert_eq!(build_spans(&events), Err(EventLogError::MissingStart));
    }

    #[test]
    fn test_unpaired_break_fails() {
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::Bt, datetime!(2024-06-21 09:20:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
        ];
        assert_eq!(
            build_spans(&events),
            Err(EventLogError::UnpairedBreak(datetime!(2024-06-21 09:20:00)))
        );
    }

    #[test]
    fn test_duplicate_start_fails() {
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::St, datetime!(2024-06-21 09:05:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
        ];
        assert_eq!(
            build_spans(&events),
            Err(EventLogError::DuplicateStart(datetime!(2024-06-21 09:05:00)))
        );
    }

    #[test]
    fn test_event_after_end_fails() {
        let events = [
            ev(EventKind::St, datetime!(2024-06-21 09:00:00)),
            ev(EventKind::Et, datetime!(2024-06-21 10:00:00)),
            ev(EventKind::Rt, datetime!(2024-06-21 10:05:00)),
        ];
        assert_eq!(
            build_spans(&events),
            Err(EventLogError::EventAfterEnd(EventKind::Rt))
        );
    }

    #[test]
    fn test_empty_log_fails() {
        assert_eq!(build_spans(&[]), Err(EventLogError::EmptyLog));
    }
}
