//! Result events published for every history query.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::HistoryError;
use super::value_objects::{BarData, Exchange, HistoryRequest, Interval};

/// Topic on which history results are published.
pub const HISTORY_RESULT_TOPIC: &str = "history-result";

/// Identifier correlating a dispatched query with its result event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a request id from a string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a new unique request id using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one query: the bar series or the reason there is none.
pub type HistoryOutcome = Result<Vec<BarData>, HistoryError>;

/// Event carrying the result of exactly one `query_history` call.
#[derive(Debug, Clone)]
pub struct HistoryEvent {
    /// Id returned to the caller at dispatch time.
    pub request_id: RequestId,
    /// Instrument id as supplied by the caller.
    pub instrument_id: String,
    /// Requested interval.
    pub interval: Interval,
    /// Requested first date.
    pub start: NaiveDate,
    /// Requested last date.
    pub end: NaiveDate,
    /// Canonical request, absent when the contract could not be resolved.
    pub request: Option<HistoryRequest>,
    /// Bars or failure reason.
    pub outcome: HistoryOutcome,
    /// When the result was produced.
    pub completed_at: DateTime<Utc>,
}

impl HistoryEvent {
    /// Topic this event is published on.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        HISTORY_RESULT_TOPIC
    }

    /// Whether the query produced a (possibly empty) bar series.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Bars of a successful query; empty on failure.
    #[must_use]
    pub fn bars(&self) -> &[BarData] {
        self.outcome.as_deref().unwrap_or_default()
    }

    /// Failure reason, if any.
    #[must_use]
    pub fn error(&self) -> Option<&HistoryError> {
        self.outcome.as_ref().err()
    }

    /// Canonical symbol of the resolved request.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.request.as_ref().map(|req| req.symbol.as_str())
    }

    /// Canonical exchange of the resolved request.
    #[must_use]
    pub fn exchange(&self) -> Option<Exchange> {
        self.request.as_ref().map(|req| req.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn failed_event() -> HistoryEvent {
        HistoryEvent {
            request_id: RequestId::new("req-1"),
            instrument_id: "999999.SSE".to_string(),
            interval: Interval::Daily,
            start: date(2020, 1, 1),
            end: date(2020, 1, 10),
            request: None,
            outcome: Err(HistoryError::UnknownInstrument {
                instrument_id: "999999.SSE".to_string(),
            }),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn failed_event_has_no_bars() {
        let event = failed_event();
        assert!(!event.is_success());
        assert!(event.bars().is_empty());
        assert!(event.symbol().is_none());
        assert_eq!(event.error().unwrap().reason_code(), "unknown_instrument");
        assert_eq!(event.topic(), "history-result");
    }

    #[test]
    fn successful_event_exposes_request_fields() {
        let mut event = failed_event();
        event.request = Some(HistoryRequest::new(
            "600000",
            Exchange::Sse,
            Interval::Daily,
            event.start,
            event.end,
        ));
        event.outcome = Ok(Vec::new());
        assert!(event.is_success());
        assert_eq!(event.symbol(), Some("600000"));
        assert_eq!(event.exchange(), Some(Exchange::Sse));
    }

    #[test]
    fn generated_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
