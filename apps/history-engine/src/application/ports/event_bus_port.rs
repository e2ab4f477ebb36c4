//! Event Bus Port (Driven Port)
//!
//! Publish side of the notification channel carrying history results.

use crate::domain::market_history::HistoryEvent;

/// Event publishing error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// Nobody is listening on the topic; the event was dropped.
    #[error("no subscribers on topic {topic}")]
    NoSubscribers {
        /// Topic published to.
        topic: &'static str,
    },
}

/// Port for publishing history result events.
///
/// Publishing is synchronous and must not wait on subscribers, so it can
/// be called from the dispatch path as well as from workers.
pub trait EventBusPort: Send + Sync {
    /// Publish an event on its topic.
    ///
    /// Returns the number of subscribers that will receive it.
    fn publish(&self, event: HistoryEvent) -> Result<usize, EventBusError>;
}

/// Event bus that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventBus;

impl EventBusPort for NoOpEventBus {
    fn publish(&self, _event: HistoryEvent) -> Result<usize, EventBusError> {
        Ok(0)
    }
}
