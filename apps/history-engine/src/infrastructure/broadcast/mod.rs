//! Broadcast Channel Adapter
//!
//! Implements the event bus port on top of a tokio broadcast channel so
//! any number of subscribers can observe history results.
//!
//! Publishing never waits: slow subscribers lag and lose the oldest
//! events instead of holding back workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use crate::application::ports::{EventBusError, EventBusPort};
use crate::domain::market_history::{HISTORY_RESULT_TOPIC, HistoryEvent};

// =============================================================================
// Broadcast Hub
// =============================================================================

/// Configuration for the result channel.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber before it starts lagging.
    pub history_results_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            history_results_capacity: 1_024,
        }
    }
}

/// Hub distributing `HistoryEvent`s on the `history-result` topic.
///
/// # Example
///
/// ```rust
/// use history_engine::infrastructure::broadcast::{BroadcastConfig, HistoryBroadcastHub};
///
/// let hub = HistoryBroadcastHub::new(BroadcastConfig::default());
/// let mut rx = hub.subscribe();
/// assert_eq!(hub.receiver_count(), 1);
/// # drop(rx.try_recv());
/// ```
#[derive(Debug)]
pub struct HistoryBroadcastHub {
    history_results_tx: broadcast::Sender<HistoryEvent>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl HistoryBroadcastHub {
    /// Create a new hub with the given configuration.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            history_results_tx: broadcast::channel(config.history_results_capacity.max(1)).0,
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Create a new hub with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(BroadcastConfig::default())
    }

    /// Get a new receiver for history results.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.history_results_tx.subscribe()
    }

    /// Get the number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.history_results_tx.receiver_count()
    }

    /// Get publication statistics.
    #[must_use]
    pub fn stats(&self) -> BroadcastStats {
        BroadcastStats {
            receivers: self.receiver_count(),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl EventBusPort for HistoryBroadcastHub {
    fn publish(&self, event: HistoryEvent) -> Result<usize, EventBusError> {
        if let Ok(receivers) = self.history_results_tx.send(event) {
            self.published.fetch_add(1, Ordering::Relaxed);
            Ok(receivers)
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            Err(EventBusError::NoSubscribers {
                topic: HISTORY_RESULT_TOPIC,
            })
        }
    }
}

/// Shared broadcast hub reference.
pub type SharedBroadcastHub = Arc<HistoryBroadcastHub>;

/// Statistics about the result channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Active receivers.
    pub receivers: usize,
    /// Events delivered to at least one receiver.
    pub published: u64,
    /// Events dropped for lack of receivers.
    pub dropped: u64,
}

// =============================================================================
// Tests
// =============================================================================
