//! Transition history tracking.
//!
//! Every transition a machine performs is logged as a timestamped
//! [`TransitionRecord`]. The log is bounded: once it holds `capacity`
//! records, the oldest one is dropped for each new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single transition.
///
/// `from` is `None` for the activation of the initial state, and for any
/// transition that happened while no state was current.
///
/// # Example
///
/// ```rust
/// use tinyfsm::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: Some("idle".to_string()),
///     to: "walking".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.from.as_deref(), Some("idle"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Key of the state that was current before the transition
    pub from: Option<String>,
    /// Key of the state that became current
    pub to: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered log of transitions, oldest first.
///
/// A capacity of zero disables recording entirely.
///
/// # Example
///
/// ```rust
/// use tinyfsm::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::with_capacity(2);
/// for (from, to) in [(None, "a"), (Some("a"), "b"), (Some("b"), "c")] {
///     history.record(TransitionRecord {
///         from: from.map(str::to_string),
///         to: to.to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec!["a", "b", "c"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RawHistory")]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    capacity: usize,
}

/// Unchecked wire form of [`TransitionHistory`].
#[derive(Deserialize)]
struct RawHistory {
    records: VecDeque<TransitionRecord>,
    capacity: usize,
}

impl From<RawHistory> for TransitionHistory {
    fn from(raw: RawHistory) -> Self {
        let RawHistory {
            mut records,
            capacity,
        } = raw;
        // Keep only the newest `capacity` records.
        let excess = records.len().saturating_sub(capacity);
        records.drain(..excess);
        Self { records, capacity }
    }
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::with_capacity(crate::config::DEFAULT_HISTORY_CAPACITY)
    }
}

impl TransitionHistory {
    /// Create an empty history keeping at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Maximum number of records kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Get the path of state keys traversed.
    ///
    /// Starts with the `from` key of the oldest record (if any), followed
    /// by the `to` key of each record in order.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(from) = self.records.front().and_then(|r| r.from.as_deref()) {
            path.push(from);
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Time elapsed between the oldest and the newest record.
    ///
    /// Returns `None` if the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    /// Iterate over records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> + '_ {
        self.records.iter()
    }

    /// Number of records currently kept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether no record is kept.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record, keeping the capacity.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
