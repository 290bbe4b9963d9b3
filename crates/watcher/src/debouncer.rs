//! Quiet-period batching of raw events
//!
//! A cycle collects raw events until no new event has arrived for the quiet
//! period. Every event pushes the deadline back, so a steady burst with no
//! gap as long as the quiet period is gathered into a single cycle.

use crate::events::{RawEvent, RawEventKind};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Raw reports gathered during one cycle, keyed by path
///
/// A path may sit in several sets at once; resolution sorts that out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub added: HashSet<PathBuf>,
    pub removed: HashSet<PathBuf>,
    pub changed: HashSet<PathBuf>,
    pub renamed: HashSet<PathBuf>,
}

impl PendingChanges {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one raw event into its set
    pub fn record(&mut self, event: RawEvent) {
        let RawEvent { path, kind } = event;
        match kind {
            RawEventKind::Create => self.added.insert(path),
            RawEventKind::Remove => self.removed.insert(path),
            RawEventKind::Write => self.changed.insert(path),
            RawEventKind::Rename => self.renamed.insert(path),
        };
    }

    /// True when no event was recorded
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.renamed.is_empty()
    }
}

impl FromIterator<RawEvent> for PendingChanges {
    fn from_iter<I: IntoIterator<Item = RawEvent>>(iter: I) -> Self {
        let mut pending = Self::new();
        for event in iter {
            pending.record(event);
        }
        pending
    }
}

/// Why a cycle stopped collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    /// The quiet period elapsed with no new event
    Quiet,
    /// Every event producer went away
    SourceClosed,
    /// The session was cancelled; pending changes should be discarded
    Cancelled,
}

/// Outcome of one collection cycle
#[derive(Debug)]
pub struct Cycle {
    /// What was gathered
    pub pending: PendingChanges,
    /// Number of raw events received, duplicates included
    pub event_count: usize,
    /// How the cycle ended
    pub end: CycleEnd,
}

/// Collects raw events into cycles separated by a quiet period
pub struct EventDebouncer {
    /// Quiet period closing a cycle
    quiet_period: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer
    pub fn new(quiet_period: Duration) -> Self {
        Self { quiet_period }
    }

    /// The configured quiet period
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Run a single cycle
    ///
    /// Waits on cancellation, the next event and the quiet timer at once.
    /// The timer is created once per cycle and re-armed on every event.
    /// Cancellation wins over pending events, and events win over a timer
    /// that fires in the same poll.
    pub async fn next_cycle(
        &self,
        events: &mut mpsc::Receiver<RawEvent>,
        cancel: &CancellationToken,
    ) -> Cycle {
        let mut pending = PendingChanges::new();
        let mut event_count = 0;
        let quiet = sleep(self.quiet_period);
        tokio::pin!(quiet);

        let end = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break CycleEnd::Cancelled,
                received = events.recv() => match received {
                    Some(event) => {
                        trace!("Raw event {}", event);
                        pending.record(event);
                        event_count += 1;
                        quiet.as_mut().reset(Instant::now() + self.quiet_period);
                    }
                    None => break CycleEnd::SourceClosed,
                },
                _ = &mut quiet => break CycleEnd::Quiet,
            }
        };

        Cycle {
            pending,
            event_count,
            end,
        }
    }
}
