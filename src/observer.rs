//! Structured event log - history records and pub/sub observers
//!
//! Every mutating operation on an environment appends a [`HistoryRecord`] to
//! its append-only history and hands the same record to each subscribed
//! [`SimObserver`]. Observers are injected per environment; there is no
//! process-wide sink.

use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind tag of a history record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    Spawn,
    PushoutCandidates,
    CcpStable,
    WorldtubePropagation,
    WorldtubeBreak,
    Cleanup,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Spawn => "spawn",
            EventKind::PushoutCandidates => "pushout_candidates",
            EventKind::CcpStable => "ccp_stable",
            EventKind::WorldtubePropagation => "worldtube_propagation",
            EventKind::WorldtubeBreak => "worldtube_break",
            EventKind::Cleanup => "cleanup",
        }
    }
}

/// Event-specific payload of a history record
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SimEvent {
    /// New instantons entered the fluctuation pool
    Spawn { count: usize, ids: Vec<Uuid> },
    /// The matcher produced candidate triples
    PushoutCandidates { count: usize },
    /// Stability check outcome (one per call)
    CcpStable {
        count: usize,
        group_ids: Vec<Uuid>,
        /// Candidates skipped because they shared a member with an earlier one
        rejected_overlaps: usize,
    },
    /// Worldtubes advanced one step
    WorldtubePropagation { count: usize, group_ids: Vec<Uuid> },
    /// A successor failed the stability re-check and its lineage ended
    WorldtubeBreak { group_id: Uuid },
    /// Instantons evicted from the pool
    Cleanup { removed: usize },
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::Spawn { .. } => EventKind::Spawn,
            SimEvent::PushoutCandidates { .. } => EventKind::PushoutCandidates,
            SimEvent::CcpStable { .. } => EventKind::CcpStable,
            SimEvent::WorldtubePropagation { .. } => EventKind::WorldtubePropagation,
            SimEvent::WorldtubeBreak { .. } => EventKind::WorldtubeBreak,
            SimEvent::Cleanup { .. } => EventKind::Cleanup,
        }
    }
}

/// A time-stamped history entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryRecord {
    /// Simulation time when the record was written
    pub time: f64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub event: SimEvent,
}

impl HistoryRecord {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

/// Observer that receives history records
pub trait SimObserver: Send + Sync {
    /// Called once per appended record
    fn on_event(&self, record: &HistoryRecord);
}

/// Function-based observer for simple cases
pub struct FnObserver<F: Fn(&HistoryRecord) + Send + Sync>(pub F);

impl<F: Fn(&HistoryRecord) + Send + Sync> SimObserver for FnObserver<F> {
    fn on_event(&self, record: &HistoryRecord) {
        (self.0)(record);
    }
}

/// Channel-based observer - sends records to a channel
pub struct ChannelObserver {
    sender: std::sync::mpsc::Sender<HistoryRecord>,
}

impl ChannelObserver {
    pub fn new(sender: std::sync::mpsc::Sender<HistoryRecord>) -> Self {
        Self { sender }
    }
}

impl SimObserver for ChannelObserver {
    fn on_event(&self, record: &HistoryRecord) {
        let _ = self.sender.send(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = [
            SimEvent::Spawn {
                count: 0,
                ids: vec![],
            },
            SimEvent::PushoutCandidates { count: 1 },
            SimEvent::CcpStable {
                count: 0,
                group_ids: vec![],
                rejected_overlaps: 0,
            },
            SimEvent::WorldtubePropagation {
                count: 0,
                group_ids: vec![],
            },
            SimEvent::WorldtubeBreak {
                group_id: Uuid::nil(),
            },
            SimEvent::Cleanup { removed: 2 },
        ]
        .iter()
        .map(|e| e.kind().as_str())
        .collect();
        assert_eq!(
            names,
            [
                "spawn",
                "pushout_candidates",
                "ccp_stable",
                "worldtube_propagation",
                "worldtube_break",
                "cleanup"
            ]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialized_record_is_flat_and_snake_case() {
        let record = HistoryRecord {
            time: 2.0,
            event: SimEvent::CcpStable {
                count: 1,
                group_ids: vec![Uuid::nil()],
                rejected_overlaps: 0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["time"], 2.0);
        assert_eq!(json["kind"], "ccp_stable");
        assert_eq!(json["count"], 1);
        assert_eq!(json["rejected_overlaps"], 0);
        assert!(json.get("event").is_none());

        let back: HistoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_fn_observer() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let observer = FnObserver(move |_: &HistoryRecord| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let record = HistoryRecord {
            time: 1.0,
            event: SimEvent::Cleanup { removed: 3 },
        };
        observer.on_event(&record);
        observer.on_event(&record);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = std::sync::mpsc::channel();
        let observer = ChannelObserver::new(tx);
        let record = HistoryRecord {
            time: 0.5,
            event: SimEvent::PushoutCandidates { count: 4 },
        };
        observer.on_event(&record);
        assert_eq!(rx.try_recv().unwrap(), record);
    }
}
