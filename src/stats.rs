// ============================================================================
// Diagnostics Counters
// ============================================================================

use serde::{Deserialize, Serialize};

/// Counters kept by a scope controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStats {
    /// Non-empty commands applied through `execute`.
    pub executed: u64,
    /// Empty commands skipped by `execute`.
    pub skipped_empty: u64,
    pub commits: u64,
    pub rollbacks: u64,
    pub batches_emitted: u64,
    /// Top-level entries currently held by the replay log.
    pub replay_log_len: usize,
    pub open_scopes: usize,
}

/// Counters kept by one viewer synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizerStats {
    pub batches: u64,
    pub delivered: u64,
    pub deferred: u64,
    pub released: u64,
}

/// Counters kept by a replication hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    pub replicas: usize,
    pub batches_dispatched: u64,
    pub messages_sent: u64,
    pub reveals: u64,
    pub replicas_pruned: u64,
}

macro_rules! impl_to_json {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Renders the counters as pretty JSON for diagnostics dumps.
                pub fn to_json(&self) -> String {
                    serde_json::to_string_pretty(self).unwrap_or_default()
                }
            }
        )*
    };
}

impl_to_json!(ControllerStats, SynchronizerStats, HubStats);
