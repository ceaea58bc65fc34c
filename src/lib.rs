// ============================================================================
// scopecast Library
// ============================================================================
//
// Transactional command log with per-viewer, visibility-filtered
// replication:
//
// - `scope`: transactions and groups decide when mutations become a batch
// - `sync`: each viewer's synchronizer rewrites and withholds per batch
// - `replication`: fans batches out to connected replicas
//
// ============================================================================

pub mod command;
pub mod config;
pub mod core;
pub mod replication;
pub mod scope;
pub mod stats;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use command::{Command, CommandShape, CompositeCommand, InverseAdapter, SharedCommand};
pub use config::{ControllerConfig, ReplayLogPolicy};
pub use core::{BatchSequence, ObjectId, ReplicaId, Result, ScopeError, ViewerId};
pub use replication::{ReplicaMessage, ReplicationHub};
pub use scope::{
    Batch, BatchKind, BatchRecorder, BatchSink, CallbackSink, CommandGroup, RollbackMonitor,
    ScopeController, TransactionToken,
};
pub use stats::{ControllerStats, HubStats, SynchronizerStats};
pub use sync::{
    Backlog, EverythingVisible, SynchronizableCommand, SynchronizationContext,
    ViewerCommandSynchronizer, Visibility, VisibilityPredicate,
};
