// ============================================================================
// Scope Management
// ============================================================================
//
// Groups mutations into atomic, externally observable batches.
//
// - Transaction: may commit or roll back; rollback undoes its commands and,
//   if they were already broadcast, broadcasts the inverse
// - Group: always commits; everything inside is broadcast once, on close
//
// Design Patterns Used:
// - State Pattern: scope lifecycle (Open -> Committed/RolledBack)
// - Command Pattern: reversible operations for rollback
// - RAII guard: command groups close when the guard goes out of scope
//
// ============================================================================

pub mod batch;
pub mod controller;
pub mod group;
pub mod state;

pub use batch::{Batch, BatchKind, BatchRecorder, BatchSink, CallbackSink};
pub use controller::{RollbackMonitor, ScopeController, TransactionToken};
pub use group::CommandGroup;
pub use state::{Scope, ScopeKind, ScopeState};
