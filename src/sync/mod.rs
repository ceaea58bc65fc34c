// ============================================================================
// Per-Viewer Synchronization
// ============================================================================
//
// Rewrites emitted batches into the exact command stream one viewer's replica
// should apply, and withholds what that viewer may not see yet.
//
// - `SynchronizableCommand`: optional capability producing a viewer projection
// - `SynchronizationContext`: one pass, one viewer, one batch
// - `Backlog`: withheld projections keyed by object, released on reveal
// - `ViewerCommandSynchronizer`: owns one viewer's backlog and drives passes
//
// Synchronizers never share state: merging two viewers' backlogs would leak
// one viewer's hidden information to the other.
//
// ============================================================================

pub mod backlog;
pub mod capability;
pub mod context;
pub mod synchronizer;
pub mod visibility;

pub use backlog::Backlog;
pub use capability::SynchronizableCommand;
pub use context::SynchronizationContext;
pub use synchronizer::ViewerCommandSynchronizer;
pub use visibility::{EverythingVisible, Visibility, VisibilityPredicate};
