use super::CompositeCommand;
use crate::sync::SynchronizableCommand;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable command.
pub type SharedCommand<S> = Arc<dyn Command<S>>;

/// Structural tag a command reports about itself.
///
/// Lets the synchronizer walk composites and inverses without inspecting
/// concrete types. Plain domain commands are leaves.
pub enum CommandShape<'a, S> {
    Leaf,
    Composite(&'a CompositeCommand<S>),
    Inverse(&'a SharedCommand<S>),
}

/// A reversible mutation of the shared state.
///
/// # Contract
///
/// - `execute` and `unexecute` are each called exactly once per direction,
///   never twice in a row in the same direction.
/// - `unexecute` right after `execute` leaves `state` observably identical to
///   what it was before `execute`.
/// - A command whose precondition does not hold is a programming error and
///   should panic. There is no recoverable failure path.
pub trait Command<S>: Send + Sync + fmt::Debug {
    fn execute(&self, state: &mut S);

    fn unexecute(&self, state: &mut S);

    /// True if applying this command would not change anything.
    fn is_empty(&self) -> bool {
        false
    }

    /// Short label used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn shape(&self) -> CommandShape<'_, S> {
        CommandShape::Leaf
    }

    /// Returns the synchronizable capability if this command implements it.
    ///
    /// Commands that return `None` are treated as structural and are
    /// delivered to every viewer unfiltered.
    fn as_synchronizable(&self) -> Option<&dyn SynchronizableCommand<S>> {
        None
    }
}
