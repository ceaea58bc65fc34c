use super::SynchronizationContext;
use crate::command::{Command, SharedCommand};
use crate::core::ObjectId;

/// Capability of a command that may carry information some viewers must not
/// see.
///
/// A command opts in by returning `Some(self)` from
/// [`Command::as_synchronizable`]. Commands that don't are delivered to every
/// viewer as-is.
pub trait SynchronizableCommand<S>: Command<S> {
    /// True if nothing in this command ever needs hiding.
    fn is_public(&self) -> bool;

    /// The object this command's privacy is scoped to, if any.
    fn object(&self, state: &S) -> Option<ObjectId>;

    /// Builds the projection of this command for `context.viewer()`.
    ///
    /// The projection may rewrite or mask fields, or be `None` to send
    /// nothing. Commands registered on `context` during this call are
    /// synchronized and filtered immediately and land in the output before
    /// the projection returned here.
    fn synchronize(&self, context: &mut SynchronizationContext<'_, S>) -> Option<SharedCommand<S>>;
}
