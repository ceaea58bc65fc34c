use super::ScopeController;
use crate::core::Result;
use std::ops::{Deref, DerefMut};
use tracing::error;

/// An open command group.
///
/// Derefs to the controller so commands (and nested scopes) can be issued
/// through it. The group commits on [`finish`](Self::finish) or, failing
/// that, when dropped; closing is idempotent, so dropping after `finish` does
/// nothing. Groups cannot be rolled back.
///
/// Dropping a guard while a scope opened inside it is still open is a
/// contract violation and panics.
pub struct CommandGroup<'a, S: 'static> {
    controller: &'a mut ScopeController<S>,
    id: u64,
    ended: bool,
}

impl<'a, S: 'static> CommandGroup<'a, S> {
    pub(crate) fn new(controller: &'a mut ScopeController<S>, id: u64) -> Self {
        Self {
            controller,
            id,
            ended: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Commits the group now.
    ///
    /// # Errors
    /// Returns error if a scope opened inside the group is still open
    pub fn finish(mut self) -> Result<()> {
        self.ended = true;
        self.controller.end_group(self.id)
    }
}

impl<S: 'static> Deref for CommandGroup<'_, S> {
    type Target = ScopeController<S>;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<S: 'static> DerefMut for CommandGroup<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl<S: 'static> Drop for CommandGroup<'_, S> {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        if let Err(err) = self.controller.end_group(self.id) {
            error!(group = self.id, %err, "command group could not be closed");
            if !std::thread::panicking() {
                panic!("command group {} could not be closed: {err}", self.id);
            }
        }
    }
}
