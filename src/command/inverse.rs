use super::{Command, CommandShape, SharedCommand};
use std::fmt;

/// Runs a command backwards.
///
/// Used to broadcast that an effect which was already applied (and possibly
/// already delivered) has been undone, without re-deriving the original.
pub struct InverseAdapter<S> {
    inner: SharedCommand<S>,
}

impl<S> InverseAdapter<S> {
    pub fn new(inner: SharedCommand<S>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &SharedCommand<S> {
        &self.inner
    }
}

impl<S> fmt::Debug for InverseAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inverse").field(&self.inner).finish()
    }
}

impl<S> Command<S> for InverseAdapter<S> {
    fn execute(&self, state: &mut S) {
        self.inner.unexecute(state);
    }

    fn unexecute(&self, state: &mut S) {
        self.inner.execute(state);
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn name(&self) -> &str {
        "inverse"
    }

    fn shape(&self) -> CommandShape<'_, S> {
        CommandShape::Inverse(&self.inner)
    }
}
