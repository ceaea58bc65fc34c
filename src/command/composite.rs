use super::{Command, CommandShape, SharedCommand};
use im::Vector;
use std::fmt;

/// An ordered sequence of commands applied as one.
///
/// `execute` runs the children front to back, `unexecute` undoes them back to
/// front. The child list lives in a persistent vector, so cloning a composite
/// (for example to snapshot the replay log) shares structure instead of
/// copying every handle.
pub struct CompositeCommand<S> {
    commands: Vector<SharedCommand<S>>,
}

impl<S> CompositeCommand<S> {
    pub fn new() -> Self {
        Self {
            commands: Vector::new(),
        }
    }

    /// Appends a command after all existing children.
    pub fn push(&mut self, command: SharedCommand<S>) {
        self.commands.push_back(command);
    }

    /// Appends every child of `other`, preserving their order.
    pub fn extend(&mut self, other: CompositeCommand<S>) {
        self.commands.append(other.commands);
    }

    /// Number of direct children, empty or not.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn has_children(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SharedCommand<S>> + '_ {
        self.commands.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SharedCommand<S>> {
        self.commands.get(index)
    }

    /// Names of the direct children, in order.
    pub fn names(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.name().to_string())
            .collect()
    }
}

impl<S> Default for CompositeCommand<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for CompositeCommand<S> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<S> fmt::Debug for CompositeCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.commands.iter()).finish()
    }
}

impl<S> FromIterator<SharedCommand<S>> for CompositeCommand<S> {
    fn from_iter<I: IntoIterator<Item = SharedCommand<S>>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl<S> Command<S> for CompositeCommand<S> {
    fn execute(&self, state: &mut S) {
        for command in self.commands.iter() {
            command.execute(state);
        }
    }

    fn unexecute(&self, state: &mut S) {
        for command in self.commands.iter().rev() {
            command.unexecute(state);
        }
    }

    /// A composite is empty iff every child is empty (vacuously true when
    /// it has no children).
    fn is_empty(&self) -> bool {
        self.commands.iter().all(|command| command.is_empty())
    }

    fn name(&self) -> &str {
        "composite"
    }

    fn shape(&self) -> CommandShape<'_, S> {
        CommandShape::Composite(self)
    }
}
