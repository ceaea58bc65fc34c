use crate::command::{CompositeCommand, SharedCommand};
use crate::core::ObjectId;
use std::collections::HashMap;

/// Projections withheld from one viewer, grouped by the object they are
/// scoped to.
///
/// Each entry keeps its commands in the order they were withheld and is
/// handed out exactly once by [`take`](Self::take).
pub struct Backlog<S> {
    entries: HashMap<ObjectId, CompositeCommand<S>>,
}

impl<S> Backlog<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Appends a withheld command to the entry for `object`, creating it if
    /// needed.
    pub fn defer(&mut self, object: ObjectId, command: SharedCommand<S>) {
        self.entries.entry(object).or_default().push(command);
    }

    /// Removes and returns everything withheld for `object`.
    pub fn take(&mut self, object: ObjectId) -> Option<CompositeCommand<S>> {
        self.entries.remove(&object)
    }

    pub fn pending(&self, object: ObjectId) -> Option<&CompositeCommand<S>> {
        self.entries.get(&object)
    }

    /// Objects that currently have withheld commands, in ascending order.
    pub fn pending_objects(&self) -> Vec<ObjectId> {
        let mut objects = self.entries.keys().copied().collect::<Vec<_>>();
        objects.sort();
        objects
    }

    /// Number of objects with a pending entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of withheld commands across all objects.
    pub fn command_count(&self) -> usize {
        self.entries.values().map(CompositeCommand::len).sum()
    }
}

impl<S> Default for Backlog<S> {
    fn default() -> Self {
        Self::new()
    }
}
