use crate::command::CompositeCommand;
use crate::core::{BatchSequence, ObjectId};
use std::fmt;

/// What a replica receives, in order, over its channel.
pub enum ReplicaMessage<S> {
    /// Filtered replay log, sent once on join. May be empty.
    Initial(CompositeCommand<S>),
    /// Filtered output of one emitted batch.
    Batch {
        sequence: BatchSequence,
        commands: CompositeCommand<S>,
    },
    /// Commands withheld for `object`, released because it became visible.
    Reveal {
        object: ObjectId,
        commands: CompositeCommand<S>,
    },
}

impl<S> ReplicaMessage<S> {
    pub fn commands(&self) -> &CompositeCommand<S> {
        match self {
            ReplicaMessage::Initial(commands) => commands,
            ReplicaMessage::Batch { commands, .. } => commands,
            ReplicaMessage::Reveal { commands, .. } => commands,
        }
    }

    pub fn into_commands(self) -> CompositeCommand<S> {
        match self {
            ReplicaMessage::Initial(commands) => commands,
            ReplicaMessage::Batch { commands, .. } => commands,
            ReplicaMessage::Reveal { commands, .. } => commands,
        }
    }
}

impl<S> fmt::Debug for ReplicaMessage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicaMessage::Initial(commands) => f.debug_tuple("Initial").field(commands).finish(),
            ReplicaMessage::Batch { sequence, commands } => f
                .debug_struct("Batch")
                .field("sequence", sequence)
                .field("commands", commands)
                .finish(),
            ReplicaMessage::Reveal { object, commands } => f
                .debug_struct("Reveal")
                .field("object", object)
                .field("commands", commands)
                .finish(),
        }
    }
}
