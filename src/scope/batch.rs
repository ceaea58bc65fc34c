use crate::command::SharedCommand;
use crate::core::BatchSequence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Why a batch was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    /// A single command executed outside any group.
    Live,
    /// Everything executed inside an outermost group, emitted when it closed.
    GroupCommit,
    /// Inverse of a rolled-back transaction whose commands had already been
    /// emitted live.
    Compensation,
}

/// One externally observable, atomically emitted unit of change.
pub struct Batch<S> {
    sequence: BatchSequence,
    kind: BatchKind,
    command: SharedCommand<S>,
}

impl<S> Batch<S> {
    pub(crate) fn new(sequence: BatchSequence, kind: BatchKind, command: SharedCommand<S>) -> Self {
        Self {
            sequence,
            kind,
            command,
        }
    }

    pub fn sequence(&self) -> BatchSequence {
        self.sequence
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    pub fn command(&self) -> &SharedCommand<S> {
        &self.command
    }

    pub fn into_command(self) -> SharedCommand<S> {
        self.command
    }
}

impl<S> Clone for Batch<S> {
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence,
            kind: self.kind,
            command: self.command.clone(),
        }
    }
}

impl<S> fmt::Debug for Batch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("sequence", &self.sequence)
            .field("kind", &self.kind)
            .field("command", &self.command)
            .finish()
    }
}

/// Receiver of emitted batches.
///
/// The controller calls `emit` synchronously, exactly once per batch, after
/// the batch is fully formed.
pub trait BatchSink<S>: Send {
    fn emit(&mut self, batch: Batch<S>);
}

impl<S> BatchSink<S> for UnboundedSender<Batch<S>> {
    fn emit(&mut self, batch: Batch<S>) {
        let sequence = batch.sequence();
        if self.send(batch).is_err() {
            warn!(sequence, "batch receiver dropped, discarding batch");
        }
    }
}

/// Adapts a closure into a sink.
pub struct CallbackSink<F>(pub F);

impl<S, F> BatchSink<S> for CallbackSink<F>
where
    F: FnMut(Batch<S>) + Send,
{
    fn emit(&mut self, batch: Batch<S>) {
        (self.0)(batch)
    }
}

/// Sink that keeps every batch in memory until taken.
///
/// Clones share the same buffer, so one clone can be handed to the
/// controller while another is kept for draining.
pub struct BatchRecorder<S> {
    batches: Arc<Mutex<Vec<Batch<S>>>>,
}

impl<S> BatchRecorder<S> {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Removes and returns all recorded batches in emission order.
    pub fn take(&self) -> Vec<Batch<S>> {
        let mut batches = self.batches.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *batches)
    }

    pub fn len(&self) -> usize {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> Clone for BatchRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            batches: self.batches.clone(),
        }
    }
}

impl<S> Default for BatchRecorder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> BatchSink<S> for BatchRecorder<S> {
    fn emit(&mut self, batch: Batch<S>) {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(batch);
    }
}
