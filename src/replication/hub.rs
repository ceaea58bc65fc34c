// ============================================================================
// Replication Hub
// ============================================================================

use super::ReplicaMessage;
use crate::core::{BatchSequence, ObjectId, ReplicaId, Result, ScopeError, ViewerId, viewer_label};
use crate::scope::{Batch, ScopeController};
use crate::stats::HubStats;
use crate::sync::{ViewerCommandSynchronizer, VisibilityPredicate};
use std::collections::BTreeMap;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, trace, warn};

struct ReplicaSlot<S> {
    synchronizer: ViewerCommandSynchronizer<S>,
    sender: UnboundedSender<ReplicaMessage<S>>,
    // Last batch sequence this replica already holds.
    watermark: BatchSequence,
}

/// Batch consumer fanning out to one synchronizer per connected replica.
///
/// Runs on the writer side, next to the controller: synchronization reads
/// the shared state, so each batch should be dispatched before the next
/// mutation. Transport workers only see the per-replica receivers.
///
/// # Baseline for reveals
/// A reveal travels on the same ordered channel as every earlier batch, so
/// by the time a replica applies it, it has applied every visible mutation
/// before it, including any public placeholder the domain emits for the
/// object. Domains must make such placeholders public commands.
pub struct ReplicationHub<S> {
    replicas: BTreeMap<ReplicaId, ReplicaSlot<S>>,
    next_replica: u64,
    last_sequence: Option<BatchSequence>,
    stats: HubStats,
}

impl<S: 'static> ReplicationHub<S> {
    pub fn new() -> Self {
        Self {
            replicas: BTreeMap::new(),
            next_replica: 1,
            last_sequence: None,
            stats: HubStats::default(),
        }
    }

    /// Connects a replica for `viewer` (`None` for a spectator).
    ///
    /// The controller's replay log is filtered through the new replica's
    /// synchronizer and sent as [`ReplicaMessage::Initial`]; whatever it may
    /// not see yet starts out in its backlog. Batches emitted before the join
    /// are covered by the replay log and skipped by later dispatches.
    ///
    /// Joining is only possible while no scope is open: the replay log does
    /// not hold commands of an open scope, even those already emitted live.
    ///
    /// # Errors
    /// Returns error if a scope is open or the controller does not keep a
    /// replay log
    ///
    /// # Examples
    ///
    /// ```
    /// use scopecast::{BatchRecorder, EverythingVisible, ReplicaMessage, ReplicationHub, ScopeController};
    ///
    /// let controller = ScopeController::new(BatchRecorder::<Vec<i32>>::new());
    /// let mut hub = ReplicationHub::new();
    /// let (_replica, mut rx) = hub.join(&controller, &Vec::new(), &EverythingVisible, None)?;
    ///
    /// # tokio_test::block_on(async {
    /// let message = rx.recv().await;
    /// assert!(matches!(message, Some(ReplicaMessage::Initial(_))));
    /// # });
    /// # Ok::<(), scopecast::ScopeError>(())
    /// ```
    pub fn join(
        &mut self,
        controller: &ScopeController<S>,
        state: &S,
        visibility: &dyn VisibilityPredicate<S>,
        viewer: Option<ViewerId>,
    ) -> Result<(ReplicaId, UnboundedReceiver<ReplicaMessage<S>>)> {
        if controller.depth() > 0 {
            return Err(ScopeError::ScopeOpen(controller.depth()));
        }
        let initial = controller.create_initial_synchronization_command()?;
        let watermark = controller.last_sequence();

        let id = ReplicaId(self.next_replica);
        self.next_replica += 1;

        let mut synchronizer = ViewerCommandSynchronizer::new(viewer);
        let commands = synchronizer
            .synchronize(state, visibility, &initial)
            .unwrap_or_default();
        let (sender, receiver) = unbounded_channel();
        // The receiver is still in hand, so this cannot fail.
        let _ = sender.send(ReplicaMessage::Initial(commands));
        self.stats.messages_sent += 1;

        info!(replica = %id, viewer = %viewer_label(viewer), "replica joined");
        self.replicas.insert(
            id,
            ReplicaSlot {
                synchronizer,
                sender,
                watermark,
            },
        );
        Ok((id, receiver))
    }

    /// Disconnects a replica, discarding its backlog.
    pub fn leave(&mut self, replica: ReplicaId) -> bool {
        let removed = self.replicas.remove(&replica).is_some();
        if removed {
            info!(replica = %replica, "replica left");
        }
        removed
    }

    /// Filters one emitted batch for every replica and sends the results.
    ///
    /// A batch whose sequence is not newer than the last dispatched one is
    /// ignored. A replica that joined after the batch was emitted already has
    /// it from the replay log and is skipped, so a batch is never delivered
    /// twice.
    pub fn dispatch(&mut self, state: &S, visibility: &dyn VisibilityPredicate<S>, batch: &Batch<S>) {
        let sequence = batch.sequence();
        if let Some(last) = self.last_sequence {
            if sequence <= last {
                warn!(sequence, last, "ignoring batch that was already dispatched");
                return;
            }
            if sequence != last + 1 {
                warn!(sequence, last, "batch sequence gap");
            }
        }
        self.last_sequence = Some(sequence);
        self.stats.batches_dispatched += 1;

        let mut disconnected = Vec::new();
        for (id, slot) in self.replicas.iter_mut() {
            if slot.watermark >= sequence {
                trace!(replica = %id, sequence, "batch already in replay log");
                continue;
            }
            slot.watermark = sequence;
            let Some(commands) = slot.synchronizer.synchronize(state, visibility, batch.command())
            else {
                continue;
            };
            if slot
                .sender
                .send(ReplicaMessage::Batch { sequence, commands })
                .is_err()
            {
                disconnected.push(*id);
            } else {
                self.stats.messages_sent += 1;
            }
        }
        self.prune(disconnected);
    }

    /// Releases `replica`'s backlog for `object`, which has just become
    /// visible to it.
    ///
    /// Returns the number of released commands, or `None` if the replica is
    /// unknown.
    pub fn reveal(&mut self, replica: ReplicaId, object: ObjectId) -> Option<usize> {
        let slot = self.replicas.get_mut(&replica)?;
        let Some(commands) = slot.synchronizer.update(object) else {
            return Some(0);
        };

        let released = commands.len();
        self.stats.reveals += 1;
        debug!(replica = %replica, %object, released, "sending reveal");
        if slot
            .sender
            .send(ReplicaMessage::Reveal { object, commands })
            .is_err()
        {
            self.prune(vec![replica]);
        } else {
            self.stats.messages_sent += 1;
        }
        Some(released)
    }

    /// Releases the backlog for `object` on every replica whose viewer
    /// `newly_visible` accepts. Returns the total number of released commands.
    pub fn reveal_all<F>(&mut self, object: ObjectId, newly_visible: F) -> usize
    where
        F: Fn(Option<ViewerId>) -> bool,
    {
        let targets = self
            .replicas
            .iter()
            .filter(|(_, slot)| newly_visible(slot.synchronizer.viewer()))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();

        targets
            .into_iter()
            .filter_map(|id| self.reveal(id, object))
            .sum()
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    pub fn viewer(&self, replica: ReplicaId) -> Option<Option<ViewerId>> {
        self.replicas
            .get(&replica)
            .map(|slot| slot.synchronizer.viewer())
    }

    /// Objects with withheld commands for `replica`.
    pub fn pending_objects(&self, replica: ReplicaId) -> Vec<ObjectId> {
        self.replicas
            .get(&replica)
            .map(|slot| slot.synchronizer.backlog().pending_objects())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            replicas: self.replicas.len(),
            ..self.stats.clone()
        }
    }

    fn prune(&mut self, disconnected: Vec<ReplicaId>) {
        for id in disconnected {
            if self.replicas.remove(&id).is_some() {
                warn!(replica = %id, "replica channel closed, dropping replica");
                self.stats.replicas_pruned += 1;
            }
        }
    }
}

impl<S: 'static> Default for ReplicationHub<S> {
    fn default() -> Self {
        Self::new()
    }
}
