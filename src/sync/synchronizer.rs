// ============================================================================
// Viewer Command Synchronizer
// ============================================================================

use super::context::{Route, SynchronizationContext};
use super::{Backlog, VisibilityPredicate};
use crate::command::{CompositeCommand, SharedCommand};
use crate::core::{ObjectId, ViewerId, viewer_label};
use crate::stats::SynchronizerStats;
use tracing::{debug, trace};

/// Produces the command stream for one viewer's replica.
///
/// Each emitted batch goes through [`synchronize`](Self::synchronize): what
/// the viewer may see comes back immediately, the rest is parked in this
/// synchronizer's backlog under the object it concerns. When that object
/// becomes visible, [`update`](Self::update) hands the parked commands over in
/// their original order, so hiding delays delivery but never reorders or
/// drops anything.
///
/// One instance per viewer. Instances share nothing and may be driven from
/// different threads, one consumer each.
pub struct ViewerCommandSynchronizer<S> {
    viewer: Option<ViewerId>,
    backlog: Backlog<S>,
    stats: SynchronizerStats,
}

impl<S: 'static> ViewerCommandSynchronizer<S> {
    pub fn new(viewer: Option<ViewerId>) -> Self {
        Self {
            viewer,
            backlog: Backlog::new(),
            stats: SynchronizerStats::default(),
        }
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.viewer
    }

    /// Filters one batch for this viewer.
    ///
    /// Returns `None` when nothing in the batch is deliverable right now.
    pub fn synchronize(
        &mut self,
        state: &S,
        visibility: &dyn VisibilityPredicate<S>,
        batch: &SharedCommand<S>,
    ) -> Option<CompositeCommand<S>> {
        let mut context = SynchronizationContext::new(state, visibility, self.viewer);
        context.process(batch, false);

        self.stats.batches += 1;
        let mut output = CompositeCommand::new();
        for routed in context.into_routed() {
            match routed.route {
                Route::Deliver => {
                    self.stats.delivered += 1;
                    output.push(routed.command);
                }
                Route::Defer(object) => {
                    trace!(
                        viewer = %viewer_label(self.viewer),
                        %object,
                        command = routed.command.name(),
                        "withholding command"
                    );
                    self.stats.deferred += 1;
                    self.backlog.defer(object, routed.command);
                }
            }
        }

        if output.has_children() {
            Some(output)
        } else {
            None
        }
    }

    /// Releases everything withheld for `object`.
    ///
    /// Call once, when `object` has just become visible to this viewer and
    /// the replica holds whatever baseline the withheld commands need.
    pub fn update(&mut self, object: ObjectId) -> Option<CompositeCommand<S>> {
        let released = self.backlog.take(object)?;
        debug!(
            viewer = %viewer_label(self.viewer),
            %object,
            commands = released.len(),
            "releasing backlog"
        );
        self.stats.released += released.len() as u64;
        Some(released)
    }

    pub fn backlog(&self) -> &Backlog<S> {
        &self.backlog
    }

    pub fn stats(&self) -> SynchronizerStats {
        self.stats.clone()
    }
}
