use super::{Visibility, VisibilityPredicate};
use crate::command::{CommandShape, InverseAdapter, SharedCommand};
use crate::core::{ObjectId, ViewerId};
use std::sync::Arc;

/// Where one projected command ends up for the viewer being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Deliver,
    Defer(ObjectId),
}

pub(crate) struct Routed<S> {
    pub(crate) route: Route,
    pub(crate) command: SharedCommand<S>,
}

/// State of one synchronization pass: one viewer, one input batch.
///
/// Commands handed to [`register`](Self::register) from inside
/// [`SynchronizableCommand::synchronize`](super::SynchronizableCommand::synchronize)
/// are processed on the spot, so they precede the projection of the command
/// that registered them.
pub struct SynchronizationContext<'a, S> {
    state: &'a S,
    visibility: &'a dyn VisibilityPredicate<S>,
    viewer: Option<ViewerId>,
    routed: Vec<Routed<S>>,
}

impl<'a, S: 'static> SynchronizationContext<'a, S> {
    pub(crate) fn new(
        state: &'a S,
        visibility: &'a dyn VisibilityPredicate<S>,
        viewer: Option<ViewerId>,
    ) -> Self {
        Self {
            state,
            visibility,
            viewer,
            routed: Vec::new(),
        }
    }

    /// Shared state as seen by the writer, for commands that need to look
    /// something up while building their projection.
    pub fn state(&self) -> &S {
        self.state
    }

    pub fn viewer(&self) -> Option<ViewerId> {
        self.viewer
    }

    /// Synchronizes and filters a nested command right away.
    pub fn register(&mut self, command: SharedCommand<S>) {
        self.process(&command, false);
    }

    /// Walks `command` depth first.
    ///
    /// `inverted` is set below an inverse adapter: composites are then walked
    /// back to front, and each leaf's routed output (its nested registrations
    /// followed by its projection) is emitted reversed, every entry wrapped in
    /// an inverse adapter and keeping its own route.
    pub(crate) fn process(&mut self, command: &SharedCommand<S>, inverted: bool) {
        if command.is_empty() {
            return;
        }

        match command.shape() {
            CommandShape::Composite(composite) => {
                if inverted {
                    for child in composite.iter().rev() {
                        self.process(child, true);
                    }
                } else {
                    for child in composite.iter() {
                        self.process(child, false);
                    }
                }
            }
            CommandShape::Inverse(inner) => self.process(inner, !inverted),
            CommandShape::Leaf => {
                let mark = self.routed.len();
                match command.as_synchronizable() {
                    None => self.routed.push(Routed {
                        route: Route::Deliver,
                        command: command.clone(),
                    }),
                    Some(synchronizable) => {
                        if let Some(projection) = synchronizable.synchronize(self) {
                            let route = match Visibility::resolve(
                                synchronizable,
                                self.state,
                                self.visibility,
                                self.viewer,
                            ) {
                                Visibility::Visible => Route::Deliver,
                                Visibility::Hidden(object) => Route::Defer(object),
                            };
                            self.routed.push(Routed {
                                route,
                                command: projection,
                            });
                        }
                    }
                }

                if inverted {
                    let forward = self.routed.split_off(mark);
                    for entry in forward.into_iter().rev() {
                        self.routed.push(Routed {
                            route: entry.route,
                            command: Arc::new(InverseAdapter::new(entry.command)),
                        });
                    }
                }
            }
        }
    }

    pub(crate) fn into_routed(self) -> Vec<Routed<S>> {
        self.routed
    }
}
