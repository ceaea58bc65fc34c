use super::SynchronizableCommand;
use crate::core::{ObjectId, ViewerId};

/// External policy deciding whether an object's state may be disclosed to a
/// viewer. `viewer = None` is a spectator.
///
/// Must be deterministic for a given state. Results are never cached: the
/// synchronizer asks once per command per viewer.
pub trait VisibilityPredicate<S> {
    fn is_visible(&self, state: &S, object: ObjectId, viewer: Option<ViewerId>) -> bool;
}

impl<S, F> VisibilityPredicate<S> for F
where
    F: Fn(&S, ObjectId, Option<ViewerId>) -> bool,
{
    fn is_visible(&self, state: &S, object: ObjectId, viewer: Option<ViewerId>) -> bool {
        self(state, object, viewer)
    }
}

/// Policy that hides nothing. Useful for omniscient replicas such as a
/// referee or a debugging view.
#[derive(Debug, Clone, Copy, Default)]
pub struct EverythingVisible;

impl<S> VisibilityPredicate<S> for EverythingVisible {
    fn is_visible(&self, _state: &S, _object: ObjectId, _viewer: Option<ViewerId>) -> bool {
        true
    }
}

/// Outcome of resolving one command against one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden(ObjectId),
}

impl Visibility {
    /// Public commands are visible; so are commands not scoped to any object.
    /// Everything else is up to the predicate.
    pub fn resolve<S>(
        command: &dyn SynchronizableCommand<S>,
        state: &S,
        predicate: &dyn VisibilityPredicate<S>,
        viewer: Option<ViewerId>,
    ) -> Self {
        if command.is_public() {
            return Visibility::Visible;
        }
        match command.object(state) {
            None => Visibility::Visible,
            Some(object) if predicate.is_visible(state, object, viewer) => Visibility::Visible,
            Some(object) => Visibility::Hidden(object),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}
