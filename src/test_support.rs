//! Small domain used by the unit tests: a tally of integers plus a list of
//! secrets keyed by object.

use crate::command::{Command, SharedCommand};
use crate::core::{ObjectId, ViewerId};
use crate::sync::{SynchronizableCommand, SynchronizationContext, VisibilityPredicate};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tally {
    pub values: Vec<i64>,
    pub secrets: Vec<(u64, String)>,
    pub journal: Vec<String>,
}

#[derive(Debug)]
pub struct Push {
    value: i64,
    label: String,
}

impl Command<Tally> for Push {
    fn execute(&self, state: &mut Tally) {
        state.values.push(self.value);
        state.journal.push(format!("do {}", self.value));
    }

    fn unexecute(&self, state: &mut Tally) {
        assert_eq!(state.values.pop(), Some(self.value));
        state.journal.push(format!("undo {}", self.value));
    }

    fn name(&self) -> &str {
        &self.label
    }
}

pub fn push(value: i64) -> SharedCommand<Tally> {
    Arc::new(Push {
        value,
        label: format!("push {value}"),
    })
}

#[derive(Debug)]
pub struct Noop;

impl Command<Tally> for Noop {
    fn execute(&self, _state: &mut Tally) {}

    fn unexecute(&self, _state: &mut Tally) {}

    fn is_empty(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "noop"
    }
}

pub fn noop() -> SharedCommand<Tally> {
    Arc::new(Noop)
}

/// Records a secret about an object. Private and scoped to that object
/// unless configured otherwise.
#[derive(Debug, Clone)]
pub struct Reveal {
    object: u64,
    text: String,
    label: String,
    public: bool,
    scoped: bool,
    masked_for: Option<ViewerId>,
    dropped: bool,
}

pub fn reveal(object: u64, text: &str) -> Reveal {
    Reveal {
        object,
        text: text.to_string(),
        label: format!("reveal {object}"),
        public: false,
        scoped: true,
        masked_for: None,
        dropped: false,
    }
}

impl Reveal {
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn unscoped(mut self) -> Self {
        self.scoped = false;
        self
    }

    pub fn masked_for(mut self, viewer: ViewerId) -> Self {
        self.masked_for = Some(viewer);
        self
    }

    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }

    pub fn shared(self) -> SharedCommand<Tally> {
        Arc::new(self)
    }
}

impl Command<Tally> for Reveal {
    fn execute(&self, state: &mut Tally) {
        state.secrets.push((self.object, self.text.clone()));
    }

    fn unexecute(&self, state: &mut Tally) {
        assert_eq!(state.secrets.pop(), Some((self.object, self.text.clone())));
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn as_synchronizable(&self) -> Option<&dyn SynchronizableCommand<Tally>> {
        Some(self)
    }
}

impl SynchronizableCommand<Tally> for Reveal {
    fn is_public(&self) -> bool {
        self.public
    }

    fn object(&self, _state: &Tally) -> Option<ObjectId> {
        self.scoped.then_some(ObjectId(self.object))
    }

    fn synchronize(&self, context: &mut SynchronizationContext<'_, Tally>) -> Option<SharedCommand<Tally>> {
        if self.dropped {
            return None;
        }
        let mut projection = self.clone();
        if self.masked_for.is_some() && self.masked_for == context.viewer() {
            projection.text = "???".to_string();
        }
        Some(Arc::new(projection))
    }
}

/// Public marker applied on replicas in place of an umbrella command.
#[derive(Debug)]
pub struct Marker(String);

impl Command<Tally> for Marker {
    fn execute(&self, state: &mut Tally) {
        state.journal.push(self.0.clone());
    }

    fn unexecute(&self, state: &mut Tally) {
        assert_eq!(state.journal.pop(), Some(self.0.clone()));
    }

    fn name(&self) -> &str {
        &self.0
    }
}

/// Applies its parts on the writer and registers them one by one when
/// synchronized, followed by a public marker.
#[derive(Debug)]
pub struct Umbrella {
    label: String,
    parts: Vec<SharedCommand<Tally>>,
}

pub fn umbrella(label: &str, parts: Vec<SharedCommand<Tally>>) -> SharedCommand<Tally> {
    Arc::new(Umbrella {
        label: label.to_string(),
        parts,
    })
}

impl Command<Tally> for Umbrella {
    fn execute(&self, state: &mut Tally) {
        for part in &self.parts {
            part.execute(state);
        }
        state.journal.push(self.label.clone());
    }

    fn unexecute(&self, state: &mut Tally) {
        assert_eq!(state.journal.pop(), Some(self.label.clone()));
        for part in self.parts.iter().rev() {
            part.unexecute(state);
        }
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn as_synchronizable(&self) -> Option<&dyn SynchronizableCommand<Tally>> {
        Some(self)
    }
}

impl SynchronizableCommand<Tally> for Umbrella {
    fn is_public(&self) -> bool {
        true
    }

    fn object(&self, _state: &Tally) -> Option<ObjectId> {
        None
    }

    fn synchronize(&self, context: &mut SynchronizationContext<'_, Tally>) -> Option<SharedCommand<Tally>> {
        for part in &self.parts {
            context.register(part.clone());
        }
        Some(Arc::new(Marker(self.label.clone())))
    }
}

/// Hides a fixed set of objects from one viewer; everyone else sees all.
pub struct HiddenFrom {
    viewer: ViewerId,
    objects: HashSet<ObjectId>,
}

pub fn hidden_from(viewer: ViewerId, objects: &[u64]) -> HiddenFrom {
    HiddenFrom {
        viewer,
        objects: objects.iter().copied().map(ObjectId).collect(),
    }
}

impl HiddenFrom {
    pub fn show(&mut self, object: u64) {
        self.objects.remove(&ObjectId(object));
    }
}

impl VisibilityPredicate<Tally> for HiddenFrom {
    fn is_visible(&self, _state: &Tally, object: ObjectId, viewer: Option<ViewerId>) -> bool {
        viewer != Some(self.viewer) || !self.objects.contains(&object)
    }
}
