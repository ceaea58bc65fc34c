use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an object in the shared state store.
///
/// Privacy is always scoped to one of these: a command that carries hidden
/// information names the object it belongs to, and the visibility policy
/// answers per `(object, viewer)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        ObjectId(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj_{}", self.0)
    }
}

/// Identity of a privileged viewer (a player).
///
/// Spectators have no identity and are represented as `Option::<ViewerId>::None`
/// wherever a viewer is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewerId(pub u32);

impl From<u32> for ViewerId {
    fn from(value: u32) -> Self {
        ViewerId(value)
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer_{}", self.0)
    }
}

/// Formats an optional viewer the way it appears in logs.
pub fn viewer_label(viewer: Option<ViewerId>) -> String {
    match viewer {
        Some(viewer) => viewer.to_string(),
        None => "spectator".to_string(),
    }
}

/// Handle of one connected replica inside a replication hub.
///
/// Distinct from [`ViewerId`]: several spectator replicas share the `None`
/// viewer but each has its own replica id and backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReplicaId(pub u64);

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replica_{}", self.0)
    }
}

/// Position of an emitted batch in the controller's output stream.
///
/// Sequences start at 1 and increase by one per emitted batch, so a consumer
/// can detect gaps or duplicates.
pub type BatchSequence = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ObjectId(7).to_string(), "obj_7");
        assert_eq!(ViewerId(2).to_string(), "viewer_2");
        assert_eq!(ReplicaId(11).to_string(), "replica_11");
    }

    #[test]
    fn test_viewer_label() {
        assert_eq!(viewer_label(Some(ViewerId(1))), "viewer_1");
        assert_eq!(viewer_label(None), "spectator");
    }

    #[test]
    fn test_ids_serialize_transparently_ordered() {
        let json = serde_json::to_string(&ObjectId(42)).unwrap();
        assert_eq!(json, "42");
        assert!(ObjectId(1) < ObjectId(2));
    }
}
