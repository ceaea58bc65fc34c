pub mod error;
pub mod types;

pub use error::{Result, ScopeError};
pub use types::{BatchSequence, ObjectId, ReplicaId, ViewerId, viewer_label};
