// ============================================================================
// Replication Fan-Out
// ============================================================================
//
// Feeds emitted batches to every connected replica's synchronizer and ships
// the filtered output over one ordered channel per replica. Also relays
// reveal notifications into backlog releases.
//
// ============================================================================

pub mod hub;
pub mod message;

pub use hub::ReplicationHub;
pub use message::ReplicaMessage;
