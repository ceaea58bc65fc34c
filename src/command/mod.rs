// ============================================================================
// Command Module
// ============================================================================
//
// Reversible units of mutation over a shared state `S`.
//
// - `Command`: one operation with `execute`/`unexecute`
// - `CompositeCommand`: ordered children, undone in strict reverse order
// - `InverseAdapter`: swaps the two directions of a wrapped command
//
// Commands are immutable once built and travel as `Arc<dyn Command<S>>`, so
// one committed batch can sit in the replay log, in the emitted batch and in
// several viewer backlogs at once.
//
// ============================================================================

pub mod command;
pub mod composite;
pub mod inverse;

pub use command::{Command, CommandShape, SharedCommand};
pub use composite::CompositeCommand;
pub use inverse::InverseAdapter;
