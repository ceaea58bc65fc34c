use thiserror::Error;

/// Usage violations of the scope discipline.
///
/// Every variant signals a bug in the calling domain logic, not a runtime
/// condition: callers are expected to propagate it and abort the
/// simulation rather than retry. The controller checks for them before
/// touching any state, so the scope stack is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("No scope is open")]
    NoOpenScope,

    #[error("Scope {0} is not the innermost open scope")]
    NotInnermost(u64),

    #[error("Transaction token mismatch: innermost transaction is {expected}, got {actual}")]
    TokenMismatch { expected: u64, actual: u64 },

    #[error("Command group {0} cannot be rolled back")]
    GroupRollback(u64),

    #[error("Scope {0} has already ended")]
    AlreadyEnded(u64),

    #[error("Scope depth limit of {0} exceeded")]
    ScopeDepthExceeded(usize),

    #[error("Replay log recording is disabled")]
    ReplayLogDisabled,

    #[error("Cannot join while {0} scopes are open")]
    ScopeOpen(usize),
}

pub type Result<T> = std::result::Result<T, ScopeError>;
