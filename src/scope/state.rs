// ============================================================================
// Scope State Management
// ============================================================================
//
// State Pattern for scope lifecycle: Open -> Committed/RolledBack
//
// A scope accumulates every command executed while it is innermost:
// - Transaction: inherits `in_group` from the enclosing scope
// - Group: always `in_group`, never rolled back
//
// ============================================================================

use crate::command::{CompositeCommand, SharedCommand};
use crate::core::{Result, ScopeError};
use std::fmt;

/// Kind of an open scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Transaction,
    Group,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Transaction => write!(f, "transaction"),
            ScopeKind::Group => write!(f, "group"),
        }
    }
}

/// Scope lifecycle
///
/// ```text
/// Open ──commit──> Committed
///   │
///   └──rollback──> RolledBack
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Open,
    Committed,
    RolledBack,
}

impl ScopeState {
    pub fn is_open(&self) -> bool {
        matches!(self, ScopeState::Open)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeState::Open => write!(f, "OPEN"),
            ScopeState::Committed => write!(f, "COMMITTED"),
            ScopeState::RolledBack => write!(f, "ROLLED BACK"),
        }
    }
}

/// One open transaction or group and everything executed inside it.
///
/// `in_group` is fixed at creation: always true for a group, inherited from
/// the enclosing scope for a transaction.
pub struct Scope<S> {
    id: u64,
    kind: ScopeKind,
    state: ScopeState,
    in_group: bool,
    commands: CompositeCommand<S>,
}

impl<S> Scope<S> {
    pub(crate) fn transaction(id: u64, enclosing_in_group: bool) -> Self {
        Self::new(id, ScopeKind::Transaction, enclosing_in_group)
    }

    pub(crate) fn group(id: u64) -> Self {
        Self::new(id, ScopeKind::Group, true)
    }

    fn new(id: u64, kind: ScopeKind, in_group: bool) -> Self {
        Self {
            id,
            kind,
            state: ScopeState::Open,
            in_group,
            commands: CompositeCommand::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn in_group(&self) -> bool {
        self.in_group
    }

    pub fn commands(&self) -> &CompositeCommand<S> {
        &self.commands
    }

    pub(crate) fn record(&mut self, command: SharedCommand<S>) {
        debug_assert!(self.state.is_open(), "recording into a closed scope");
        self.commands.push(command);
    }

    /// Moves the scope to `Committed`.
    ///
    /// # Errors
    /// Returns error if the scope has already ended
    pub(crate) fn commit(&mut self) -> Result<()> {
        self.end(ScopeState::Committed)
    }

    /// Moves the scope to `RolledBack`.
    ///
    /// # Errors
    /// Returns error if the scope is a group or has already ended
    pub(crate) fn roll_back(&mut self) -> Result<()> {
        if self.kind == ScopeKind::Group {
            return Err(ScopeError::GroupRollback(self.id));
        }
        self.end(ScopeState::RolledBack)
    }

    fn end(&mut self, outcome: ScopeState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ScopeError::AlreadyEnded(self.id));
        }
        self.state = outcome;
        Ok(())
    }

    pub(crate) fn into_commands(self) -> CompositeCommand<S> {
        self.commands
    }
}

impl<S> fmt::Debug for Scope<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("in_group", &self.in_group)
            .field("commands", &self.commands.len())
            .finish()
    }
}
