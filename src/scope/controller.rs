// ============================================================================
// Scope Controller
// ============================================================================

use super::{Batch, BatchKind, BatchSink, CommandGroup, Scope, ScopeKind};
use crate::command::{Command, CompositeCommand, InverseAdapter, SharedCommand};
use crate::config::ControllerConfig;
use crate::core::{BatchSequence, Result, ScopeError};
use crate::stats::ControllerStats;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, debug_span, trace};

/// Proof of an open transaction, consumed when it ends.
#[must_use = "a transaction must be ended with commit or rollback"]
#[derive(Debug, PartialEq, Eq)]
pub struct TransactionToken {
    scope: u64,
}

impl TransactionToken {
    pub fn id(&self) -> u64 {
        self.scope
    }
}

/// Read-only view of the controller's "undoing a rollback" flag.
///
/// Hand a clone to whatever reacts to state changes (triggers, watchers) so
/// it can stay quiet while a rollback is being applied.
#[derive(Debug, Clone)]
pub struct RollbackMonitor {
    flag: Arc<AtomicBool>,
}

impl RollbackMonitor {
    pub fn is_rolling_back(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Sets the rollback flag for as long as it lives, unwinding included.
struct RollbackFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RollbackFlagGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for RollbackFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Applies commands to the shared state and decides when they become
/// externally observable.
///
/// Owns a stack of open scopes (innermost last) and the replay log. Every
/// batch it emits goes to its [`BatchSink`] exactly once, fully formed.
///
/// A command executed while no group is open is emitted on its own
/// immediately. Commands executed inside a group are emitted together when
/// the outermost group closes. Rolling back a transaction whose commands were
/// emitted live emits their inverse.
///
/// # Thread Safety
/// Single writer: the controller and the state it mutates belong to the
/// simulation thread.
///
/// # Examples
///
/// ```
/// use scopecast::{BatchRecorder, ScopeController};
///
/// let recorder = BatchRecorder::<Vec<i32>>::new();
/// let mut controller = ScopeController::new(recorder.clone());
/// let mut state = Vec::new();
///
/// let token = controller.begin_transaction()?;
/// // ... execute commands against `state` ...
/// controller.rollback(&mut state, token)?;
/// assert!(recorder.is_empty());
/// # Ok::<(), scopecast::ScopeError>(())
/// ```
pub struct ScopeController<S> {
    scopes: Vec<Scope<S>>,
    replay_log: CompositeCommand<S>,
    sink: Box<dyn BatchSink<S>>,
    config: ControllerConfig,
    next_scope_id: u64,
    last_sequence: BatchSequence,
    rolling_back: Arc<AtomicBool>,
    stats: ControllerStats,
}

impl<S: 'static> ScopeController<S> {
    pub fn new(sink: impl BatchSink<S> + 'static) -> Self {
        Self::with_config(sink, ControllerConfig::default())
    }

    pub fn with_config(sink: impl BatchSink<S> + 'static, config: ControllerConfig) -> Self {
        Self {
            scopes: Vec::new(),
            replay_log: CompositeCommand::new(),
            sink: Box::new(sink),
            config,
            next_scope_id: 1,
            last_sequence: 0,
            rolling_back: Arc::new(AtomicBool::new(false)),
            stats: ControllerStats::default(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Applies `command` and routes it.
    ///
    /// Empty commands are skipped. Otherwise the command lands in the
    /// innermost scope (or the replay log when none is open) and, unless a
    /// group is open, is emitted as its own batch.
    pub fn execute(&mut self, state: &mut S, command: SharedCommand<S>) {
        if command.is_empty() {
            trace!(command = command.name(), "skipping empty command");
            self.stats.skipped_empty += 1;
            return;
        }

        command.execute(state);
        self.stats.executed += 1;
        self.record(command.clone());

        if !self.is_in_group() {
            self.emit(BatchKind::Live, command);
        }
    }

    /// Opens a transaction nested in the current scope.
    ///
    /// # Errors
    /// Returns error if the scope depth limit is reached
    pub fn begin_transaction(&mut self) -> Result<TransactionToken> {
        let id = self.open(ScopeKind::Transaction)?;
        Ok(TransactionToken { scope: id })
    }

    /// Ends the innermost transaction, committing or rolling it back.
    ///
    /// # Errors
    /// Returns error if no scope is open, the innermost scope is a group, or
    /// `token` belongs to a different transaction. Nothing changes when an
    /// error is returned.
    pub fn end_transaction(
        &mut self,
        state: &mut S,
        token: TransactionToken,
        rollback: bool,
    ) -> Result<()> {
        let top = self.scopes.last().ok_or(ScopeError::NoOpenScope)?;
        match top.kind() {
            ScopeKind::Group if rollback => return Err(ScopeError::GroupRollback(top.id())),
            ScopeKind::Group => return Err(ScopeError::NotInnermost(token.scope)),
            ScopeKind::Transaction if top.id() != token.scope => {
                return Err(ScopeError::TokenMismatch {
                    expected: top.id(),
                    actual: token.scope,
                });
            }
            ScopeKind::Transaction => {}
        }

        if rollback {
            self.close_rolled_back(state)
        } else {
            self.close_committed()
        }
    }

    /// Commits the innermost transaction.
    pub fn commit(&mut self, token: TransactionToken) -> Result<()> {
        let top = self.scopes.last().ok_or(ScopeError::NoOpenScope)?;
        if top.kind() != ScopeKind::Transaction {
            return Err(ScopeError::NotInnermost(token.scope));
        }
        if top.id() != token.scope {
            return Err(ScopeError::TokenMismatch {
                expected: top.id(),
                actual: token.scope,
            });
        }
        self.close_committed()
    }

    /// Rolls back the innermost transaction.
    pub fn rollback(&mut self, state: &mut S, token: TransactionToken) -> Result<()> {
        self.end_transaction(state, token, true)
    }

    /// Opens a command group. It commits when the returned guard is finished
    /// or dropped.
    ///
    /// # Errors
    /// Returns error if the scope depth limit is reached
    pub fn begin_command_group(&mut self) -> Result<CommandGroup<'_, S>> {
        let id = self.open(ScopeKind::Group)?;
        Ok(CommandGroup::new(self, id))
    }

    pub(crate) fn end_group(&mut self, id: u64) -> Result<()> {
        let top = self.scopes.last().ok_or(ScopeError::NoOpenScope)?;
        if top.id() != id || top.kind() != ScopeKind::Group {
            return Err(ScopeError::NotInnermost(id));
        }
        self.close_committed()
    }

    /// True if the innermost open scope is inside a group.
    pub fn is_in_group(&self) -> bool {
        self.scopes.last().is_some_and(|scope| scope.in_group())
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// True while the inverse of a rolled-back transaction is being applied.
    pub fn is_rolling_back(&self) -> bool {
        self.rolling_back.load(Ordering::Acquire)
    }

    pub fn rollback_monitor(&self) -> RollbackMonitor {
        RollbackMonitor {
            flag: self.rolling_back.clone(),
        }
    }

    /// Everything committed at top level so far, for a newly joined viewer
    /// to replay from empty state.
    ///
    /// # Errors
    /// Returns error if the replay log is disabled by configuration
    pub fn create_initial_synchronization_command(&self) -> Result<SharedCommand<S>> {
        if !self.config.records_replay_log() {
            return Err(ScopeError::ReplayLogDisabled);
        }
        Ok(Arc::new(self.replay_log.clone()))
    }

    /// Sequence of the most recently emitted batch, 0 before the first.
    pub fn last_sequence(&self) -> BatchSequence {
        self.last_sequence
    }

    pub fn replay_log(&self) -> &CompositeCommand<S> {
        &self.replay_log
    }

    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            replay_log_len: self.replay_log.len(),
            open_scopes: self.scopes.len(),
            ..self.stats.clone()
        }
    }

    fn open(&mut self, kind: ScopeKind) -> Result<u64> {
        if self.scopes.len() >= self.config.max_scope_depth {
            return Err(ScopeError::ScopeDepthExceeded(self.config.max_scope_depth));
        }

        let id = self.next_scope_id;
        self.next_scope_id += 1;
        let scope = match kind {
            ScopeKind::Transaction => Scope::transaction(id, self.is_in_group()),
            ScopeKind::Group => Scope::group(id),
        };
        debug!(scope = id, %kind, in_group = scope.in_group(), depth = self.scopes.len() + 1, "scope opened");
        self.scopes.push(scope);
        Ok(id)
    }

    /// Appends to the innermost scope, or to the replay log at top level.
    fn record(&mut self, command: SharedCommand<S>) {
        match self.scopes.last_mut() {
            Some(scope) => scope.record(command),
            None if self.config.records_replay_log() => self.replay_log.push(command),
            None => {}
        }
    }

    fn close_committed(&mut self) -> Result<()> {
        let top = self.scopes.last_mut().ok_or(ScopeError::NoOpenScope)?;
        top.commit()?;
        let Some(scope) = self.scopes.pop() else {
            return Err(ScopeError::NoOpenScope);
        };
        let _span = debug_span!("commit", scope = scope.id(), kind = %scope.kind()).entered();
        self.stats.commits += 1;

        let was_in_group = scope.in_group();
        let commands = scope.into_commands();
        if commands.is_empty() {
            trace!("nothing to commit");
            return Ok(());
        }

        let command: SharedCommand<S> = Arc::new(commands);
        self.record(command.clone());

        // Only the close of the outermost group boundary emits; commands
        // outside any group already went out live.
        if was_in_group && !self.is_in_group() {
            self.emit(BatchKind::GroupCommit, command);
        }
        Ok(())
    }

    fn close_rolled_back(&mut self, state: &mut S) -> Result<()> {
        let top = self.scopes.last_mut().ok_or(ScopeError::NoOpenScope)?;
        top.roll_back()?;
        let Some(scope) = self.scopes.pop() else {
            return Err(ScopeError::NoOpenScope);
        };
        let _span = debug_span!("rollback", scope = scope.id()).entered();
        self.stats.rollbacks += 1;

        let commands = scope.into_commands();
        if commands.is_empty() {
            trace!("nothing to roll back");
            return Ok(());
        }

        {
            let _flag = RollbackFlagGuard::raise(&self.rolling_back);
            commands.unexecute(state);
        }

        if !self.is_in_group() {
            let inverse: SharedCommand<S> = Arc::new(InverseAdapter::new(Arc::new(commands)));
            self.emit(BatchKind::Compensation, inverse);
        }
        Ok(())
    }

    fn emit(&mut self, kind: BatchKind, command: SharedCommand<S>) {
        self.last_sequence += 1;
        self.stats.batches_emitted += 1;
        debug!(
            sequence = self.last_sequence,
            ?kind,
            command = command.name(),
            "emitting batch"
        );
        self.sink.emit(Batch::new(self.last_sequence, kind, command));
    }
}
