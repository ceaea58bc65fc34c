use serde::{Deserialize, Serialize};

/// Whether a controller keeps the log of top-level commits that joining
/// viewers replay from empty state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayLogPolicy {
    /// Keep every top-level commit for the lifetime of the controller.
    #[default]
    Retain,
    /// Record nothing; late joiners are not supported.
    Disabled,
}

/// Scope controller configuration
///
/// # Examples
///
/// ```
/// use scopecast::{ControllerConfig, ReplayLogPolicy};
///
/// let config = ControllerConfig::new()
///     .replay_log(ReplayLogPolicy::Disabled)
///     .max_scope_depth(8);
///
/// assert!(!config.records_replay_log());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub replay_log: ReplayLogPolicy,

    /// Maximum number of simultaneously open scopes. Opening one more is a
    /// usage error.
    pub max_scope_depth: usize,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self {
            replay_log: ReplayLogPolicy::Retain,
            max_scope_depth: 64,
        }
    }

    /// Set the replay log policy
    pub fn replay_log(mut self, policy: ReplayLogPolicy) -> Self {
        self.replay_log = policy;
        self
    }

    /// Set the scope nesting limit
    pub fn max_scope_depth(mut self, depth: usize) -> Self {
        self.max_scope_depth = depth;
        self
    }

    pub fn records_replay_log(&self) -> bool {
        self.replay_log == ReplayLogPolicy::Retain
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}
