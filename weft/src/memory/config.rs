//! Per-invocation configuration.

/// Default maximum number of steps per invocation.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Config for a single `invoke` / `stream` call.
///
/// - `thread_id`: scopes checkpoints. Without it (or without a checkpointer)
///   the run is stateless and cannot be interrupted and resumed.
/// - `user_id`: available to nodes for store namespaces.
/// - `recursion_limit`: maximum number of steps executed by this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnableConfig {
    pub thread_id: Option<String>,
    pub user_id: Option<String>,
    pub recursion_limit: usize,
}

impl Default for RunnableConfig {
    fn default() -> Self {
        Self {
            thread_id: None,
            user_id: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RunnableConfig {
    /// Config bound to `thread_id` with default limits.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}
