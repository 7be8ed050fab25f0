//! Per-invocation job context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity of one tool invocation, carried into every log line it emits.
#[derive(Debug, Clone, Serialize)]
pub struct JobContext {
    /// Unique job ID.
    pub job_id: Uuid,
    /// Who asked for the work, when known.
    pub user_id: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
}

impl JobContext {
    /// Create a new job context.
    pub fn new() -> Self {
        Self {
            job_id: Uuid::new_v4(),
            user_id: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the requesting user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Time since the job was created.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }
}

impl Default for JobContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_context_has_its_own_id() {
        let a = JobContext::new();
        let b = JobContext::default();
        assert_ne!(a.job_id, b.job_id);
        assert!(a.user_id.is_none());
    }

    #[test]
    fn test_with_user() {
        let ctx = JobContext::new().with_user("alice");
        assert_eq!(ctx.user_id.as_deref(), Some("alice"));
        assert!(ctx.elapsed() >= chrono::Duration::zero());
    }
}
