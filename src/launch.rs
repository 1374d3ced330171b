use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::LaunchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub id: Uuid,
    pub version: String,
    pub pid: Option<u32>,
    pub started_at: DateTime<Utc>,
}

impl ProcessHandle {
    pub fn new(version: impl Into<String>, pid: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: version.into(),
            pid,
            started_at: Utc::now(),
        }
    }
}

/// Starts the game for a version and account.
///
/// The shell only triggers this and shows the outcome as status text; how
/// the game is installed and spawned belongs to the implementor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LaunchService: Send + Sync {
    async fn launch(&self, version: &str, session: &Session) -> Result<ProcessHandle, LaunchError>;
}

pub fn launching_message(version: &str) -> String {
    format!("Launching Minecraft {}...", version)
}

pub fn launched_message(handle: &ProcessHandle) -> String {
    match handle.pid {
        Some(pid) => format!("Minecraft {} started (pid {})", handle.version, pid),
        None => format!("Minecraft {} started", handle.version),
    }
}
