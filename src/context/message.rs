use serde::{Deserialize, Serialize};

/// Role of a human turn.
pub const USER_ROLE: &str = "user";

/// Role used for command feedback that never reaches the remote model.
pub const KERNEL_ROLE: &str = "kernel";

/// Role used for startup notices rendered before any conversation exists.
pub const SYSTEM_ROLE: &str = "system";

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_ROLE, content)
    }

    pub fn kernel(content: impl Into<String>) -> Self {
        Self::new(KERNEL_ROLE, content)
    }

    pub fn is_kernel(&self) -> bool {
        self.role == KERNEL_ROLE
    }
}
