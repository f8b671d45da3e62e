use thiserror::Error;
use uuid::Uuid;

/// Application-level error type covering the engine's explicit failure
/// paths. Narrator failures never appear here — every narrator call site
/// recovers with its deterministic fallback template instead of erroring.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("role '{role}' not found in market catalog; available roles: {}", .available_roles.join(", "))]
    RoleNotFound {
        role: String,
        available_roles: Vec<String>,
    },

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("invalid step number {step}: roadmap has {total_steps} steps")]
    InvalidStep { step: u32, total_steps: u32 },

    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset parse error: {0}")]
    Json(#[from] serde_json::Error),
}
