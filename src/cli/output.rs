//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::NotaryError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &NotaryError) -> String {
    match e {
        NotaryError::Startup(_) => format!(
            "{}\nCheck that factomd is reachable and the chain has been created.",
            e
        ),
        NotaryError::Config(_) => format!("{}\nSee `dirnotary config` for the effective settings.", e),
        _ => e.to_string(),
    }
}

/// What a command printed and how the process should exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(text: String) -> Self {
        Self { text, exit_code: 0 }
    }

    pub fn failure(text: String) -> Self {
        Self { text, exit_code: 1 }
    }
}
