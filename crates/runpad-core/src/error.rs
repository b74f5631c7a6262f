//! Error types for runpad-core.

use thiserror::Error;

use crate::session::SessionId;

/// Result type for runpad-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Hint shown when JavaScript code calls the browser-only `prompt()`.
const READLINE_HINT: &str = "const readline = require('readline');\n\
const rl = readline.createInterface({ input: process.stdin, output: process.stdout });\n\
rl.question('Enter something: ', answer => { console.log(answer); rl.close(); });";

/// Errors that can occur while driving a session.
#[derive(Debug, Error)]
pub enum Error {
    /// JavaScript code uses `prompt()`, which the execution runtime lacks.
    #[error(
        "prompt() is not available in Node.js. Use readline for input. Example:\n\n{}",
        READLINE_HINT
    )]
    PromptUnavailable,

    /// A run is already in flight for this session.
    #[error("session {0} is already running")]
    RunInProgress(SessionId),

    /// Input was submitted while the session was not waiting for it.
    #[error("session {0} is not waiting for input")]
    NotAwaitingInput(SessionId),

    /// Unknown language identifier.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl Error {
    /// Whether this error is a client-side usage error.
    ///
    /// Usage errors are detected locally and never reach the backend.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::PromptUnavailable)
    }
}
