//! WebSocket protocol messages for Runpad server.
//!
//! Defines the message types exchanged between client and server.

use runpad_core::{Language, SessionId, TerminalView, WorkspaceView};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request current workspace state.
    GetState,

    /// Open a new tab.
    NewSession,

    /// Close a tab.
    CloseSession {
        /// Tab to close.
        session_id: SessionId,
    },

    /// Switch to a tab.
    SelectSession {
        /// Tab to activate.
        session_id: SessionId,
    },

    /// Rename the active tab.
    RenameSession {
        /// New display name.
        name: String,
    },

    /// Replace the active tab's code.
    EditCode {
        /// New source code.
        code: String,
    },

    /// Change the active tab's language.
    SetLanguage {
        /// New language.
        language: Language,
    },

    /// Flip between light and dark theme.
    ToggleTheme,

    /// Update the input box text.
    SetInput {
        /// Standard input to send.
        input: String,
    },

    /// Minimize or restore the terminal panel.
    SetMinimized {
        /// Whether the panel is minimized.
        minimized: bool,
    },

    /// Run the active tab.
    Run,

    /// Submit the input box and run.
    SubmitInput,

    /// Clear the terminal.
    Clear,

    /// Save the active tab's code.
    SaveSnippet,

    /// Replace the active tab's code with the saved code.
    LoadSnippet,

    /// Write the active tab's code to a file.
    ExportSnippet {
        /// File name; defaults to `mycode.<ext>`.
        #[serde(default)]
        filename: Option<String>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full workspace state (sent on connection and on tab changes).
    WorkspaceState {
        /// Tabs, editor and terminal props, inlined into the message.
        #[serde(flatten)]
        workspace: WorkspaceView,
    },

    /// Terminal state of a background tab changed.
    SessionUpdated {
        /// Terminal props of that tab.
        terminal: TerminalView,
    },

    /// Run rejected before reaching the execution service.
    UsageError {
        /// Tab that attempted the run.
        session_id: SessionId,
        /// Explanation shown to the user.
        message: String,
    },

    /// Code saved.
    SnippetSaved,

    /// Code exported.
    SnippetExported {
        /// Path of the written file.
        path: String,
    },

    /// Generic error message.
    Error {
        /// Error description.
        message: String,
    },
}
