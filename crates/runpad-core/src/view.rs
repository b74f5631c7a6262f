//! View models for the editor and terminal surfaces.
//!
//! These are plain snapshots of session state shaped the way the
//! presentation layer consumes them. User interactions flow back as
//! [`EditorAction`] and [`TerminalAction`] values handled by the
//! [`crate::controller::ExecutionController`].

use serde::{Deserialize, Serialize};

use crate::detect;
use crate::language::Language;
use crate::session::{DEFAULT_SESSION_NAME, RunState, Session, SessionId, Theme};
use crate::store::SessionStore;

/// Prefix echoed before each submitted input line.
const TRANSCRIPT_PREFIX: &str = ">>> ";

/// Props for the code editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorView {
    pub session_id: SessionId,
    pub code: String,
    pub language: Language,
    pub theme: Theme,
    /// Theme name understood by the editor widget.
    pub editor_theme: String,
}

impl EditorView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id,
            code: session.code.clone(),
            language: session.language,
            theme: session.theme,
            editor_theme: session.theme.editor_theme().to_string(),
        }
    }
}

/// Edit callback of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Replace the code of the active session.
    Edit(String),
}

/// Props for the terminal panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalView {
    pub session_id: SessionId,
    pub output: String,
    pub error: String,
    pub show_input_box: bool,
    pub prompt_text: String,
    pub waiting_for_input: bool,
    pub execution_time_ms: Option<u64>,
    pub minimized: bool,
    /// Current input buffer (bound to the input box).
    pub input: String,
    /// Echo of the submitted input after a run, one `>>> ` per line.
    pub transcript: Option<String>,
    pub run_state: RunState,
}

impl TerminalView {
    pub fn from_session(session: &Session) -> Self {
        let requirement = detect::detect(&session.code, session.language);
        let waiting = session.run_state == RunState::AwaitingInput;

        let transcript = match session.run_state {
            RunState::Submitting | RunState::Completed if !session.input_buffer.is_empty() => {
                let separator = format!("\n{}", TRANSCRIPT_PREFIX);
                let lines: Vec<&str> = session.input_buffer.split('\n').collect();
                Some(format!("{}{}", TRANSCRIPT_PREFIX, lines.join(separator.as_str())))
            }
            _ => None,
        };

        Self {
            session_id: session.id,
            output: session.output.clone(),
            error: session.error.clone(),
            show_input_box: waiting,
            prompt_text: requirement.prompt_text,
            waiting_for_input: waiting,
            execution_time_ms: session.execution_time_ms,
            minimized: session.minimized,
            input: session.input_buffer.clone(),
            transcript,
            run_state: session.run_state,
        }
    }

    /// Footer label shown once a run completed.
    pub fn execution_time_label(&self) -> Option<String> {
        self.execution_time_ms
            .map(|ms| format!("Execution time: {} ms", ms))
    }
}

/// Callbacks of the terminal panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalAction {
    /// The input box text changed.
    InputChanged(String),
    /// The user submitted the input box.
    Submit,
    /// Clear the terminal.
    Clear,
    /// Minimize or restore the panel.
    SetMinimized(bool),
}

/// One entry of the tab bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabView {
    pub session_id: SessionId,
    pub label: String,
    pub language: Language,
    pub active: bool,
    pub run_state: RunState,
}

/// Everything the presentation layer needs to draw the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceView {
    pub tabs: Vec<TabView>,
    pub active: SessionId,
    pub editor: EditorView,
    pub terminal: TerminalView,
}

impl WorkspaceView {
    pub fn from_store(store: &SessionStore) -> Self {
        let active_id = store.active_id();
        let tabs = store
            .iter()
            .enumerate()
            .map(|(index, session)| TabView {
                session_id: session.id,
                label: tab_label(session, index),
                language: session.language,
                active: session.id == active_id,
                run_state: session.run_state,
            })
            .collect();

        let active = store.active();
        Self {
            tabs,
            active: active_id,
            editor: EditorView::from_session(active),
            terminal: TerminalView::from_session(active),
        }
    }
}

/// Label for a tab: its name, or `Untitled N` when the name is blank.
fn tab_label(session: &Session, index: usize) -> String {
    if session.name.trim().is_empty() {
        format!("{} {}", DEFAULT_SESSION_NAME, index + 1)
    } else {
        session.name.clone()
    }
}
