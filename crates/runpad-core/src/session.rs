//! Sessions (tabs).
//!
//! A session holds one tab's editing and execution state. Sessions never
//! share data; every mutation goes through the [`crate::store::SessionStore`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;

/// Default display name for new sessions.
pub const DEFAULT_SESSION_NAME: &str = "Untitled";

/// Stable identifier for a session, independent of its tab position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0.simple())
    }
}

/// Execution lifecycle phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run has started, or the terminal was cleared.
    #[default]
    Idle,
    /// Waiting for the user to submit standard input.
    AwaitingInput,
    /// A request is in flight.
    Submitting,
    /// The last request finished (successfully or not).
    Completed,
}

impl RunState {
    /// Whether a new run may start from this state.
    pub fn can_run(&self) -> bool {
        !matches!(self, Self::Submitting)
    }
}

/// Display theme of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Theme name understood by the code editor.
    pub fn editor_theme(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "vs-dark",
        }
    }
}

/// One tab's full state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub language: Language,
    pub code: String,
    /// Pending or most recent standard input.
    pub input_buffer: String,
    pub output: String,
    pub error: String,
    /// Duration of the last completed request, if one completed.
    pub execution_time_ms: Option<u64>,
    pub run_state: RunState,
    pub minimized: bool,
    pub theme: Theme,
}

impl Session {
    /// Create a session with the default language template.
    pub fn new() -> Self {
        let language = Language::default();
        Self {
            id: SessionId::new(),
            name: DEFAULT_SESSION_NAME.to_string(),
            language,
            code: language.template().to_string(),
            input_buffer: String::new(),
            output: String::new(),
            error: String::new(),
            execution_time_ms: None,
            run_state: RunState::Idle,
            minimized: false,
            theme: Theme::default(),
        }
    }

    /// Clear the results of the last run.
    pub fn clear_results(&mut self) {
        self.output.clear();
        self.error.clear();
        self.execution_time_ms = None;
    }

    /// Switch language, replacing the code with the language template.
    ///
    /// Prior results belong to the old code and are discarded.
    pub fn switch_language(&mut self, language: Language) {
        self.language = language;
        self.code = language.template().to_string();
        self.clear_results();
        if self.run_state == RunState::AwaitingInput {
            self.run_state = RunState::Idle;
        }
    }

    /// Merge a partial change into this session.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(input) = patch.input_buffer {
            self.input_buffer = input;
        }
        if let Some(minimized) = patch.minimized {
            self.minimized = minimized;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        // Last, so the template wins over any code in the same patch.
        if let Some(language) = patch.language {
            self.switch_language(language);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial update merged into the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_buffer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl SessionPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }

    pub fn input(input: impl Into<String>) -> Self {
        Self {
            input_buffer: Some(input.into()),
            ..Self::default()
        }
    }

    pub fn minimized(minimized: bool) -> Self {
        Self {
            minimized: Some(minimized),
            ..Self::default()
        }
    }

    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }
}
