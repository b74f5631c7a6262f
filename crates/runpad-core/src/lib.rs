//! Runpad Core - Execution session state machine.
//!
//! This crate provides the model behind the snippet runner:
//! - Supported languages and their starting templates
//! - Heuristic detection of code that blocks on standard input
//! - Sessions (tabs) and the store that keeps them ordered
//! - The execution controller driving runs against a remote backend
//! - View models consumed by the editor and terminal surfaces

pub mod backend;
pub mod controller;
pub mod detect;
pub mod error;
pub mod language;
pub mod session;
pub mod store;
pub mod view;

pub use backend::{ExecutionBackend, ExecutionRequest, ExecutionResponse, TransportError};
pub use controller::{DispatchHandle, ExecutionController, RunOutcome, SessionEvent, StoreHandle};
pub use detect::{InputRequirement, detect, detect_by_id};
pub use error::{Error, Result};
pub use language::Language;
pub use session::{RunState, Session, SessionId, SessionPatch, Theme};
pub use store::SessionStore;
pub use view::{EditorAction, EditorView, TabView, TerminalAction, TerminalView, WorkspaceView};
