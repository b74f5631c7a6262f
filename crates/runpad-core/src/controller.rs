//! Run lifecycle of sessions.
//!
//! The controller owns the shared [`SessionStore`] and drives each session
//! through `Idle -> AwaitingInput -> Submitting -> Completed`. Requests to
//! the execution service run in their own task and are applied to the
//! session that issued them, whichever session is active by then.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use crate::backend::{ExecutionBackend, ExecutionRequest, ExecutionResponse, TransportError};
use crate::detect;
use crate::error::{Error, Result};
use crate::session::{RunState, Session, SessionId, SessionPatch};
use crate::store::SessionStore;
use crate::view::{EditorAction, EditorView, TerminalAction, TerminalView, WorkspaceView};

/// Thread-safe store handle.
pub type StoreHandle = Arc<RwLock<SessionStore>>;

/// Capacity for the event channel.
/// Slow subscribers lose older events and should re-read the store.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Prefix of the error shown when the execution service is unreachable.
const TRANSPORT_ERROR_PREFIX: &str = "Server error: ";

/// Notification that session state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Fields of this session changed.
    Changed(SessionId),
    /// Tabs were created, closed or switched.
    TabsChanged,
    /// A run was rejected before reaching the backend.
    UsageError {
        session_id: SessionId,
        message: String,
    },
}

/// What `run` did.
#[derive(Debug)]
pub enum RunOutcome {
    /// The code needs input; the session waits for `submit_input`.
    AwaitingInput { prompt_text: String },
    /// A request was sent.
    Dispatched(DispatchHandle),
}

/// An in-flight request.
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct DispatchHandle {
    session_id: SessionId,
    task: JoinHandle<()>,
}

impl DispatchHandle {
    /// Session that issued the request.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the response has been applied to the session.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Dispatch task for {} failed: {}", self.session_id, e);
        }
    }
}

/// Drives sessions through their run lifecycle.
#[derive(Clone)]
pub struct ExecutionController {
    store: StoreHandle,
    backend: Arc<dyn ExecutionBackend>,
    tx: broadcast::Sender<SessionEvent>,
}

impl ExecutionController {
    /// Create a controller with a fresh single-session store.
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self::with_store(Arc::new(RwLock::new(SessionStore::new())), backend)
    }

    /// Create a controller over an existing store.
    pub fn with_store(store: StoreHandle, backend: Arc<dyn ExecutionBackend>) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, backend, tx }
    }

    /// Shared store handle.
    pub fn store(&self) -> StoreHandle {
        self.store.clone()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Send an event, ignoring the case where nobody listens.
    fn notify(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Open a new tab and make it active.
    pub async fn create_session(&self) -> SessionId {
        let id = self.store.write().await.create_session();
        self.notify(SessionEvent::TabsChanged);
        id
    }

    /// Close a tab. In-flight requests of the closed tab are discarded on arrival.
    pub async fn close_session(&self, id: SessionId) -> bool {
        let closed = self.store.write().await.close_session(id);
        if closed {
            self.notify(SessionEvent::TabsChanged);
        }
        closed
    }

    /// Switch tabs. In-flight requests keep running.
    pub async fn set_active(&self, id: SessionId) -> bool {
        let switched = self.store.write().await.set_active(id);
        if switched {
            self.notify(SessionEvent::TabsChanged);
        }
        switched
    }

    /// Merge changes into the active session.
    pub async fn update_active(&self, patch: SessionPatch) -> SessionId {
        let id = {
            let mut store = self.store.write().await;
            store.update_active(patch);
            store.active_id()
        };
        self.notify(SessionEvent::Changed(id));
        id
    }

    /// Run the active session.
    ///
    /// Code that needs input moves the session to `AwaitingInput` without
    /// contacting the backend. Anything else is dispatched immediately with
    /// the current input buffer.
    pub async fn run(&self) -> Result<RunOutcome> {
        let mut store = self.store.write().await;
        let session = store.active_mut();
        let id = session.id;

        if !session.run_state.can_run() {
            return Err(Error::RunInProgress(id));
        }
        if detect::uses_browser_prompt(&session.code, session.language) {
            drop(store);
            return Err(self.reject(id, Error::PromptUnavailable));
        }

        let requirement = detect::detect(&session.code, session.language);
        let outcome = if requirement.needs_input {
            session.run_state = RunState::AwaitingInput;
            session.output.clear();
            session.error.clear();
            session.minimized = false;
            tracing::debug!("{} awaiting input", id);
            RunOutcome::AwaitingInput {
                prompt_text: requirement.prompt_text,
            }
        } else {
            RunOutcome::Dispatched(self.dispatch(session))
        };
        drop(store);

        self.notify(SessionEvent::Changed(id));
        Ok(outcome)
    }

    /// Submit the input buffer of the active session and dispatch.
    pub async fn submit_input(&self) -> Result<DispatchHandle> {
        let mut store = self.store.write().await;
        let session = store.active_mut();
        let id = session.id;

        if session.run_state != RunState::AwaitingInput {
            return Err(Error::NotAwaitingInput(id));
        }
        if detect::uses_browser_prompt(&session.code, session.language) {
            drop(store);
            return Err(self.reject(id, Error::PromptUnavailable));
        }

        let handle = self.dispatch(session);
        drop(store);

        self.notify(SessionEvent::Changed(id));
        Ok(handle)
    }

    /// Reset the terminal of the active session.
    ///
    /// The session goes back to waiting for input if its code needs some,
    /// otherwise to `Idle`. A session with a request in flight keeps its
    /// state so the response still closes the cycle.
    pub async fn clear(&self) -> SessionId {
        let id = {
            let mut store = self.store.write().await;
            let session = store.active_mut();
            session.input_buffer.clear();
            session.clear_results();
            if session.run_state != RunState::Submitting {
                session.run_state = if detect::detect(&session.code, session.language).needs_input {
                    RunState::AwaitingInput
                } else {
                    RunState::Idle
                };
            }
            session.id
        };
        self.notify(SessionEvent::Changed(id));
        id
    }

    /// Handle an editor callback.
    pub async fn apply_editor_action(&self, action: EditorAction) -> SessionId {
        match action {
            EditorAction::Edit(code) => self.update_active(SessionPatch::code(code)).await,
        }
    }

    /// Handle a terminal callback.
    ///
    /// Returns the dispatch handle when the action submitted input.
    pub async fn apply_terminal_action(
        &self,
        action: TerminalAction,
    ) -> Result<Option<DispatchHandle>> {
        match action {
            TerminalAction::InputChanged(input) => {
                self.update_active(SessionPatch::input(input)).await;
                Ok(None)
            }
            TerminalAction::Submit => self.submit_input().await.map(Some),
            TerminalAction::Clear => {
                self.clear().await;
                Ok(None)
            }
            TerminalAction::SetMinimized(minimized) => {
                self.update_active(SessionPatch::minimized(minimized)).await;
                Ok(None)
            }
        }
    }

    /// Snapshot of the whole workspace.
    pub async fn workspace_view(&self) -> WorkspaceView {
        WorkspaceView::from_store(&*self.store.read().await)
    }

    /// Terminal props of a session, if it still exists.
    pub async fn terminal_view(&self, id: SessionId) -> Option<TerminalView> {
        self.store.read().await.get(id).map(TerminalView::from_session)
    }

    /// Editor props of a session, if it still exists.
    pub async fn editor_view(&self, id: SessionId) -> Option<EditorView> {
        self.store.read().await.get(id).map(EditorView::from_session)
    }

    /// Broadcast a usage error and hand it back to the caller.
    fn reject(&self, session_id: SessionId, error: Error) -> Error {
        tracing::debug!("{} rejected: {}", session_id, error);
        self.notify(SessionEvent::UsageError {
            session_id,
            message: error.to_string(),
        });
        error
    }

    /// Move a session to `Submitting` and send its request.
    ///
    /// The request is a snapshot: later edits do not affect it. The result
    /// is routed back by session id.
    fn dispatch(&self, session: &mut Session) -> DispatchHandle {
        session.run_state = RunState::Submitting;
        session.output.clear();
        session.error.clear();
        session.minimized = false;

        let session_id = session.id;
        let request = ExecutionRequest {
            code: session.code.clone(),
            language: session.language,
            input: session.input_buffer.clone(),
        };
        tracing::debug!("{} dispatching {} request", session_id, request.language);

        let store = self.store.clone();
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let started = Instant::now();

        let task = tokio::spawn(async move {
            let result = backend.execute(request).await;
            let elapsed = started.elapsed();

            {
                let mut store = store.write().await;
                let Some(session) = store.get_mut(session_id) else {
                    tracing::debug!("{} closed before its response arrived, dropping result", session_id);
                    return;
                };
                apply_result(session, result, elapsed);
            }
            let _ = tx.send(SessionEvent::Changed(session_id));
        });

        DispatchHandle { session_id, task }
    }
}

/// Record a finished request on the session that sent it.
fn apply_result(
    session: &mut Session,
    result: std::result::Result<ExecutionResponse, TransportError>,
    elapsed: Duration,
) {
    match result {
        Ok(response) => {
            session.output = response.output;
            session.error = response.error;
            session.execution_time_ms = Some(elapsed.as_millis() as u64);
            tracing::debug!("{} completed in {} ms", session.id, elapsed.as_millis());
        }
        Err(e) => {
            session.output.clear();
            session.error = format!("{}{}", TRANSPORT_ERROR_PREFIX, e);
            session.execution_time_ms = None;
            tracing::warn!("{} transport failure: {}", session.id, e);
        }
    }
    session.run_state = RunState::Completed;
}
