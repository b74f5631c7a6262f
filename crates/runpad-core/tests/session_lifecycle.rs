//! Integration tests for the session run lifecycle.
//!
//! Drives the controller against a scripted in-memory backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use runpad_core::{
    Error, ExecutionBackend, ExecutionController, ExecutionRequest, ExecutionResponse, Language,
    RunOutcome, RunState, SessionEvent, SessionPatch, TerminalAction, TransportError,
};

// =============================================================================
// Test Helpers
// =============================================================================

type Reply = Result<ExecutionResponse, TransportError>;

enum Scripted {
    Now(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Backend that answers from a queue of scripted replies.
#[derive(Default)]
struct ScriptedBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<ExecutionRequest>>,
    replies: Mutex<VecDeque<Scripted>>,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(Scripted::Now(reply));
    }

    /// Queue a reply that is released through the returned sender.
    fn gate(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Scripted::Gated(rx));
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ExecutionBackend for ScriptedBackend {
    fn execute(&self, request: ExecutionRequest) -> BoxFuture<'_, Reply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let scripted = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match scripted {
                Some(Scripted::Now(reply)) => reply,
                Some(Scripted::Gated(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(TransportError::Other("gate dropped".into()))),
                None => Err(TransportError::Unreachable("no scripted reply".into())),
            }
        })
    }
}

fn ok(output: &str, error: &str) -> Reply {
    Ok(ExecutionResponse {
        output: output.to_string(),
        error: error.to_string(),
    })
}

fn controller(backend: &Arc<ScriptedBackend>) -> ExecutionController {
    ExecutionController::new(backend.clone())
}

fn expect_dispatched(outcome: RunOutcome) -> runpad_core::DispatchHandle {
    match outcome {
        RunOutcome::Dispatched(handle) => handle,
        other => panic!("expected dispatch, got {:?}", other),
    }
}

// =============================================================================
// Run lifecycle
// =============================================================================

#[tokio::test]
async fn test_run_without_input_completes() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("5\n", ""));
    let ctl = controller(&backend);
    let id = ctl.update_active(SessionPatch::code("print(2 + 3)")).await;

    let handle = expect_dispatched(ctl.run().await.unwrap());
    assert_eq!(handle.session_id(), id);
    handle.wait().await;

    let store = ctl.store();
    let store = store.read().await;
    let session = store.get(id).unwrap();
    assert_eq!(session.run_state, RunState::Completed);
    assert_eq!(session.output, "5\n");
    assert_eq!(session.error, "");
    assert!(session.execution_time_ms.is_some());
    assert_eq!(backend.calls(), 1);
    assert_eq!(backend.requests()[0].code, "print(2 + 3)");
    assert_eq!(backend.requests()[0].language, Language::Python);
}

#[tokio::test]
async fn test_input_is_collected_before_dispatch() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("hello\n", ""));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(input('Enter something: '))"))
        .await;

    match ctl.run().await.unwrap() {
        RunOutcome::AwaitingInput { prompt_text } => assert_eq!(prompt_text, "Enter something: "),
        other => panic!("expected to await input, got {:?}", other),
    }
    assert_eq!(backend.calls(), 0);

    let view = ctl.workspace_view().await.terminal;
    assert!(view.show_input_box);
    assert!(view.waiting_for_input);

    ctl.apply_terminal_action(TerminalAction::InputChanged("hello".into()))
        .await
        .unwrap();
    let handle = ctl
        .apply_terminal_action(TerminalAction::Submit)
        .await
        .unwrap()
        .expect("submit dispatches");
    handle.wait().await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(backend.requests()[0].input, "hello");

    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.run_state, RunState::Completed);
    assert_eq!(view.output, "hello\n");
    assert!(!view.show_input_box);
    assert_eq!(view.transcript.as_deref(), Some(">>> hello"));
}

#[tokio::test]
async fn test_awaiting_input_clears_previous_results_and_unminimizes() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("old\n", ""));
    let ctl = controller(&backend);
    let id = ctl.update_active(SessionPatch::code("print('old')")).await;
    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    ctl.update_active(SessionPatch::code("x = input()")).await;
    ctl.apply_terminal_action(TerminalAction::SetMinimized(true))
        .await
        .unwrap();
    assert!(matches!(
        ctl.run().await.unwrap(),
        RunOutcome::AwaitingInput { .. }
    ));

    let store = ctl.store();
    let store = store.read().await;
    let session = store.get(id).unwrap();
    assert_eq!(session.run_state, RunState::AwaitingInput);
    assert!(!session.minimized);
    assert!(session.output.is_empty());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_execution_error_keeps_partial_output() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("1\n", "ZeroDivisionError: division by zero"));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(1)\nprint(1/0)")).await;

    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.output, "1\n");
    assert_eq!(view.error, "ZeroDivisionError: division by zero");
    assert!(view.execution_time_ms.is_some());
}

#[tokio::test]
async fn test_transport_failure_leaves_timing_unset() {
    let backend = ScriptedBackend::new();
    backend.reply(Err(TransportError::Unreachable("connection refused".into())));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(1)")).await;

    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.run_state, RunState::Completed);
    assert_eq!(view.output, "");
    assert!(view.error.starts_with("Server error: "));
    assert!(view.error.contains("connection refused"));
    assert!(view.execution_time_ms.is_none());
}

#[tokio::test]
async fn test_rerun_after_completion() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("1\n", ""));
    backend.reply(ok("2\n", ""));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(1)")).await;

    expect_dispatched(ctl.run().await.unwrap()).wait().await;
    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    assert_eq!(backend.calls(), 2);
    assert_eq!(ctl.workspace_view().await.terminal.output, "2\n");
}

// =============================================================================
// Guards
// =============================================================================

#[tokio::test]
async fn test_no_overlapping_runs() {
    let backend = ScriptedBackend::new();
    let gate = backend.gate();
    let ctl = controller(&backend);
    let id = ctl.update_active(SessionPatch::code("print(1)")).await;

    let handle = expect_dispatched(ctl.run().await.unwrap());
    assert!(matches!(ctl.run().await, Err(Error::RunInProgress(busy)) if busy == id));

    // Let the dispatch task reach the backend; it then parks on the gate
    tokio::task::yield_now().await;
    assert_eq!(backend.calls(), 1);
    assert!(!handle.is_finished());
    assert!(matches!(ctl.run().await, Err(Error::RunInProgress(_))));

    gate.send(ok("1\n", "")).unwrap();
    handle.wait().await;
    assert!(ctl.run().await.is_ok());
}

#[tokio::test]
async fn test_submit_requires_awaiting_input() {
    let backend = ScriptedBackend::new();
    let ctl = controller(&backend);
    let id = ctl.store().read().await.active_id();

    assert!(matches!(
        ctl.submit_input().await,
        Err(Error::NotAwaitingInput(idle)) if idle == id
    ));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_browser_prompt_is_a_usage_error() {
    let backend = ScriptedBackend::new();
    let ctl = controller(&backend);
    let mut events = ctl.subscribe();
    let id = ctl
        .update_active(SessionPatch::language(Language::JavaScript))
        .await;
    ctl.update_active(SessionPatch::code("const n = prompt('n?');\nconsole.log(n);"))
        .await;

    let err = ctl.run().await.unwrap_err();
    assert!(err.is_usage());
    assert_eq!(backend.calls(), 0);
    assert_eq!(ctl.store().read().await.get(id).unwrap().run_state, RunState::Idle);

    let mut saw_usage = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::UsageError { session_id, message } = event {
            assert_eq!(session_id, id);
            assert!(message.contains("readline"));
            saw_usage = true;
        }
    }
    assert!(saw_usage);
}

// =============================================================================
// Clear
// =============================================================================

#[tokio::test]
async fn test_clear_returns_to_idle_or_input_pending() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("x\n", ""));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print('x')")).await;
    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    ctl.clear().await;
    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.run_state, RunState::Idle);
    assert_eq!(view.output, "");
    assert!(view.execution_time_ms.is_none());

    ctl.update_active(SessionPatch::code("input('again: ')")).await;
    ctl.update_active(SessionPatch::input("stale")).await;
    ctl.apply_terminal_action(TerminalAction::Clear).await.unwrap();
    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.run_state, RunState::AwaitingInput);
    assert!(view.show_input_box);
    assert_eq!(view.prompt_text, "again: ");
    assert_eq!(view.input, "");
}

#[tokio::test]
async fn test_clear_during_flight_keeps_cycle_open() {
    let backend = ScriptedBackend::new();
    let gate = backend.gate();
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(1)")).await;

    let handle = expect_dispatched(ctl.run().await.unwrap());
    ctl.clear().await;
    assert_eq!(
        ctl.workspace_view().await.terminal.run_state,
        RunState::Submitting
    );

    gate.send(ok("1\n", "")).unwrap();
    handle.wait().await;
    let view = ctl.workspace_view().await.terminal;
    assert_eq!(view.run_state, RunState::Completed);
    assert_eq!(view.output, "1\n");
}

// =============================================================================
// Session isolation
// =============================================================================

#[tokio::test]
async fn test_response_lands_on_issuing_session() {
    let backend = ScriptedBackend::new();
    let gate = backend.gate();
    let ctl = controller(&backend);
    let a = ctl.update_active(SessionPatch::code("print(5)")).await;

    let handle = expect_dispatched(ctl.run().await.unwrap());

    let b = ctl.create_session().await;
    ctl.update_active(SessionPatch::code("print('b')")).await;
    assert_eq!(ctl.store().read().await.active_id(), b);

    gate.send(ok("5\n", "")).unwrap();
    handle.wait().await;

    let store = ctl.store();
    let store = store.read().await;
    let session_a = store.get(a).unwrap();
    let session_b = store.get(b).unwrap();
    assert_eq!(session_a.output, "5\n");
    assert_eq!(session_a.run_state, RunState::Completed);
    assert_eq!(session_b.output, "");
    assert_eq!(session_b.run_state, RunState::Idle);
    assert_eq!(session_b.code, "print('b')");
}

#[tokio::test]
async fn test_sessions_run_concurrently() {
    let backend = ScriptedBackend::new();
    let gate_a = backend.gate();
    let gate_b = backend.gate();
    let ctl = controller(&backend);

    let a = ctl.update_active(SessionPatch::code("print('a')")).await;
    let handle_a = expect_dispatched(ctl.run().await.unwrap());
    let b = ctl.create_session().await;
    ctl.update_active(SessionPatch::code("print('b')")).await;
    let handle_b = expect_dispatched(ctl.run().await.unwrap());

    gate_b.send(ok("b\n", "")).unwrap();
    handle_b.wait().await;
    gate_a.send(ok("a\n", "")).unwrap();
    handle_a.wait().await;

    let store = ctl.store();
    let store = store.read().await;
    assert_eq!(store.get(a).unwrap().output, "a\n");
    assert_eq!(store.get(b).unwrap().output, "b\n");
}

#[tokio::test]
async fn test_edit_during_flight_does_not_change_request() {
    let backend = ScriptedBackend::new();
    let gate = backend.gate();
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print('first')")).await;

    let handle = expect_dispatched(ctl.run().await.unwrap());
    ctl.update_active(SessionPatch::code("print('second')")).await;

    gate.send(ok("first\n", "")).unwrap();
    handle.wait().await;

    assert_eq!(backend.requests()[0].code, "print('first')");
    let view = ctl.workspace_view().await;
    assert_eq!(view.editor.code, "print('second')");
    assert_eq!(view.terminal.output, "first\n");
}

#[tokio::test]
async fn test_result_for_closed_session_is_dropped() {
    let backend = ScriptedBackend::new();
    let gate = backend.gate();
    let ctl = controller(&backend);
    let a = ctl.update_active(SessionPatch::code("print(1)")).await;
    let handle = expect_dispatched(ctl.run().await.unwrap());

    let b = ctl.create_session().await;
    assert!(ctl.close_session(a).await);

    gate.send(ok("1\n", "")).unwrap();
    handle.wait().await;

    let store = ctl.store();
    let store = store.read().await;
    assert_eq!(store.len(), 1);
    assert!(store.get(a).is_none());
    assert_eq!(store.get(b).unwrap().output, "");
}

#[tokio::test]
async fn test_completion_is_announced() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("ok\n", ""));
    let ctl = controller(&backend);
    let id = ctl.update_active(SessionPatch::code("print('ok')")).await;
    let mut events = ctl.subscribe();

    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    let mut changed = 0;
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::Changed(id) {
            changed += 1;
        }
    }
    // Once for Submitting, once for Completed.
    assert_eq!(changed, 2);
}

#[tokio::test]
async fn test_language_switch_clears_results() {
    let backend = ScriptedBackend::new();
    backend.reply(ok("1\n", ""));
    let ctl = controller(&backend);
    ctl.update_active(SessionPatch::code("print(1)")).await;
    expect_dispatched(ctl.run().await.unwrap()).wait().await;

    ctl.update_active(SessionPatch::language(Language::JavaScript))
        .await;

    let view = ctl.workspace_view().await;
    assert_eq!(view.editor.language, Language::JavaScript);
    assert_eq!(view.editor.code, Language::JavaScript.template());
    assert_eq!(view.terminal.output, "");
    assert_eq!(view.terminal.error, "");
    assert!(view.terminal.execution_time_ms.is_none());
}
