mod common;

use std::sync::Arc;
use std::time::Duration;

use colloquy::{
    Connectivity, ConnectivityMonitor, MessageRole, Session, SessionState, Transport, TurnOutcome,
};

use common::{client, failing_service, healthy_service, serve, slow_service, unreachable_url};

fn session_for(base: &str) -> Session {
    let transport: Arc<dyn Transport> = Arc::new(client(base));
    Session::new(transport)
}

#[tokio::test]
async fn conversation_keeps_one_thread() {
    let base = serve(healthy_service()).await;
    let session = session_for(&base);
    let thread_id = session.thread_id().to_string();

    let outcome = session.send("first").await.unwrap();
    let reply = outcome.message().unwrap();
    assert_eq!(reply.role, MessageRole::Assistant);
    assert_eq!(reply.content, format!("echo[{thread_id}]: first"));

    session.send("second").await.unwrap();
    let messages = session.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].content, "second");
    assert_eq!(messages[3].content, format!("echo[{thread_id}]: second"));
    assert_eq!(session.thread_id(), thread_id);
    assert_eq!(session.snapshot().state(), SessionState::Idle);
}

#[tokio::test]
async fn service_failure_is_acknowledged_in_transcript() {
    let base = serve(failing_service()).await;
    let session = session_for(&base);

    let outcome = session.send("hello").await.unwrap();
    match &outcome {
        TurnOutcome::Failed {
            error,
            acknowledgment,
        } => {
            assert_eq!(error.message(), "Service unavailable");
            assert_eq!(
                acknowledgment.content,
                "Sorry, I encountered an error: Service unavailable. Please try again."
            );
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.last_error.as_deref(), Some("Service unavailable"));
    assert_eq!(snapshot.state(), SessionState::Error);
    assert!(!snapshot.pending);

    session.dismiss_error();
    assert_eq!(session.last_error(), None);
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn unreachable_service_fails_the_turn() {
    let base = unreachable_url().await;
    let session = session_for(&base);

    let outcome = session.send("anyone there?").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert!(
        session
            .last_error()
            .unwrap()
            .starts_with("Connection error")
    );
    assert!(!session.is_pending());
}

#[tokio::test]
async fn clear_starts_over_on_same_thread() {
    let base = serve(healthy_service()).await;
    let session = session_for(&base);
    let thread_id = session.thread_id().to_string();

    session.send("hello").await.unwrap();
    session.clear();
    assert!(session.messages().is_empty());

    session.send("again").await.unwrap();
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, format!("echo[{thread_id}]: again"));
}

#[tokio::test]
async fn monitor_reports_live_service() {
    let base = serve(healthy_service()).await;
    let transport: Arc<dyn Transport> = Arc::new(client(&base));
    let monitor =
        ConnectivityMonitor::new(Arc::clone(&transport)).with_interval(Duration::from_secs(60));
    let session = Session::with_monitor(transport, monitor);
    assert_eq!(session.connectivity(), Connectivity::Unknown);

    let mut watcher = session.watch();
    session.activate();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), watcher.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.connectivity, Connectivity::Connected);
    assert_eq!(session.connectivity(), Connectivity::Connected);

    session.deactivate();
}

#[tokio::test]
async fn monitor_reports_failing_service() {
    let base = serve(failing_service()).await;
    let transport: Arc<dyn Transport> = Arc::new(client(&base));
    let monitor = ConnectivityMonitor::new(Arc::clone(&transport));
    let mut rx = monitor.subscribe();
    let _handle = monitor.start();

    let connectivity = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|c| *c != Connectivity::Unknown),
    )
    .await
    .unwrap()
    .map(|c| *c)
    .unwrap();
    assert_eq!(connectivity, Connectivity::Disconnected);
}

#[tokio::test]
async fn readiness_and_ask_bypass_the_transcript() {
    let base = serve(healthy_service()).await;
    let session = session_for(&base);

    let ready = session.check_readiness().await.unwrap();
    assert!(ready.is_ready());

    let answer = session.ask_once("quick question").await.unwrap();
    assert_eq!(answer.response, "asked: quick question");
    assert!(session.messages().is_empty());
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn abandoned_turn_keeps_running_and_is_discarded() {
    let base = serve(slow_service(Duration::from_millis(300))).await;
    let session = session_for(&base);

    let turn = tokio::spawn(session.submit("slow question").unwrap().complete());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.abandon());
    assert!(!session.is_pending());

    // The request still runs to completion; its reply is dropped.
    let outcome = tokio::time::timeout(Duration::from_secs(5), turn)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, TurnOutcome::Discarded));
    let messages = session.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(session.last_error(), None);

    let outcome = session.send("follow up").await.unwrap();
    assert_eq!(outcome.message().unwrap().content, "late: follow up");
    assert_eq!(session.messages().len(), 3);
}
