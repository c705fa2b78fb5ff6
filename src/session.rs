//! Conversation session management.
//!
//! A [`Session`] owns the transcript, the thread identifier, and the
//! pending/error flags for one conversational view.  It drives the
//! [`Transport`] for chat traffic and owns a [`ConnectivityMonitor`] for the
//! reachability signal.
//!
//! Submission is split in two.  [`Session::submit`] performs the synchronous
//! half of the transition (guard, append the user message, mark pending) and
//! returns an [`InFlight`] request; awaiting [`InFlight::complete`] performs
//! the call and applies its result.  Every request is tagged with the session
//! incarnation it was issued under.  [`Session::clear`] and
//! [`Session::abandon`] advance the incarnation, so any result that arrives
//! afterwards is discarded instead of being appended to the new transcript.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::monitor::{ConnectivityMonitor, MonitorHandle};
use crate::observability::{
    SESSION_FAILURES, SESSION_REJECTED, SESSION_STALE_RESULTS, SESSION_SUBMISSIONS,
    SESSION_TURN_DURATION,
};
use crate::transport::Transport;
use crate::types::{ChatRequest, ChatResponse, Connectivity, HealthResponse, Message, MessageRole};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 7;
const THREAD_PREFIX: &str = "thread-";

/// Text of the assistant-side transcript entry recorded for a failed turn.
pub fn failure_acknowledgment(message: &str) -> String {
    format!("Sorry, I encountered an error: {message}. Please try again.")
}

/// Where the session is in its request lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for the next submission.
    Idle,
    /// A chat request is in flight.
    Sending,
    /// Ready for the next submission, with the last failure still displayed.
    Error,
}

/// Everything a presentation layer needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// The thread identifier sent with every chat request.
    pub thread_id: String,
    /// The transcript in insertion order.
    pub messages: Vec<Message>,
    /// True while a chat request is in flight.
    pub pending: bool,
    /// The message of the last failure, until dismissed or superseded.
    pub last_error: Option<String>,
    /// The monitor's latest reachability signal.
    pub connectivity: Connectivity,
}

impl SessionSnapshot {
    /// The lifecycle state this snapshot represents.
    pub fn state(&self) -> SessionState {
        if self.pending {
            SessionState::Sending
        } else if self.last_error.is_some() {
            SessionState::Error
        } else {
            SessionState::Idle
        }
    }
}

/// How an in-flight request ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The service replied; the reply was appended to the transcript.
    Replied(Message),
    /// The call failed; the error was recorded and an acknowledgment appended.
    Failed {
        /// The failure as reported by the transport.
        error: Error,
        /// The assistant-side transcript entry describing the failure.
        acknowledgment: Message,
    },
    /// The session was cleared or the request abandoned before the result
    /// arrived; nothing was recorded.
    Discarded,
}

impl TurnOutcome {
    /// The message this outcome appended, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            TurnOutcome::Replied(message) => Some(message),
            TurnOutcome::Failed { acknowledgment, .. } => Some(acknowledgment),
            TurnOutcome::Discarded => None,
        }
    }
}

struct Transcript {
    messages: Vec<Message>,
    pending: bool,
    last_error: Option<String>,
    incarnation: u64,
    issued_ids: HashSet<String>,
    last_timestamp: Option<OffsetDateTime>,
}

impl Transcript {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            pending: false,
            last_error: None,
            incarnation: 0,
            issued_ids: HashSet::new(),
            last_timestamp: None,
        }
    }

    fn append(&mut self, content: impl Into<String>, role: MessageRole) -> Message {
        let id = loop {
            let candidate = random_token();
            if self.issued_ids.insert(candidate.clone()) {
                break candidate;
            }
        };
        let timestamp = match self.last_timestamp {
            Some(last) => OffsetDateTime::now_utc().max(last),
            None => OffsetDateTime::now_utc(),
        };
        self.last_timestamp = Some(timestamp);
        let message = Message::new(id, content, role, timestamp);
        self.messages.push(message.clone());
        message
    }

    fn invalidate(&mut self) {
        self.pending = false;
        self.incarnation += 1;
    }
}

struct Shared {
    thread_id: String,
    transcript: Mutex<Transcript>,
    version: watch::Sender<u64>,
    connectivity: watch::Receiver<Connectivity>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|version| *version += 1);
    }

    fn snapshot(&self) -> SessionSnapshot {
        let transcript = self.lock();
        SessionSnapshot {
            thread_id: self.thread_id.clone(),
            messages: transcript.messages.clone(),
            pending: transcript.pending,
            last_error: transcript.last_error.clone(),
            connectivity: *self.connectivity.borrow(),
        }
    }

    fn finish(&self, incarnation: u64, result: Result<ChatResponse>) -> TurnOutcome {
        let outcome = {
            let mut transcript = self.lock();
            if transcript.incarnation != incarnation {
                SESSION_STALE_RESULTS.click();
                tracing::debug!(
                    incarnation,
                    current = transcript.incarnation,
                    "dropping result from a stale request"
                );
                return TurnOutcome::Discarded;
            }
            transcript.pending = false;
            match result {
                Ok(response) => {
                    let reply = transcript.append(response.response, MessageRole::Assistant);
                    TurnOutcome::Replied(reply)
                }
                Err(error) => {
                    SESSION_FAILURES.click();
                    tracing::warn!(
                        thread_id = %self.thread_id,
                        error = %error,
                        "chat request failed"
                    );
                    let text = error.message().to_string();
                    let acknowledgment =
                        transcript.append(failure_acknowledgment(&text), MessageRole::Assistant);
                    transcript.last_error = Some(text);
                    TurnOutcome::Failed {
                        error,
                        acknowledgment,
                    }
                }
            }
        };
        self.notify();
        outcome
    }

    fn release(&self, incarnation: u64) {
        let released = {
            let mut transcript = self.lock();
            if transcript.incarnation == incarnation && transcript.pending {
                transcript.invalidate();
                true
            } else {
                false
            }
        };
        if released {
            self.notify();
        }
    }
}

/// The conversation core for one conversational view.
///
/// The thread identifier is generated when the session is created and never
/// changes.  Dropping the session stops its connectivity monitor.
pub struct Session {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    monitor: ConnectivityMonitor,
    monitor_handle: Mutex<Option<MonitorHandle>>,
}

impl Session {
    /// Creates a session whose monitor polls the same transport on the
    /// default period.  The monitor is not started; see [`Session::activate`].
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let monitor = ConnectivityMonitor::new(Arc::clone(&transport));
        Self::with_monitor(transport, monitor)
    }

    /// Creates a session around an explicitly configured monitor.
    pub fn with_monitor(transport: Arc<dyn Transport>, monitor: ConnectivityMonitor) -> Self {
        let thread_id = format!("{THREAD_PREFIX}{}", random_token());
        let (version, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            thread_id,
            transcript: Mutex::new(Transcript::new()),
            version,
            connectivity: monitor.subscribe(),
        });
        tracing::debug!(thread_id = %shared.thread_id, "session created");
        Self {
            shared,
            transport,
            monitor,
            monitor_handle: Mutex::new(None),
        }
    }

    /// Starts connectivity monitoring on the current tokio runtime.
    ///
    /// Does nothing if the monitor is already running.
    pub fn activate(&self) {
        let mut handle = self
            .monitor_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if handle.as_ref().is_some_and(MonitorHandle::is_active) {
            return;
        }
        *handle = Some(self.monitor.start());
    }

    /// Stops connectivity monitoring.  The last observed value is retained.
    pub fn deactivate(&self) {
        let handle = self
            .monitor_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut handle) = handle {
            handle.stop();
        }
    }

    /// The thread identifier sent with every chat request.
    pub fn thread_id(&self) -> &str {
        &self.shared.thread_id
    }

    /// A consistent copy of the session's presentation-facing state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot()
    }

    /// The transcript in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.shared.lock().messages.clone()
    }

    /// True while a chat request is in flight.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().pending
    }

    /// The message of the last failure, if it has not been dismissed.
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }

    /// The monitor's latest reachability signal.
    pub fn connectivity(&self) -> Connectivity {
        *self.shared.connectivity.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch(&self) -> SessionWatcher {
        SessionWatcher {
            shared: Arc::downgrade(&self.shared),
            version: self.shared.version.subscribe(),
            connectivity: self.monitor.subscribe(),
        }
    }

    /// Begins a conversational turn.
    ///
    /// On success the user message has been appended, the last error cleared
    /// and the session is pending; complete the turn by awaiting
    /// [`InFlight::complete`].  Empty or whitespace-only text is rejected with
    /// a validation error and a submission while another is pending with a
    /// busy error.  Neither rejection changes any state.
    pub fn submit(&self, text: &str) -> Result<InFlight> {
        if text.trim().is_empty() {
            SESSION_REJECTED.click();
            return Err(Error::validation(
                "message is empty",
                Some("text".to_string()),
            ));
        }
        let incarnation = {
            let mut transcript = self.shared.lock();
            if transcript.pending {
                SESSION_REJECTED.click();
                return Err(Error::busy("a request is already in flight"));
            }
            transcript.append(text, MessageRole::User);
            transcript.pending = true;
            transcript.last_error = None;
            transcript.incarnation
        };
        SESSION_SUBMISSIONS.click();
        self.shared.notify();
        Ok(InFlight {
            shared: Arc::clone(&self.shared),
            transport: Arc::clone(&self.transport),
            request: ChatRequest::new(text).with_thread_id(self.shared.thread_id.clone()),
            incarnation,
            started: Instant::now(),
            done: false,
        })
    }

    /// Submits `text` and waits for the turn to complete.
    ///
    /// Rejected submissions fail before any request is made:
    ///
    /// ```
    /// # tokio_test::block_on(async {
    /// use std::sync::Arc;
    /// use colloquy::{AssistantClient, Session};
    ///
    /// let client = AssistantClient::new(Some("http://localhost:8000".to_string())).unwrap();
    /// let session = Session::new(Arc::new(client));
    /// let err = session.send("   ").await.unwrap_err();
    /// assert!(err.is_validation());
    /// assert!(session.messages().is_empty());
    /// # });
    /// ```
    pub async fn send(&self, text: &str) -> Result<TurnOutcome> {
        let in_flight = self.submit(text)?;
        Ok(in_flight.complete().await)
    }

    /// Clears the last error; the transcript is untouched.
    pub fn dismiss_error(&self) {
        let dismissed = self.shared.lock().last_error.take().is_some();
        if dismissed {
            self.shared.notify();
        }
    }

    /// Empties the transcript and clears the last error.
    ///
    /// The thread identifier and connectivity are retained.  A request still
    /// in flight is disowned; its result will be discarded.
    pub fn clear(&self) {
        {
            let mut transcript = self.shared.lock();
            transcript.messages.clear();
            transcript.last_error = None;
            transcript.invalidate();
        }
        self.shared.notify();
    }

    /// Stops waiting for the in-flight request without cancelling it.
    ///
    /// Returns false if nothing was pending.  The abandoned request's result
    /// will be discarded when it arrives.
    pub fn abandon(&self) -> bool {
        let abandoned = {
            let mut transcript = self.shared.lock();
            if transcript.pending {
                transcript.invalidate();
                true
            } else {
                false
            }
        };
        if abandoned {
            tracing::debug!(thread_id = %self.shared.thread_id, "in-flight request abandoned");
            self.shared.notify();
        }
        abandoned
    }

    /// Asks a one-shot question through the legacy `ask` operation.
    ///
    /// The transcript and flags are not touched; the caller decides what to
    /// do with the reply.
    pub async fn ask_once(&self, text: &str) -> Result<ChatResponse> {
        if text.trim().is_empty() {
            return Err(Error::validation(
                "message is empty",
                Some("text".to_string()),
            ));
        }
        self.transport.ask(text).await
    }

    /// Queries the service's readiness endpoint.
    pub async fn check_readiness(&self) -> Result<HealthResponse> {
        self.transport.readiness_check().await
    }
}

/// A chat request issued by [`Session::submit`].
///
/// Dropping it without completing releases the session as if the request
/// had been abandoned.
#[must_use = "the turn only completes when `complete` is awaited"]
pub struct InFlight {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    request: ChatRequest,
    incarnation: u64,
    started: Instant,
    done: bool,
}

impl InFlight {
    /// The request that will be sent.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Performs the chat call and applies its result to the session.
    pub async fn complete(mut self) -> TurnOutcome {
        let result = self.transport.chat(self.request.clone()).await;
        SESSION_TURN_DURATION.add(self.started.elapsed().as_secs_f64());
        self.done = true;
        self.shared.finish(self.incarnation, result)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            self.shared.release(self.incarnation);
        }
    }
}

/// Change notifications for a [`Session`].
pub struct SessionWatcher {
    shared: Weak<Shared>,
    version: watch::Receiver<u64>,
    connectivity: watch::Receiver<Connectivity>,
}

impl SessionWatcher {
    /// Waits for the next change and returns the resulting snapshot.
    ///
    /// Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        tokio::select! {
            changed = self.version.changed() => changed.ok()?,
            changed = self.connectivity.changed() => changed.ok()?,
        }
        self.version.borrow_and_update();
        self.connectivity.borrow_and_update();
        self.snapshot()
    }

    /// The current snapshot, or `None` once the session is gone.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.shared.upgrade().map(|shared| shared.snapshot())
    }
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
