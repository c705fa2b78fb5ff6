//! Periodic connectivity monitoring.
//!
//! A [`ConnectivityMonitor`] owns the tri-state [`Connectivity`] signal.  Once
//! started it polls the health endpoint immediately and then on a fixed
//! period until its [`MonitorHandle`] is stopped or dropped.  Health failures
//! never escape the monitor; they collapse to [`Connectivity::Disconnected`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::observability::{MONITOR_DISCONNECTED, MONITOR_POLLS};
use crate::transport::Transport;
use crate::types::Connectivity;

/// Period between health checks unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polls the assistant service's health endpoint.
pub struct ConnectivityMonitor {
    transport: Arc<dyn Transport>,
    interval: Duration,
    state: Arc<watch::Sender<Connectivity>>,
}

impl ConnectivityMonitor {
    /// Creates an inactive monitor polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(Connectivity::Unknown);
        Self {
            transport,
            interval: DEFAULT_POLL_INTERVAL,
            state: Arc::new(state),
        }
    }

    /// Sets the poll period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// The poll period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The most recently observed connectivity.
    pub fn connectivity(&self) -> Connectivity {
        *self.state.borrow()
    }

    /// Subscribe to connectivity changes.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }

    /// Starts polling on the current tokio runtime.
    ///
    /// The first health check is issued immediately.  Polling continues until
    /// the returned handle is stopped or dropped.
    pub fn start(&self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let gate = Arc::new(Mutex::new(true));
        let task = tokio::spawn(poll(
            Arc::clone(&self.transport),
            self.interval,
            Arc::clone(&self.state),
            Arc::clone(&gate),
            cancel.clone(),
        ));
        tracing::debug!(
            interval_secs = self.interval.as_secs_f64(),
            "connectivity monitor started"
        );
        MonitorHandle {
            cancel,
            gate,
            task: Some(task),
        }
    }
}

/// Handle to a running monitor.
///
/// Stopping the handle guarantees that no connectivity change is published
/// afterwards, even if a health check was in flight at the time.
pub struct MonitorHandle {
    cancel: CancellationToken,
    gate: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// True until [`MonitorHandle::stop`] is called.
    pub fn is_active(&self) -> bool {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stops polling.  Idempotent.
    pub fn stop(&mut self) {
        {
            let mut active = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            if !*active {
                return;
            }
            *active = false;
        }
        self.cancel.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
        tracing::debug!("connectivity monitor stopped");
    }

    /// Stops polling and waits for the polling task to wind down.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll(
    transport: Arc<dyn Transport>,
    interval: Duration,
    state: Arc<watch::Sender<Connectivity>>,
    gate: Arc<Mutex<bool>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        MONITOR_POLLS.click();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = transport.health_check() => result,
        };
        let connectivity = Connectivity::from_health_check(&result);
        match &result {
            Ok(health) => tracing::debug!(status = %health.status, %connectivity, "health check"),
            Err(err) => tracing::debug!(error = %err, "health check failed"),
        }
        if connectivity == Connectivity::Disconnected {
            MONITOR_DISCONNECTED.click();
        }
        if !publish(&gate, &state, connectivity) {
            break;
        }
    }
}

/// Publish under the gate so a concurrent stop either precedes or follows
/// the whole publication.  Returns false once the gate has closed.
fn publish(
    gate: &Mutex<bool>,
    state: &watch::Sender<Connectivity>,
    connectivity: Connectivity,
) -> bool {
    let active = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if !*active {
        return false;
    }
    state.send_if_modified(|current| {
        if *current == connectivity {
            false
        } else {
            *current = connectivity;
            true
        }
    });
    true
}
