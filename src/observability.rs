use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("colloquy.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("colloquy.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("colloquy.client.request_duration_seconds");

pub(crate) static MONITOR_POLLS: Counter = Counter::new("colloquy.monitor.polls");
pub(crate) static MONITOR_DISCONNECTED: Counter = Counter::new("colloquy.monitor.disconnected");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("colloquy.session.submissions");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("colloquy.session.rejected");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("colloquy.session.failures");
pub(crate) static SESSION_STALE_RESULTS: Counter = Counter::new("colloquy.session.stale_results");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("colloquy.session.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&MONITOR_POLLS);
    collector.register_counter(&MONITOR_DISCONNECTED);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_FAILURES);
    collector.register_counter(&SESSION_STALE_RESULTS);
    collector.register_moments(&SESSION_TURN_DURATION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_with_collector() {
        register_biometrics(Collector::new());
    }
}
