use std::time::Duration;
use tokio::time::Instant;
use crate::data::{Cause, Record, RestartPolicy};

/// Decide why a container stopped, given its record at the time of the
/// stop event. First match wins: a pending or recent restart, then the
/// exit code, then the uninformative fallback.
pub fn classify(record: &Record, now: Instant, window: Duration) -> Cause {
    if record.pending || within(record.last_stop_at, now, window) {
        return Cause::Restarting;
    }

    match record.exit_code {
        Some(0)            => Cause::StoppedGracefully,
        Some(n) if n > 0   => Cause::Crashed,
        _                  => Cause::Stopped,
    }
}

/// Whether the runtime's supervisor is expected to bring the container
/// back after this exit.
pub fn expects_restart(policy: RestartPolicy, exit_code: Option<i64>) -> bool {
    match policy {
        RestartPolicy::Always        => true,
        RestartPolicy::UnlessStopped => exit_code != Some(0),
        RestartPolicy::OnFailure     => exit_code != Some(0),
        RestartPolicy::None          => false,
    }
}

fn within(at: Option<Instant>, now: Instant, window: Duration) -> bool {
    match at {
        Some(at) => now.saturating_duration_since(at) < window,
        None     => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    fn stopped_with(exit_code: Option<i64>, pending: bool) -> (Record, Instant) {
        let stopped = Instant::now();
        let mut record = Record::new("w");
        record.exit_code    = exit_code;
        record.pending      = pending;
        record.last_stop_at = Some(stopped);
        (record, stopped + Duration::from_secs(6))
    }

    #[test]
    fn pending_restart_wins() {
        let (record, now) = stopped_with(Some(137), true);
        assert_eq!(classify(&record, now, WINDOW), Cause::Restarting);
    }

    #[test]
    fn recent_stop_is_restarting() {
        let (record, _) = stopped_with(Some(1), false);
        let stopped = record.last_stop_at.unwrap();
        let now = stopped + Duration::from_millis(4999);
        assert_eq!(classify(&record, now, WINDOW), Cause::Restarting);
        assert_eq!(classify(&record, stopped + WINDOW, WINDOW), Cause::Crashed);
    }

    #[test]
    fn graceful_exit() {
        let (record, now) = stopped_with(Some(0), false);
        assert_eq!(classify(&record, now, WINDOW), Cause::StoppedGracefully);
    }

    #[test]
    fn crash_exit() {
        let (record, now) = stopped_with(Some(137), false);
        assert_eq!(classify(&record, now, WINDOW), Cause::Crashed);
    }

    #[test]
    fn unknown_exit_falls_back() {
        let (record, now) = stopped_with(None, false);
        assert_eq!(classify(&record, now, WINDOW), Cause::Stopped);

        let (record, now) = stopped_with(Some(-1), false);
        assert_eq!(classify(&record, now, WINDOW), Cause::Stopped);
    }

    #[test]
    fn never_stopped_uses_exit_code() {
        let mut record = Record::new("w");
        record.exit_code = Some(2);
        assert_eq!(classify(&record, Instant::now(), WINDOW), Cause::Crashed);
    }

    #[test]
    fn deterministic() {
        let (a, now) = stopped_with(Some(3), false);
        let b = a.clone();
        assert_eq!(classify(&a, now, WINDOW), classify(&b, now, WINDOW));
        assert_eq!(classify(&a, now, WINDOW), classify(&a, now, WINDOW));
    }

    #[test]
    fn restart_expectations() {
        assert!(expects_restart(RestartPolicy::Always, Some(0)));
        assert!(expects_restart(RestartPolicy::Always, Some(137)));
        assert!(expects_restart(RestartPolicy::OnFailure, Some(1)));
        assert!(expects_restart(RestartPolicy::UnlessStopped, None));
        assert!(!expects_restart(RestartPolicy::UnlessStopped, Some(0)));
        assert!(!expects_restart(RestartPolicy::OnFailure, Some(0)));
        assert!(!expects_restart(RestartPolicy::None, Some(137)));
    }
}
