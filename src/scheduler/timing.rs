use std::time::Duration;

/// Time left to sleep after a tick that took `elapsed`, never negative
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
