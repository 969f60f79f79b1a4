use foundation::time::Time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("timer is already running; stop it before starting again")]
    AlreadyRunning,
}

/// A single repeating callback slot, modelled on `setInterval`.
///
/// The host polls with its current time; the timer reports whether the
/// interval elapsed. Missed intervals are skipped rather than replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingTimer {
    interval_s: f64,
    next_due: Option<Time>,
}

impl RepeatingTimer {
    pub fn new(interval_s: f64) -> Self {
        Self {
            interval_s: interval_s.max(f64::EPSILON),
            next_due: None,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(interval_ms as f64 / 1000.0)
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Starts the timer; the first fire is one interval after `now`.
    pub fn start(&mut self, now: Time) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        self.next_due = Some(now.after_secs(self.interval_s));
        Ok(())
    }

    /// Returns `true` if the timer was running.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Returns `true` when the interval elapsed since the last fire.
    pub fn poll(&mut self, now: Time) -> bool {
        let Some(mut due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        while due <= now {
            due = due.after_secs(self.interval_s);
        }
        self.next_due = Some(due);
        true
    }
}
