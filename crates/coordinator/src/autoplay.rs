use foundation::time::Time;
use runtime::{RepeatingTimer, TimerError};

/// The two autoplay buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AutoplayKind {
    /// Steps the focus year through the dataset years.
    Year,
    /// Cycles the choropleth metric.
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AutoplayError {
    #[error("{0:?} autoplay is already running; stop it first")]
    AlreadyRunning(AutoplayKind),
}

/// One repeating timer per autoplay control.
#[derive(Debug, Clone, PartialEq)]
pub struct Autoplay {
    year: RepeatingTimer,
    metric: RepeatingTimer,
}

impl Autoplay {
    pub fn new(year_interval_ms: u64, metric_interval_ms: u64) -> Self {
        Self {
            year: RepeatingTimer::from_millis(year_interval_ms),
            metric: RepeatingTimer::from_millis(metric_interval_ms),
        }
    }

    fn timer(&self, kind: AutoplayKind) -> &RepeatingTimer {
        match kind {
            AutoplayKind::Year => &self.year,
            AutoplayKind::Metric => &self.metric,
        }
    }

    fn timer_mut(&mut self, kind: AutoplayKind) -> &mut RepeatingTimer {
        match kind {
            AutoplayKind::Year => &mut self.year,
            AutoplayKind::Metric => &mut self.metric,
        }
    }

    pub fn is_running(&self, kind: AutoplayKind) -> bool {
        self.timer(kind).is_running()
    }

    pub fn start(&mut self, kind: AutoplayKind, now: Time) -> Result<(), AutoplayError> {
        self.timer_mut(kind)
            .start(now)
            .map_err(|_: TimerError| AutoplayError::AlreadyRunning(kind))
    }

    /// Returns `true` if the control was running.
    pub fn stop(&mut self, kind: AutoplayKind) -> bool {
        self.timer_mut(kind).stop()
    }

    /// Play/pause button semantics; returns whether the control now runs.
    pub fn toggle(&mut self, kind: AutoplayKind, now: Time) -> bool {
        let timer = self.timer_mut(kind);
        if timer.stop() {
            return false;
        }
        timer.start(now).is_ok()
    }

    /// Controls whose interval elapsed at `now`, year first.
    pub fn poll(&mut self, now: Time) -> Vec<AutoplayKind> {
        let mut fired = Vec::new();
        if self.year.poll(now) {
            fired.push(AutoplayKind::Year);
        }
        if self.metric.poll(now) {
            fired.push(AutoplayKind::Metric);
        }
        fired
    }

    pub fn button_label(&self, kind: AutoplayKind) -> &'static str {
        if self.is_running(kind) { "⏸" } else { "▶" }
    }
}
