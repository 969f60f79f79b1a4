/// Host time in seconds.
///
/// Hosts feed monotonically increasing values (e.g. the timestamp passed to a
/// frame callback); nothing here reads a wall clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn after_secs(self, secs: f64) -> Time {
        Time(self.0 + secs)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn since_is_clamped_at_zero() {
        let a = Time(2.0);
        let b = Time(3.5);
        assert_eq!(b.since(a), 1.5);
        assert_eq!(a.since(b), 0.0);
    }

    #[test]
    fn millis_convert_to_seconds() {
        assert_eq!(Time::from_millis(900.0), Time(0.9));
        assert_eq!(Time::ZERO.after_secs(1.2), Time(1.2));
    }
}
