/// Monotonic timestamp in seconds.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn add_seconds(self, s: f64) -> Self {
        Time(self.0 + s)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn since_is_clamped() {
        assert_eq!(Time(2.5).since(Time(1.0)), 1.5);
        assert_eq!(Time(1.0).since(Time(2.5)), 0.0);
        assert_eq!(Time::ZERO.add_seconds(0.25), Time(0.25));
        assert_eq!(Time(1.0).add_seconds(0.5).seconds(), 1.5);
    }
}
