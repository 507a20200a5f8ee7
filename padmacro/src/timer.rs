//! Deadline tracking on the monotonic clock.
//!
//! Nothing here waits. A deadline is only compared against the `now` handed in
//! by the caller, so the engine can be driven by a real clock or a simulated one.
use embassy_time::{Duration, Instant};

/// An optional point in time
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn at(&mut self, instant: Instant) {
        self.0 = Some(instant);
    }

    /// Arm the deadline `ms` milliseconds after `now`
    pub fn after(&mut self, now: Instant, ms: u64) {
        self.0 = Some(now + Duration::from_millis(ms));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Set and not reached yet
    pub fn is_pending(&self, now: Instant) -> bool {
        matches!(self.0, Some(deadline) if now < deadline)
    }

    /// Set and reached
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.0, Some(deadline) if now >= deadline)
    }

    /// Milliseconds left until the deadline, `None` when unset
    pub fn remaining_ms(&self, now: Instant) -> Option<u64> {
        self.0
            .map(|deadline| deadline.checked_duration_since(now).map_or(0, |d| d.as_millis()))
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline() {
        let mut deadline = Deadline::none();
        let t0 = Instant::from_millis(100);
        assert!(!deadline.is_pending(t0));
        assert!(!deadline.is_expired(t0));
        assert_eq!(deadline.remaining_ms(t0), None);

        deadline.after(t0, 50);
        assert!(deadline.is_pending(Instant::from_millis(149)));
        assert_eq!(deadline.remaining_ms(Instant::from_millis(120)), Some(30));
        assert!(deadline.is_expired(Instant::from_millis(150)));
        assert!(!deadline.is_pending(Instant::from_millis(150)));
        assert_eq!(deadline.remaining_ms(Instant::from_millis(400)), Some(0));

        deadline.clear();
        assert!(!deadline.is_set());
    }
}
