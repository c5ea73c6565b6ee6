//! Run deadline shared by every stage.

use std::time::{Duration, Instant};

/// Stand-in for budgets too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { at }
    }

    pub(crate) fn remaining(self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub(crate) fn is_expired(self) -> bool {
        self.remaining().is_zero()
    }

    /// `limit`, shortened to what is left of the run.
    pub(crate) fn cap(self, limit: Duration) -> Duration {
        limit.min(self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_never_exceeds_remaining() {
        let deadline = Deadline::after(Duration::from_secs(5));
        assert!(deadline.cap(Duration::from_secs(60)) <= Duration::from_secs(5));
        assert_eq!(deadline.cap(Duration::from_millis(10)), Duration::from_millis(10));
        assert!(!deadline.is_expired());
    }

    #[test]
    fn zero_budget_is_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.cap(Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn huge_budget_does_not_overflow() {
        let deadline = Deadline::after(Duration::MAX);
        assert!(!deadline.is_expired());
        assert_eq!(deadline.cap(Duration::from_secs(30)), Duration::from_secs(30));
    }
}
