/// Snapshot pushed after every unit of work in a pipeline.
///
/// Within one run `current` never decreases and never exceeds `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress<T> {
    pub total: u64,
    pub current: u64,
    /// What the unit produced; `None` when it produced nothing (a failed
    /// import unit, a hash that matched no folder, ...).
    pub item: Option<T>,
}

impl<T> Progress<T> {
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

pub(crate) struct Tracker {
    total: u64,
    current: u64,
}

impl Tracker {
    pub(crate) fn new(total: usize) -> Self {
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        Self { total: u64::try_from(total).unwrap_or(u64::MAX), current: 0 }
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    pub(crate) fn advance<T>(&mut self, item: Option<T>) -> Progress<T> {
        self.current = (self.current + 1).min(self.total);
        Progress { total: self.total, current: self.current, item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_is_monotonic_and_capped() {
        let mut tracker = Tracker::new(2);
        let first = tracker.advance(Some("a"));
        assert_eq!(first, Progress { total: 2, current: 1, item: Some("a") });
        assert!(!first.is_complete());
        let second = tracker.advance::<&str>(None);
        assert_eq!((second.current, second.item), (2, None));
        assert!(second.is_complete());
        assert_eq!(tracker.advance::<&str>(None).current, 2);
    }
}
