//! Fixed-capacity sliding window over the most recent samples
//!
//! Bounds ingestion memory: pushing into a full window evicts exactly
//! the oldest sample (strict FIFO by insertion order — timestamps are
//! externally supplied and never re-sorted). Consumers read through
//! [`SampleWindow::snapshot`], a defensive copy, so no reader can
//! observe mutation mid-read.

use crate::error::{DaqError, Result};
use crate::types::Sample;
use std::collections::VecDeque;

/// Bounded FIFO buffer of the most recent samples
#[derive(Debug)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    /// Create a window holding at most `capacity` samples
    ///
    /// A zero capacity is rejected: every push would be a no-op, which
    /// is never a useful configuration.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DaqError::Config(
                "window capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a sample, returning the evicted oldest sample if full
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Maximum number of samples retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently pushed sample, if any
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(SampleWindow::new(0), Err(DaqError::Config(_))));
    }

    #[test]
    fn test_push_below_capacity_evicts_nothing() {
        let mut window = SampleWindow::new(3).unwrap();
        assert_eq!(window.push(Sample::new(0, 1.0, 1.0)), None);
        assert_eq!(window.push(Sample::new(1, 1.0, 1.0)), None);
        assert_eq!(window.len(), 2);
        assert!(!window.is_empty());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = SampleWindow::new(3).unwrap();
        for i in 0..3 {
            window.push(Sample::new(i, 0.0, 0.0));
        }
        // The fourth push evicts exactly the first-pushed sample.
        let evicted = window.push(Sample::new(3, 0.0, 0.0));
        assert_eq!(evicted, Some(Sample::new(0, 0.0, 0.0)));

        let millis: Vec<u64> = window.snapshot().iter().map(|s| s.millis).collect();
        assert_eq!(millis, vec![1, 2, 3]);
    }

    #[test]
    fn test_insertion_order_not_timestamp_order() {
        // Non-monotonic timestamps are kept in insertion order.
        let mut window = SampleWindow::new(2).unwrap();
        window.push(Sample::new(50, 0.0, 0.0));
        window.push(Sample::new(10, 0.0, 0.0));
        window.push(Sample::new(30, 0.0, 0.0));
        let millis: Vec<u64> = window.snapshot().iter().map(|s| s.millis).collect();
        assert_eq!(millis, vec![10, 30]);
    }

    #[test]
    fn test_snapshot_is_defensive_copy() {
        let mut window = SampleWindow::new(2).unwrap();
        window.push(Sample::new(0, 1.0, 2.0));
        let snapshot = window.snapshot();
        window.push(Sample::new(1, 3.0, 4.0));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(window.latest().unwrap().millis, 1);
    }

    proptest! {
        #[test]
        fn window_bound_holds(capacity in 1usize..64, n in 0usize..256) {
            let mut window = SampleWindow::new(capacity).unwrap();
            for i in 0..n {
                window.push(Sample::new(i as u64, 0.0, 0.0));
            }
            prop_assert_eq!(window.len(), n.min(capacity));

            let snapshot = window.snapshot();
            prop_assert_eq!(snapshot.len(), n.min(capacity));
            if n > capacity {
                // Oldest surviving element is input element n - capacity.
                prop_assert_eq!(snapshot[0].millis, (n - capacity) as u64);
            }
        }
    }
}
