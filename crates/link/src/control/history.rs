use std::collections::VecDeque;

/// Fixed-capacity, insertion-ordered window. Pushing past capacity evicts
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, returning the evicted oldest entry if the window was
    /// full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(value);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// The two most recent entries as `(previous, latest)`.
    pub fn latest_pair(&self) -> Option<(&T, &T)> {
        let len = self.entries.len();
        if len < 2 {
            return None;
        }
        Some((&self.entries[len - 2], &self.entries[len - 1]))
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut history = BoundedHistory::new(5);

        for value in 0..5 {
            assert_eq!(history.push(value), None);
        }
        assert_eq!(history.push(5), Some(0));

        assert_eq!(history.len(), 5);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(history.oldest(), Some(&1));
        assert_eq!(history.latest(), Some(&5));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut history = BoundedHistory::new(3);

        for value in 0..100 {
            history.push(value);
            assert!(history.len() <= history.capacity());
        }
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), [97, 98, 99]);
    }

    #[test]
    fn test_latest_pair() {
        let mut history = BoundedHistory::new(4);
        assert!(history.latest_pair().is_none());

        history.push('a');
        assert!(history.latest_pair().is_none());

        history.push('b');
        history.push('c');
        assert_eq!(history.latest_pair(), Some((&'b', &'c')));
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = BoundedHistory::<u8>::new(0);
    }
}
