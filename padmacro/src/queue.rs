//! FIFO of macros waiting for the execution slot.
use heapless::Deque;

/// Result of a successful [`ExecutionQueue::push`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Enqueued {
    /// Appended at this position, 0 is the front
    At(usize),
    /// Was already waiting, nothing changed
    AlreadyQueued,
}

/// The queue holds `N` entries already
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// Bounded FIFO without duplicate entries
#[derive(Debug, Clone)]
pub struct ExecutionQueue<T: Copy + PartialEq, const N: usize> {
    entries: Deque<T, N>,
}

impl<T: Copy + PartialEq, const N: usize> Default for ExecutionQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq, const N: usize> ExecutionQueue<T, N> {
    pub const fn new() -> Self {
        Self { entries: Deque::new() }
    }

    /// Append `item` unless it is already waiting
    pub fn push(&mut self, item: T) -> Result<Enqueued, QueueFull> {
        if self.contains(item) {
            return Ok(Enqueued::AlreadyQueued);
        }
        let position = self.entries.len();
        self.entries.push_back(item).map_err(|_| QueueFull)?;
        Ok(Enqueued::At(position))
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    /// Remove `item` wherever it is, keeping the order of the others
    pub fn remove(&mut self, item: T) -> bool {
        let len = self.entries.len();
        let mut found = false;
        for _ in 0..len {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            if entry == item {
                found = true;
            } else {
                // One slot was just freed
                let _ = self.entries.push_back(entry);
            }
        }
        found
    }

    pub fn contains(&self, item: T) -> bool {
        self.entries.iter().any(|e| *e == item)
    }

    pub fn position(&self, item: T) -> Option<usize> {
        self.entries.iter().position(|e| *e == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
