/// Wrap-around position into an externally owned ordering.
///
/// Only the index is stored. Every call receives the authoritative slice and
/// re-reads its length, so the cursor follows the ordering as it grows or
/// shrinks between steps. An empty slice turns every operation into a no-op
/// that returns `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CyclicCursor {
    index: usize,
}

impl CyclicCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn current<T: Copy>(&self, order: &[T]) -> Option<T> {
        self.peek(order, 0)
    }

    /// Element at `cursor + offset`, wrapping in both directions.
    pub fn peek<T: Copy>(&self, order: &[T], offset: isize) -> Option<T> {
        let idx = Self::wrap(order.len(), self.index, offset)?;
        Some(order[idx])
    }

    pub fn next<T: Copy>(&mut self, order: &[T]) -> Option<T> {
        self.step(order, 1)
    }

    pub fn prev<T: Copy>(&mut self, order: &[T]) -> Option<T> {
        self.step(order, -1)
    }

    /// Moves the cursor onto `target`. Returns false, leaving the cursor
    /// untouched, when `target` is not in `order`.
    pub fn seek<T: Copy + PartialEq>(&mut self, order: &[T], target: T) -> bool {
        match order.iter().position(|item| *item == target) {
            Some(idx) => {
                self.index = idx;
                true
            }
            None => false,
        }
    }

    fn step<T: Copy>(&mut self, order: &[T], delta: isize) -> Option<T> {
        let idx = Self::wrap(order.len(), self.index, delta)?;
        self.index = idx;
        Some(order[idx])
    }

    fn wrap(len: usize, index: usize, delta: isize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let len = len as isize;
        let base = (index as isize).rem_euclid(len);
        Some((base + delta).rem_euclid(len) as usize)
    }
}
