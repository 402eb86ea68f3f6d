use std::collections::VecDeque;

use glam::DVec3;

/// Recent positions of one body, oldest first.
///
/// Holds at most `capacity` points. Pushing onto a full buffer evicts
/// the oldest point.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<DVec3>,
    capacity: usize,
}

impl TrailBuffer {
    /// The trail length the demo uses unless configured otherwise.
    pub const DEFAULT_CAPACITY: usize = 2000;

    /// Creates an empty trail. A capacity of zero records nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: DVec3) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Copies the trail out, oldest point first.
    pub fn snapshot(&self) -> Box<[DVec3]> {
        self.points.iter().copied().collect()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DVec3> + DoubleEndedIterator {
        self.points.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<DVec3> {
        self.points.front().copied()
    }

    pub fn newest(&self) -> Option<DVec3> {
        self.points.back().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
