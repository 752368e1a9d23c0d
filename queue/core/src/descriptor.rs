//! Queue descriptors.
//!
//! A descriptor is the control record of one queue. The table is fixed;
//! creating a queue claims a free slot rather than allocating anything.
//!
//! ```text
//! +------+------+-------------+-------------+--------+------------+
//! | 0..2 | 2..4 |      4      |      5      |   6    |     7      |
//! | head | tail | head offset | tail offset | in_use | generation |
//! +------+------+-------------+-------------+--------+------------+
//! ```
//!
//! An empty queue has `head == tail == NONE` and both offsets zero. A
//! non-empty queue reads at `head[head_offset]` and writes at
//! `tail[tail_offset]`, where `tail_offset < SEGMENT_PAYLOAD` always holds.

use crate::index::{Link, SegmentId};

/// Control record for one queue.
#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct Descriptor {
    pub(crate) head: Link,
    pub(crate) tail: Link,
    pub(crate) head_offset: u8,
    pub(crate) tail_offset: u8,
    in_use: u8,
    generation: u8,
}

impl Descriptor {
    pub(crate) const ZERO: Self = Self {
        head: Link::ZERO,
        tail: Link::ZERO,
        head_offset: 0,
        tail_offset: 0,
        in_use: 0,
        generation: 0,
    };

    #[inline]
    pub(crate) fn is_in_use(&self) -> bool {
        self.in_use != 0
    }

    #[inline]
    pub(crate) fn generation(&self) -> u8 {
        self.generation
    }

    /// Take a free slot, leaving it as an empty queue with a new generation.
    pub(crate) fn claim(&mut self) {
        debug_assert!(!self.is_in_use());
        self.in_use = 1;
        self.generation = self.generation.wrapping_add(1);
        self.clear();
    }

    /// Mark the slot free. Its chain must already be released.
    pub(crate) fn release(&mut self) {
        self.in_use = 0;
    }

    /// Reset to the empty queue state.
    pub(crate) fn clear(&mut self) {
        self.head = Link::NONE;
        self.tail = Link::NONE;
        self.head_offset = 0;
        self.tail_offset = 0;
    }

    /// Start a chain with a single segment.
    pub(crate) fn start(&mut self, segment: SegmentId) {
        self.head = Link::to(segment);
        self.tail = Link::to(segment);
        self.head_offset = 0;
        self.tail_offset = 0;
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_resets_state() {
        let mut descriptor = Descriptor::ZERO;
        descriptor.claim();
        assert!(descriptor.is_in_use());
        assert!(descriptor.is_empty());
        assert!(descriptor.tail.is_none());
        assert_eq!(descriptor.head_offset, 0);
        assert_eq!(descriptor.tail_offset, 0);
        assert_eq!(descriptor.generation(), 1);
    }

    #[test]
    fn test_generation_advances_per_claim() {
        let mut descriptor = Descriptor::ZERO;
        descriptor.claim();
        descriptor.release();
        assert!(!descriptor.is_in_use());
        descriptor.claim();
        assert_eq!(descriptor.generation(), 2);
    }

    #[test]
    fn test_generation_wraps() {
        let mut descriptor = Descriptor {
            generation: u8::MAX,
            ..Descriptor::ZERO
        };
        descriptor.claim();
        assert_eq!(descriptor.generation(), 0);
    }

    #[test]
    fn test_start_and_clear() {
        let mut descriptor = Descriptor::ZERO;
        descriptor.claim();
        let segment = SegmentId::new(5);
        descriptor.start(segment);
        assert!(!descriptor.is_empty());
        assert_eq!(descriptor.head.get(), Some(segment));
        assert_eq!(descriptor.tail.get(), Some(segment));

        descriptor.clear();
        assert!(descriptor.is_empty());
        assert!(descriptor.tail.is_none());
    }
}
