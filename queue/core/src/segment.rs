//! Segment records and the segment allocator.
//!
//! Segments are the only unit of allocation. Every segment belongs either to
//! exactly one queue's chain or to the free list. Allocation prefers the free
//! list (LIFO) and falls back to bumping into never-used segments.
//!
//! ```text
//!  segments:  [ 0 ][ 1 ][ 2 ][ 3 ][ 4 ][ 5 ] ... [ 94 ]
//!               in use      ^free      ^next_unused
//!  free list: head -> 3 -> 1 -> NONE
//! ```

use tracing::{debug, trace};

use crate::error::{Exhausted, QueueError, QueueResult};
use crate::index::{Link, SegmentId};
use crate::layout::{SEGMENT_COUNT, SEGMENT_PAYLOAD};

/// One segment: a link to the next segment in its chain and a payload chunk.
#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct Segment {
    pub(crate) next: Link,
    pub(crate) payload: [u8; SEGMENT_PAYLOAD],
}

impl Segment {
    pub(crate) const ZERO: Self = Self {
        next: Link::ZERO,
        payload: [0; SEGMENT_PAYLOAD],
    };
}

/// Process-start state of the allocator.
///
/// The zeroed record is not a valid allocator state (a zero link names
/// segment 0), so the pool sets it up on first allocation.
#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct AllocatorState {
    free_head: Link,
    next_unused: u16,
    initialized: u32,
}

impl AllocatorState {
    pub(crate) const ZERO: Self = Self {
        free_head: Link::ZERO,
        next_unused: 0,
        initialized: 0,
    };

    #[inline]
    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized != 0
    }
}

/// Allocation statistics for the segment pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total segments in the pool.
    pub total: usize,
    /// Segments that have been handed out at least once (the bump mark).
    pub touched: usize,
    /// Segments waiting on the free list.
    pub free_listed: usize,
    /// Segments currently owned by queues.
    pub in_use: usize,
}

/// Mutable view over the allocator state and the segment array.
pub(crate) struct SegmentPool<'a> {
    state: &'a mut AllocatorState,
    segments: &'a mut [Segment; SEGMENT_COUNT],
}

impl<'a> SegmentPool<'a> {
    pub(crate) fn new(
        state: &'a mut AllocatorState,
        segments: &'a mut [Segment; SEGMENT_COUNT],
    ) -> Self {
        Self { state, segments }
    }

    /// Take a segment, from the free list if possible.
    ///
    /// The returned segment's link and payload hold whatever they held
    /// before; callers set `next` themselves.
    pub(crate) fn allocate(&mut self) -> QueueResult<SegmentId> {
        if !self.state.is_initialized() {
            self.state.initialized = 1;
            self.state.free_head = Link::NONE;
            self.state.next_unused = 0;
            debug!(segments = SEGMENT_COUNT, "segment allocator initialized");
        }

        if let Some(id) = self.state.free_head.get() {
            self.state.free_head = self.segments[id.as_usize()].next;
            trace!(segment = %id, "segment reused from free list");
            return Ok(id);
        }

        if (self.state.next_unused as usize) < SEGMENT_COUNT {
            let id = SegmentId::new(self.state.next_unused);
            self.state.next_unused += 1;
            trace!(segment = %id, "segment taken from unused space");
            return Ok(id);
        }

        debug!("segment pool exhausted");
        Err(QueueError::OutOfMemory(Exhausted::Segments))
    }

    /// Push a segment onto the front of the free list.
    ///
    /// The caller must own `id`; double frees are not detected.
    pub(crate) fn release(&mut self, id: SegmentId) {
        self.segments[id.as_usize()].next = self.state.free_head;
        self.state.free_head = Link::to(id);
        trace!(segment = %id, "segment released");
    }

    #[inline]
    pub(crate) fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.as_usize()]
    }

    #[inline]
    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.as_usize()]
    }

    #[cfg(test)]
    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats::collect(&*self.state, &*self.segments)
    }
}

impl PoolStats {
    /// Segments that can still be allocated.
    pub fn available(&self) -> usize {
        self.total - self.in_use
    }

    /// Read the statistics out of the allocator state, walking the free list.
    pub(crate) fn collect(state: &AllocatorState, segments: &[Segment; SEGMENT_COUNT]) -> Self {
        if !state.is_initialized() {
            return Self {
                total: SEGMENT_COUNT,
                ..Default::default()
            };
        }

        let mut free_listed = 0;
        let mut cursor = state.free_head;
        while let Some(id) = cursor.get() {
            free_listed += 1;
            cursor = segments[id.as_usize()].next;
        }

        let touched = state.next_unused as usize;
        Self {
            total: SEGMENT_COUNT,
            touched,
            free_listed,
            in_use: touched - free_listed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        state: AllocatorState,
        segments: [Segment; SEGMENT_COUNT],
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: AllocatorState::ZERO,
                segments: [Segment::ZERO; SEGMENT_COUNT],
            }
        }

        fn pool(&mut self) -> SegmentPool<'_> {
            SegmentPool::new(&mut self.state, &mut self.segments)
        }
    }

    #[test]
    fn test_lazy_initialization() {
        let mut fixture = Fixture::new();
        assert!(!fixture.state.is_initialized());
        assert_eq!(fixture.pool().stats(), PoolStats {
            total: SEGMENT_COUNT,
            ..Default::default()
        });

        let id = fixture.pool().allocate().unwrap();
        assert_eq!(id.as_usize(), 0);
        assert!(fixture.state.is_initialized());
    }

    #[test]
    fn test_bump_allocation_is_sequential() {
        let mut fixture = Fixture::new();
        let mut pool = fixture.pool();
        for expected in 0..10 {
            assert_eq!(pool.allocate().unwrap().as_usize(), expected);
        }
        assert_eq!(pool.stats().touched, 10);
        assert_eq!(pool.stats().in_use, 10);
    }

    #[test]
    fn test_free_list_first() {
        let mut fixture = Fixture::new();
        let mut pool = fixture.pool();
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        let _c = pool.allocate().unwrap();

        pool.release(a);
        assert_eq!(pool.allocate().unwrap(), a);

        // LIFO: the last segment released is the first reused.
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.allocate().unwrap(), b);
        assert_eq!(pool.allocate().unwrap(), a);

        // Free list drained, back to the bump pointer.
        assert_eq!(pool.allocate().unwrap().as_usize(), 3);
    }

    #[test]
    fn test_exhaustion() {
        let mut fixture = Fixture::new();
        let mut pool = fixture.pool();
        for _ in 0..SEGMENT_COUNT {
            pool.allocate().unwrap();
        }
        assert_eq!(
            pool.allocate(),
            Err(QueueError::OutOfMemory(Exhausted::Segments))
        );
        // A failed allocation leaves the pool intact.
        assert_eq!(pool.stats().in_use, SEGMENT_COUNT);

        pool.release(SegmentId::new(17));
        assert_eq!(pool.allocate().unwrap().as_usize(), 17);
    }

    #[test]
    fn test_stats() {
        let mut fixture = Fixture::new();
        let mut pool = fixture.pool();
        let ids: Vec<_> = (0..5).map(|_| pool.allocate().unwrap()).collect();
        pool.release(ids[1]);
        pool.release(ids[3]);

        let stats = pool.stats();
        assert_eq!(stats.touched, 5);
        assert_eq!(stats.free_listed, 2);
        assert_eq!(stats.in_use, 3);
        assert_eq!(stats.available(), SEGMENT_COUNT - 3);
    }
}
