//! The queue engine.
//!
//! [`QueueManager`] owns the whole storage region and implements queue
//! creation, destruction and the byte-level enqueue/dequeue transitions.
//!
//! Per-queue state machine:
//!
//! ```text
//!          create            enqueue
//!  Free ----------> Empty -----------> NonEmpty --+
//!   ^                 |  ^                 |      | enqueue / dequeue
//!   |     destroy     |  | dequeue (last)  |      | (not last byte)
//!   +-----------------+  +-----------------+ <----+
//!   ^                                      |
//!   +--------------- destroy --------------+
//! ```

use std::fmt;

use tracing::debug;

use crate::descriptor::Descriptor;
use crate::error::{Exhausted, Illegal, QueueResult};
use crate::index::{Link, QueueHandle};
use crate::layout::{MAX_QUEUES, Region, SEGMENT_PAYLOAD};
use crate::segment::{PoolStats, SegmentPool};

/// A set of byte FIFO queues living in one fixed storage region.
///
/// The manager never allocates on the heap; its entire state is a single
/// [`REGION_SIZE`](crate::REGION_SIZE)-byte value, so it can be placed in a
/// `static`, on the stack, or inside another structure. Independent managers
/// share nothing.
///
/// All operations take `&mut self`. Sharing a manager between threads needs
/// a lock around the whole manager.
pub struct QueueManager {
    region: Region,
}

impl QueueManager {
    /// Create a manager with every descriptor free and the pool untouched.
    pub const fn new() -> Self {
        Self {
            region: Region::new(),
        }
    }

    /// Create a new, empty queue in the lowest free descriptor slot.
    ///
    /// Returns `OutOfMemory(Descriptors)` if all [`MAX_QUEUES`] slots are in
    /// use.
    pub fn create_queue(&mut self) -> QueueResult<QueueHandle> {
        let Some((slot, descriptor)) = self
            .region
            .descriptors
            .iter_mut()
            .enumerate()
            .find(|(_, descriptor)| !descriptor.is_in_use())
        else {
            debug!(max_queues = MAX_QUEUES, "no free queue descriptor");
            return Err(Exhausted::Descriptors.into());
        };

        descriptor.claim();
        let handle = QueueHandle::new(slot, descriptor.generation());
        debug!(?handle, "queue created");
        Ok(handle)
    }

    /// Destroy a queue, returning all of its segments to the free list.
    ///
    /// Any bytes still queued are discarded. The handle is invalid afterward.
    pub fn destroy_queue(&mut self, handle: QueueHandle) -> QueueResult<()> {
        let (descriptor, mut pool) = self.parts(handle)?;

        let mut released = 0usize;
        let mut cursor = descriptor.head;
        while let Some(segment) = cursor.get() {
            cursor = pool.segment(segment).next;
            pool.release(segment);
            released += 1;
        }

        descriptor.clear();
        descriptor.release();
        debug!(?handle, released, "queue destroyed");
        Ok(())
    }

    /// Append a byte to the back of a queue.
    ///
    /// A queue always keeps a writable position in its tail segment: when a
    /// write fills the tail, the next segment is linked in immediately. The
    /// segment is allocated before the byte is written, so an
    /// `OutOfMemory(Segments)` error leaves the queue unchanged.
    pub fn enqueue_byte(&mut self, handle: QueueHandle, byte: u8) -> QueueResult<()> {
        let (descriptor, mut pool) = self.parts(handle)?;

        let tail = match descriptor.tail.get() {
            Some(tail) => tail,
            None => {
                let segment = pool.allocate()?;
                pool.segment_mut(segment).next = Link::NONE;
                descriptor.start(segment);
                segment
            }
        };

        let offset = descriptor.tail_offset as usize;
        if offset + 1 < SEGMENT_PAYLOAD {
            pool.segment_mut(tail).payload[offset] = byte;
            descriptor.tail_offset += 1;
            return Ok(());
        }

        // This write fills the tail segment.
        let next = pool.allocate()?;
        pool.segment_mut(next).next = Link::NONE;

        let segment = pool.segment_mut(tail);
        segment.payload[offset] = byte;
        segment.next = Link::to(next);

        descriptor.tail = Link::to(next);
        descriptor.tail_offset = 0;
        Ok(())
    }

    /// Remove and return the byte at the front of a queue.
    ///
    /// Returns `IllegalOperation(EmptyQueue)` if the queue holds no bytes.
    pub fn dequeue_byte(&mut self, handle: QueueHandle) -> QueueResult<u8> {
        let (descriptor, mut pool) = self.parts(handle)?;

        let head = descriptor.head.get().ok_or(Illegal::EmptyQueue)?;
        let value = pool.segment(head).payload[descriptor.head_offset as usize];
        descriptor.head_offset += 1;

        if drained(descriptor) {
            pool.release(head);
            descriptor.clear();
        } else if descriptor.head_offset as usize == SEGMENT_PAYLOAD {
            descriptor.head = pool.segment(head).next;
            descriptor.head_offset = 0;
            pool.release(head);

            // The new head can be a tail with nothing written to it yet.
            if drained(descriptor) {
                if let Some(tail) = descriptor.tail.get() {
                    pool.release(tail);
                }
                descriptor.clear();
            }
        }

        Ok(value)
    }

    /// Number of bytes currently held by a queue.
    ///
    /// Walks the queue's segment chain.
    pub fn len(&self, handle: QueueHandle) -> QueueResult<usize> {
        let descriptor = self.descriptor(handle)?;
        let Some(head) = descriptor.head.get() else {
            return Ok(0);
        };

        let mut segments = 1;
        let mut cursor = self.region.segments[head.as_usize()].next;
        while let Some(segment) = cursor.get() {
            segments += 1;
            cursor = self.region.segments[segment.as_usize()].next;
        }

        Ok((segments - 1) * SEGMENT_PAYLOAD + descriptor.tail_offset as usize
            - descriptor.head_offset as usize)
    }

    /// Whether a queue holds no bytes.
    pub fn is_empty(&self, handle: QueueHandle) -> QueueResult<bool> {
        Ok(self.descriptor(handle)?.is_empty())
    }

    /// Number of live queues.
    pub fn live_queues(&self) -> usize {
        self.region
            .descriptors
            .iter()
            .filter(|descriptor| descriptor.is_in_use())
            .count()
    }

    /// Segment pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats::collect(&self.region.state, &self.region.segments)
    }

    /// Look up and validate the descriptor a handle refers to.
    fn descriptor(&self, handle: QueueHandle) -> QueueResult<&Descriptor> {
        let descriptor = self
            .region
            .descriptors
            .get(handle.slot())
            .ok_or(Illegal::SlotOutOfRange)?;
        check(descriptor, handle)?;
        Ok(descriptor)
    }

    /// Split the region into the validated descriptor and the segment pool.
    fn parts(&mut self, handle: QueueHandle) -> QueueResult<(&mut Descriptor, SegmentPool<'_>)> {
        let Region {
            descriptors,
            state,
            segments,
            ..
        } = &mut self.region;

        let descriptor = descriptors
            .get_mut(handle.slot())
            .ok_or(Illegal::SlotOutOfRange)?;
        check(descriptor, handle)?;
        Ok((descriptor, SegmentPool::new(state, segments)))
    }
}

/// The read cursor has caught up with the write cursor in the same segment.
fn drained(descriptor: &Descriptor) -> bool {
    descriptor.head == descriptor.tail && descriptor.head_offset == descriptor.tail_offset
}

fn check(descriptor: &Descriptor, handle: QueueHandle) -> QueueResult<()> {
    if !descriptor.is_in_use() {
        return Err(Illegal::SlotNotInUse.into());
    }
    if descriptor.generation() != handle.generation() {
        return Err(Illegal::StaleHandle.into());
    }
    Ok(())
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueManager")
            .field("live_queues", &self.live_queues())
            .field("pool", &self.pool_stats())
            .finish()
    }
}
