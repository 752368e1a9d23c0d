//! Storage region layout.
//!
//! The region is a single fixed block of [`REGION_SIZE`] bytes partitioned,
//! in order, into the descriptor table, the allocator state and the segment
//! pool. The segment count is whatever fits in the bytes left over by the
//! first two regions.
//!
//! ```text
//! offset 0                 512      520                               2040  2048
//! +-------------------------+--------+----------------------------------+-----+
//! | descriptors [8B x 64]   | state  | segments [16B x 95]              | pad |
//! +-------------------------+--------+----------------------------------+-----+
//! ```

use std::mem::{offset_of, size_of};

use crate::descriptor::Descriptor;
use crate::segment::{AllocatorState, Segment};

/// Total size of the storage region in bytes.
pub const REGION_SIZE: usize = 2048;

/// Number of descriptor slots, and so the maximum number of live queues.
pub const MAX_QUEUES: usize = 64;

/// Size of one queue descriptor.
pub const DESCRIPTOR_SIZE: usize = 8;

/// Bytes taken by the descriptor table.
pub const DESCRIPTORS_AREA: usize = MAX_QUEUES * DESCRIPTOR_SIZE;

/// Size of the allocator state record.
pub const GLOBAL_STATE_SIZE: usize = 8;

/// Payload bytes carried by one segment.
pub const SEGMENT_PAYLOAD: usize = 14;

/// Size of one segment: 2-byte link plus payload.
pub const SEGMENT_SIZE: usize = SEGMENT_PAYLOAD + 2;

/// Number of segments in the pool.
pub const SEGMENT_COUNT: usize = (REGION_SIZE - DESCRIPTORS_AREA - GLOBAL_STATE_SIZE) / SEGMENT_SIZE;

/// Trailing bytes too small to hold another segment.
pub const REMAINDER: usize =
    REGION_SIZE - DESCRIPTORS_AREA - GLOBAL_STATE_SIZE - SEGMENT_COUNT * SEGMENT_SIZE;

/// Most bytes the pool can hold across all queues at once.
///
/// A queue's tail always has a free position, so one payload byte of the
/// pool is never usable.
pub const BYTE_CAPACITY: usize = SEGMENT_COUNT * SEGMENT_PAYLOAD - 1;

/// The storage region, split into its three typed parts.
#[repr(C)]
pub(crate) struct Region {
    pub(crate) descriptors: [Descriptor; MAX_QUEUES],
    pub(crate) state: AllocatorState,
    pub(crate) segments: [Segment; SEGMENT_COUNT],
    _remainder: [u8; REMAINDER],
}

impl Region {
    /// The all-zero region.
    pub(crate) const fn new() -> Self {
        Self {
            descriptors: [Descriptor::ZERO; MAX_QUEUES],
            state: AllocatorState::ZERO,
            segments: [Segment::ZERO; SEGMENT_COUNT],
            _remainder: [0; REMAINDER],
        }
    }
}

const _: () = assert!(size_of::<Descriptor>() == DESCRIPTOR_SIZE);
const _: () = assert!(size_of::<AllocatorState>() == GLOBAL_STATE_SIZE);
const _: () = assert!(size_of::<Segment>() == SEGMENT_SIZE);
const _: () = assert!(REMAINDER < SEGMENT_SIZE);
const _: () = assert!(
    DESCRIPTORS_AREA + GLOBAL_STATE_SIZE + SEGMENT_COUNT * SEGMENT_SIZE + REMAINDER == REGION_SIZE
);
const _: () = assert!(size_of::<Region>() == REGION_SIZE);
const _: () = assert!(offset_of!(Region, state) == DESCRIPTORS_AREA);
const _: () = assert!(offset_of!(Region, segments) == DESCRIPTORS_AREA + GLOBAL_STATE_SIZE);
// Segment indices and the sentinel must fit a 16-bit link.
const _: () = assert!(SEGMENT_COUNT < u16::MAX as usize);
// Cursors are stored as u8 and handles encode the slot in a u8.
const _: () = assert!(SEGMENT_PAYLOAD <= u8::MAX as usize);
const _: () = assert!(MAX_QUEUES <= u8::MAX as usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        assert_eq!(DESCRIPTORS_AREA, 512);
        assert_eq!(SEGMENT_SIZE, 16);
        assert_eq!(SEGMENT_COUNT, 95);
        assert_eq!(REMAINDER, 8);
        assert_eq!(BYTE_CAPACITY, 1329);
    }

    #[test]
    fn test_region_is_zeroed() {
        let region = Region::new();
        assert!(region.descriptors.iter().all(|d| !d.is_in_use()));
        assert!(!region.state.is_initialized());
    }
}
