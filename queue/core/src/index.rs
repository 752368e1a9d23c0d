//! Typed indices into the storage region.
//!
//! Segments are addressed by [`SegmentId`], never by a bare integer. Inside
//! the region, an optional segment reference is stored as a [`Link`]: a 16-bit
//! value where all bits set means "no segment". A `Link` can only be read back
//! through [`Link::get`], so the sentinel never escapes as a valid-looking index.
//!
//! Queues are addressed by [`QueueHandle`], which pairs a descriptor slot with
//! the generation the slot had when the queue was created.

use std::fmt;

use crate::layout::{MAX_QUEUES, SEGMENT_COUNT};

/// Index of a segment in the segment pool.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u16);

impl SegmentId {
    /// Create a segment id.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `index >= SEGMENT_COUNT`.
    #[inline]
    pub(crate) fn new(index: u16) -> Self {
        debug_assert!((index as usize) < SEGMENT_COUNT, "segment index out of range");
        Self(index)
    }

    /// Position of this segment in the pool.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Raw 16-bit value.
    #[inline]
    pub fn as_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegmentId({})", self.0)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored form of an optional [`SegmentId`].
///
/// ```text
/// +------------------+
/// |      15..0       |
/// |  segment index   |   0xFFFF = none
/// +------------------+
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Link(u16);

impl Link {
    /// Sentinel meaning "no segment" / end of chain.
    pub const NONE: Self = Self(u16::MAX);

    /// Zeroed storage, which names segment 0.
    pub(crate) const ZERO: Self = Self(0);

    /// Link pointing at `id`.
    #[inline]
    pub fn to(id: SegmentId) -> Self {
        Self(id.0)
    }

    /// The segment this link points at, if any.
    #[inline]
    pub fn get(self) -> Option<SegmentId> {
        if self.is_none() {
            None
        } else {
            Some(SegmentId(self.0))
        }
    }

    /// Check if this is the sentinel.
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl From<Option<SegmentId>> for Link {
    fn from(id: Option<SegmentId>) -> Self {
        id.map_or(Self::NONE, Self::to)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Link::NONE")
        } else {
            write!(f, "Link({})", self.0)
        }
    }
}

/// Caller-held reference to one queue.
///
/// A handle is only meaningful for the [`QueueManager`](crate::QueueManager)
/// that returned it. The generation lets the manager reject a handle whose
/// queue was destroyed, even after the slot has been claimed again.
///
/// The generation is 8 bits and wraps. A handle held across 256 reuses of
/// its slot matches the slot again, so `StaleHandle` catches most misuse but
/// is not a guarantee.
///
/// ```text
/// Raw encoding:
/// +------------+------------+
/// |   15..8    |    7..0    |
/// | generation |    slot    |
/// +------------+------------+
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle {
    slot: u8,
    generation: u8,
}

impl QueueHandle {
    pub(crate) fn new(slot: usize, generation: u8) -> Self {
        debug_assert!(slot < MAX_QUEUES);
        Self {
            slot: slot as u8,
            generation,
        }
    }

    /// Descriptor slot this handle refers to.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    /// Generation of the slot when the queue was created.
    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Pack into a 16-bit value.
    #[inline]
    pub fn as_raw(&self) -> u16 {
        (self.generation as u16) << 8 | self.slot as u16
    }

    /// Unpack a value produced by [`as_raw`](Self::as_raw).
    ///
    /// No validation happens here; a handle naming a slot outside the table
    /// is rejected by the manager when used.
    #[inline]
    pub fn from_raw(raw: u16) -> Self {
        Self {
            slot: raw as u8,
            generation: (raw >> 8) as u8,
        }
    }
}

impl fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueueHandle({}@{})", self.slot, self.generation)
    }
}
