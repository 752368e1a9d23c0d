//! Byte FIFO queues sharing one fixed-size storage region.
//!
//! This crate provides up to [`MAX_QUEUES`] independent byte queues whose
//! entire state lives in a single [`REGION_SIZE`]-byte value. Nothing is
//! allocated on the heap: queue contents are stored in chains of fixed-size
//! segments drawn from a pool inside the region.
//!
//! # Architecture
//!
//! ```text
//! +---------------------------------------------------+
//! |                  QueueManager                     |
//! |                                                   |
//! |  +----------------------+  +--------------------+ |
//! |  | Descriptor table     |  | Allocator state    | |
//! |  | 64 x (head, tail,    |  | free-list head     | |
//! |  |  offsets, in_use)    |  | next-unused mark   | |
//! |  +----------+-----------+  +---------+----------+ |
//! |             |                        |            |
//! |             v                        v            |
//! |  +---------------------------------------------+  |
//! |  | Segment pool: 95 x (next link, 14B payload) |  |
//! |  |  queue A: [3] -> [7] -> [8]                 |  |
//! |  |  free:    [5] -> [1]                        |  |
//! |  +---------------------------------------------+  |
//! +---------------------------------------------------+
//! ```
//!
//! # Properties
//!
//! - O(1) enqueue and dequeue
//! - Strict FIFO order per queue, no interference between queues
//! - Freed segments are reused (LIFO) before untouched ones
//! - Faults are returned as [`QueueError`]; nothing panics on misuse
//!
//! # Example
//!
//! ```
//! use queue_core::QueueManager;
//!
//! let mut manager = QueueManager::new();
//! let queue = manager.create_queue()?;
//!
//! manager.enqueue_byte(queue, 1)?;
//! manager.enqueue_byte(queue, 2)?;
//! assert_eq!(manager.dequeue_byte(queue)?, 1);
//! assert_eq!(manager.dequeue_byte(queue)?, 2);
//!
//! manager.destroy_queue(queue)?;
//! # Ok::<(), queue_core::QueueError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod descriptor;
mod error;
mod fatal;
mod index;
mod layout;
mod manager;
mod segment;

pub use error::{Exhausted, Illegal, QueueError, QueueResult};
pub use fatal::{EXIT_CODE, diagnostic, exit_on};
pub use index::{Link, QueueHandle, SegmentId};
pub use layout::{
    BYTE_CAPACITY, DESCRIPTOR_SIZE, GLOBAL_STATE_SIZE, MAX_QUEUES, REGION_SIZE, SEGMENT_COUNT,
    SEGMENT_PAYLOAD, SEGMENT_SIZE,
};
pub use manager::QueueManager;
pub use segment::PoolStats;
