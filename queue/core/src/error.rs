//! Error types for queue operations.
//!
//! There are two kinds of fault. Neither is expected to be recovered from:
//! callers either plan capacity and handle usage so they never occur, or
//! terminate (see [`exit_on`](crate::exit_on)).

use thiserror::Error;

/// Errors that can occur during queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A fixed-capacity resource has run out.
    #[error("out of memory: {0}")]
    OutOfMemory(Exhausted),

    /// The caller misused a handle or read from an empty queue.
    #[error("illegal operation: {0}")]
    IllegalOperation(Illegal),
}

impl QueueError {
    /// Whether this is a capacity fault.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory(_))
    }

    /// Whether this is a caller-misuse fault.
    pub fn is_illegal_operation(&self) -> bool {
        matches!(self, Self::IllegalOperation(_))
    }
}

/// Which resource ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Exhausted {
    /// Every descriptor slot holds a live queue.
    #[error("all queue descriptors in use")]
    Descriptors,

    /// Free list empty and every segment handed out.
    #[error("segment pool exhausted")]
    Segments,
}

/// What the caller did wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Illegal {
    /// The caller had no handle to pass (a null handle).
    #[error("missing queue handle")]
    MissingHandle,

    /// Handle names a slot outside the descriptor table.
    #[error("handle outside descriptor table")]
    SlotOutOfRange,

    /// Handle names a slot with no live queue.
    #[error("queue not in use")]
    SlotNotInUse,

    /// Handle belongs to a queue that was destroyed; the slot now holds a
    /// newer queue.
    #[error("stale queue handle")]
    StaleHandle,

    /// Dequeue on an empty queue.
    #[error("dequeue from empty queue")]
    EmptyQueue,
}

impl From<Exhausted> for QueueError {
    fn from(kind: Exhausted) -> Self {
        Self::OutOfMemory(kind)
    }
}

impl From<Illegal> for QueueError {
    fn from(kind: Illegal) -> Self {
        Self::IllegalOperation(kind)
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        assert_eq!(
            format!("{}", QueueError::OutOfMemory(Exhausted::Descriptors)),
            "out of memory: all queue descriptors in use"
        );
        assert_eq!(
            format!("{}", QueueError::OutOfMemory(Exhausted::Segments)),
            "out of memory: segment pool exhausted"
        );
        assert_eq!(
            format!("{}", QueueError::IllegalOperation(Illegal::MissingHandle)),
            "illegal operation: missing queue handle"
        );
        assert_eq!(
            format!("{}", QueueError::IllegalOperation(Illegal::SlotOutOfRange)),
            "illegal operation: handle outside descriptor table"
        );
        assert_eq!(
            format!("{}", QueueError::IllegalOperation(Illegal::SlotNotInUse)),
            "illegal operation: queue not in use"
        );
        assert_eq!(
            format!("{}", QueueError::IllegalOperation(Illegal::StaleHandle)),
            "illegal operation: stale queue handle"
        );
        assert_eq!(
            format!("{}", QueueError::IllegalOperation(Illegal::EmptyQueue)),
            "illegal operation: dequeue from empty queue"
        );
    }

    #[test]
    fn test_error_is_error_trait() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<QueueError>();
    }

    #[test]
    fn test_kind_predicates() {
        let oom = QueueError::from(Exhausted::Segments);
        assert!(oom.is_out_of_memory());
        assert!(!oom.is_illegal_operation());

        let illegal = QueueError::from(Illegal::EmptyQueue);
        assert!(illegal.is_illegal_operation());
        assert!(!illegal.is_out_of_memory());
    }

    #[test]
    fn test_queue_result_err() {
        let result: QueueResult<u8> = Err(Illegal::SlotNotInUse.into());
        assert!(matches!(
            result,
            Err(QueueError::IllegalOperation(Illegal::SlotNotInUse))
        ));
    }
}
