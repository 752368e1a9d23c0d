//! Terminate-on-fault policy.
//!
//! The engine reports faults as [`QueueError`] values. Programs that treat
//! every fault as unrecoverable pass the error to [`exit_on`], which prints
//! the diagnostic to stdout and ends the process with [`EXIT_CODE`].

use std::io::Write;

use tracing::error;

use crate::error::QueueError;

/// Exit status for every fault kind.
pub const EXIT_CODE: i32 = 1;

/// The one-line diagnostic printed before exiting.
pub fn diagnostic(error: &QueueError) -> &'static str {
    match error {
        QueueError::OutOfMemory(_) => "QueueManager: out of memory",
        QueueError::IllegalOperation(_) => "QueueManager: illegal operation",
    }
}

/// Print the diagnostic for `error` and terminate the process.
pub fn exit_on(error: QueueError) -> ! {
    error!(%error, "unrecoverable queue fault");

    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}", diagnostic(&error));
    let _ = stdout.flush();

    std::process::exit(EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Exhausted, Illegal};

    #[test]
    fn test_diagnostic_per_kind() {
        assert_eq!(
            diagnostic(&QueueError::OutOfMemory(Exhausted::Descriptors)),
            "QueueManager: out of memory"
        );
        assert_eq!(
            diagnostic(&QueueError::OutOfMemory(Exhausted::Segments)),
            "QueueManager: out of memory"
        );
        assert_eq!(
            diagnostic(&QueueError::IllegalOperation(Illegal::StaleHandle)),
            "QueueManager: illegal operation"
        );
    }
}
