//! Fatal failure handling.
//!
//! Operations whose failure policy is `Abort` escalate here instead of
//! reporting back to the caller. The default handler terminates the process.

use crate::application::Operation;
use crate::application::ports::VenueError;

/// Receives failures the adapter must not continue past.
pub trait FatalHandler: Send + Sync {
    /// Handle an aborted operation.
    ///
    /// If this returns, the caller's continuation receives
    /// `GatewayError::Fatal`.
    fn abort(&self, operation: Operation, error: &VenueError);
}

/// Logs the failure and exits the process with status 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcess;

impl FatalHandler for ExitProcess {
    fn abort(&self, operation: Operation, error: &VenueError) {
        tracing::error!(
            operation = %operation,
            error = %error,
            "Unrecoverable venue failure, terminating"
        );
        std::process::exit(1);
    }
}
