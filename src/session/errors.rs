use thiserror::Error;

use super::state::SessionStatus;

/// Precondition violations of the session machine. These are caller bugs,
/// not runtime faults; the state is left untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {operation} while session is {status}")]
    InvalidStateTransition {
        operation: &'static str,
        status: SessionStatus,
    },
    #[error("program has no segments")]
    EmptyProgram,
    #[error("session duration must be greater than zero")]
    ZeroDuration,
}

impl SessionError {
    pub(crate) fn invalid(operation: &'static str, status: SessionStatus) -> Self {
        SessionError::InvalidStateTransition { operation, status }
    }
}
