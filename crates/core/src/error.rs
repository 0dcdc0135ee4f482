use thiserror::Error;

use crate::window::WindowId;

/// Errors reported by the fallible window-positioning operations.
///
/// Most operations follow the host convention of returning `false` or
/// `None` on failure; only the deferred batch API surfaces typed errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WinPosError {
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    #[error("The desktop window cannot be repositioned")]
    DesktopWindow,

    #[error("Invalid batch size {0}")]
    InvalidCount(i32),

    #[error("Failed to reserve room for {0} deferred positions")]
    ResourceExhausted(usize),
}
