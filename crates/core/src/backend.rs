//! The host seam: where committed positions leave the engine.

use thiserror::Error;

use crate::geometry::Rect;
use crate::position::WindowPos;
use crate::window::WindowId;

/// Errors raised by a position backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Host rejected position change for window {0}: {1}")]
    Rejected(WindowId, String),

    #[error("Host backend unavailable: {0}")]
    Unavailable(String),
}

/// A position change that passed validation and is about to be stored.
/// Rectangles are in parent client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub pos: WindowPos,
    pub window_rect: Rect,
    pub client_rect: Rect,
}

/// Host operations the engine delegates to.
pub trait PositionBackend {
    /// Apply a validated change. An error aborts the `set_window_pos` call
    /// before any window state is modified.
    fn commit(&mut self, change: &PositionChange) -> Result<(), BackendError>;

    /// Let the host handle minimizing or restoring natively. Returning true
    /// means the host did it and the engine skips its own positioning.
    fn set_iconic_state(&mut self, _window: WindowId, _iconic: bool) -> bool {
        false
    }

    /// Raise a window when activation started from no previously active
    /// window.
    fn force_raise(&mut self, _window: WindowId) {}

    /// Attach a host window handle to an engine window. Returns false when
    /// the host has no native windows to attach.
    fn bind_native(&mut self, _window: WindowId, _handle: isize) -> bool {
        false
    }

    /// Forget the host handle of a window that is being destroyed.
    fn unbind_native(&mut self, _window: WindowId) {}
}

/// Backend that accepts every change and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl PositionBackend for NullBackend {
    fn commit(&mut self, _change: &PositionChange) -> Result<(), BackendError> {
        Ok(())
    }
}
