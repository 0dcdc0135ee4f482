//! winpos Platform Win32
//!
//! Host backend for the winpos engine.
//!
//! This crate handles:
//! - Recording every position change the engine commits
//! - Binding engine windows to native HWNDs
//! - Mirroring committed changes onto bound HWNDs via SetWindowPos
//! - Native minimize/restore and foreground raising
//!
//! Native mirroring only exists on Windows. Elsewhere the backend records
//! changes and accepts them.

mod native;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use winpos_core::{
    BackendError, InsertAfter, PositionBackend, PositionChange, Rect, WindowId,
};

use native::NativeZ;

/// Errors that can occur during Win32 operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to set window position: {0}")]
    SetPositionFailed(String),

    #[error("Foreground change refused for native window {0:#x}")]
    ForegroundDenied(isize),

    #[error("Window {0} is not bound to a native handle")]
    Unbound(WindowId),

    #[error("Native window operations are not supported on this platform")]
    Unsupported,
}

/// Configuration for the host backend.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Mirror committed changes onto bound native windows.
    pub mirror_native: bool,
    /// Let the native side minimize and restore bound windows.
    pub native_iconic: bool,
    /// Refuse changes that would leave a window with a negative size.
    pub reject_negative_size: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            mirror_native: false,
            native_iconic: false,
            reject_negative_size: true,
        }
    }
}

/// Something the backend did on behalf of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Committed { window: WindowId, rect: Rect },
    Iconic { window: WindowId, iconic: bool },
    Raised(WindowId),
    Bound { window: WindowId, native: isize },
}

/// Shared view of the events a [`HostBackend`] has recorded.
///
/// The backend itself is moved into the window manager, so callers keep a
/// clone of the journal to inspect what happened.
#[derive(Debug, Clone, Default)]
pub struct HostJournal(Rc<RefCell<Vec<HostEvent>>>);

impl HostJournal {
    fn push(&self, event: HostEvent) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Position backend that records changes and optionally mirrors them onto
/// native windows.
#[derive(Debug)]
pub struct HostBackend {
    config: PlatformConfig,
    bindings: HashMap<WindowId, isize>,
    journal: HostJournal,
}

impl HostBackend {
    pub fn new(mut config: PlatformConfig) -> Self {
        if (config.mirror_native || config.native_iconic) && !native::AVAILABLE {
            tracing::warn!("native mirroring requested but unavailable, recording only");
            config.mirror_native = false;
            config.native_iconic = false;
        }
        Self {
            config,
            bindings: HashMap::new(),
            journal: HostJournal::default(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn journal(&self) -> HostJournal {
        self.journal.clone()
    }

    /// Associate an engine window with a native handle.
    pub fn bind(&mut self, window: WindowId, native: isize) -> Option<isize> {
        tracing::debug!(window, native, "bound native window");
        self.bindings.insert(window, native)
    }

    pub fn unbind(&mut self, window: WindowId) -> Option<isize> {
        self.bindings.remove(&window)
    }

    pub fn native_handle(&self, window: WindowId) -> Result<isize, PlatformError> {
        self.bindings
            .get(&window)
            .copied()
            .ok_or(PlatformError::Unbound(window))
    }

    fn native_z(&self, insert_after: InsertAfter) -> NativeZ {
        match insert_after {
            InsertAfter::Top => NativeZ::Top,
            InsertAfter::Bottom => NativeZ::Bottom,
            InsertAfter::After(other) => match self.bindings.get(&other) {
                Some(&raw) => NativeZ::After(raw),
                None => NativeZ::Keep,
            },
        }
    }

    fn mirror(&self, change: &PositionChange) -> Result<(), PlatformError> {
        let raw = self.native_handle(change.pos.window)?;
        let z = if change.pos.flags.contains(winpos_core::SwpFlags::NOZORDER) {
            NativeZ::Keep
        } else {
            self.native_z(change.pos.insert_after)
        };
        native::mirror_position(raw, z, change.window_rect, change.pos.flags.bits())
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl PositionBackend for HostBackend {
    fn commit(&mut self, change: &PositionChange) -> Result<(), BackendError> {
        let window = change.pos.window;
        let rect = change.window_rect;
        if self.config.reject_negative_size && (rect.width < 0 || rect.height < 0) {
            return Err(BackendError::Rejected(window, format!("negative size {rect:?}")));
        }

        if self.config.mirror_native && self.bindings.contains_key(&window) {
            self.mirror(change)
                .map_err(|e| BackendError::Rejected(window, e.to_string()))?;
        }

        tracing::trace!(window, ?rect, flags = ?change.pos.flags, "committed");
        self.journal.push(HostEvent::Committed { window, rect });
        Ok(())
    }

    fn bind_native(&mut self, window: WindowId, handle: isize) -> bool {
        self.bind(window, handle);
        self.journal.push(HostEvent::Bound {
            window,
            native: handle,
        });
        true
    }

    fn unbind_native(&mut self, window: WindowId) {
        if self.unbind(window).is_some() {
            tracing::debug!(window, "unbound native window");
        }
    }

    fn set_iconic_state(&mut self, window: WindowId, iconic: bool) -> bool {
        if !self.config.native_iconic {
            return false;
        }
        let Ok(raw) = self.native_handle(window) else {
            return false;
        };
        match native::set_minimized(raw, iconic) {
            Ok(()) => {
                tracing::debug!(window, iconic, "native iconic change");
                self.journal.push(HostEvent::Iconic { window, iconic });
                true
            }
            Err(e) => {
                tracing::warn!(window, "native iconic change failed: {e}");
                false
            }
        }
    }

    fn force_raise(&mut self, window: WindowId) {
        if self.config.mirror_native {
            if let Ok(raw) = self.native_handle(window) {
                if let Err(e) = native::raise(raw) {
                    tracing::warn!(window, "native raise failed: {e}");
                }
            }
        }
        self.journal.push(HostEvent::Raised(window));
    }
}
