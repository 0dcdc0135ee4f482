//! Thin wrappers over the Win32 positioning calls.
//!
//! Handles are carried as raw `isize` so the rest of the crate builds on
//! every target. Off Windows every call reports [`PlatformError::Unsupported`].

use winpos_core::Rect;

use crate::PlatformError;

/// Where a mirrored window lands in the native z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NativeZ {
    Top,
    Bottom,
    After(isize),
    Keep,
}

#[cfg(windows)]
mod imp {
    use super::NativeZ;
    use crate::PlatformError;
    use std::ffi::c_void;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        SetForegroundWindow, SetWindowPos, ShowWindow, HWND_BOTTOM, HWND_TOP,
        SET_WINDOW_POS_FLAGS, SWP_NOACTIVATE, SWP_NOZORDER, SW_MINIMIZE, SW_RESTORE,
    };
    use winpos_core::Rect;

    pub(crate) const AVAILABLE: bool = true;

    fn hwnd(raw: isize) -> HWND {
        HWND(raw as *mut c_void)
    }

    pub(crate) fn set_window_pos(
        raw: isize,
        z: NativeZ,
        rect: Rect,
        flags: u32,
    ) -> Result<(), PlatformError> {
        // Activation is decided by the engine, never by the native call.
        let mut native_flags = SET_WINDOW_POS_FLAGS(flags) | SWP_NOACTIVATE;
        let after = match z {
            NativeZ::Top => Some(HWND_TOP),
            NativeZ::Bottom => Some(HWND_BOTTOM),
            NativeZ::After(other) => Some(hwnd(other)),
            NativeZ::Keep => {
                native_flags |= SWP_NOZORDER;
                None
            }
        };
        unsafe {
            SetWindowPos(
                hwnd(raw),
                after,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                native_flags,
            )
        }
        .map_err(|e| PlatformError::SetPositionFailed(e.to_string()))
    }

    pub(crate) fn set_minimized(raw: isize, minimized: bool) -> Result<(), PlatformError> {
        let cmd = if minimized { SW_MINIMIZE } else { SW_RESTORE };
        // The return value is the previous visibility, not a status.
        let _ = unsafe { ShowWindow(hwnd(raw), cmd) };
        Ok(())
    }

    pub(crate) fn raise(raw: isize) -> Result<(), PlatformError> {
        if unsafe { SetForegroundWindow(hwnd(raw)) }.as_bool() {
            Ok(())
        } else {
            Err(PlatformError::ForegroundDenied(raw))
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use super::NativeZ;
    use crate::PlatformError;
    use winpos_core::Rect;

    pub(crate) const AVAILABLE: bool = false;

    pub(crate) fn set_window_pos(
        _raw: isize,
        _z: NativeZ,
        _rect: Rect,
        _flags: u32,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    pub(crate) fn set_minimized(_raw: isize, _minimized: bool) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    pub(crate) fn raise(_raw: isize) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }
}

pub(crate) use imp::{raise, set_minimized, AVAILABLE};

/// Mirror a committed window rectangle onto a native handle.
pub(crate) fn mirror_position(
    raw: isize,
    z: NativeZ,
    rect: Rect,
    flags: u32,
) -> Result<(), PlatformError> {
    imp::set_window_pos(raw, z, rect, flags)
}
