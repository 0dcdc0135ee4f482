//! Notifications delivered to window procedures.
//!
//! A [`Message`] carries its reply in place: handlers that answer a query
//! (hit test, size limits, activation veto) write into the message fields
//! before returning.

use crate::geometry::{Point, Rect, Size};
use crate::hittest::HitTest;
use crate::manager::WindowManager;
use crate::position::WindowPos;
use crate::queue::TaskId;
use crate::window::WindowId;

/// How a window is being activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateState {
    Inactive,
    Active,
    ClickActive,
}

/// The size state reported with a size notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
}

/// Size limits for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinMaxInfo {
    pub max_size: Size,
    pub max_position: Point,
    pub min_track: Size,
    pub max_track: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A minimized window is about to be restored. Clear `allow` to refuse.
    QueryOpen { allow: bool },
    /// Size limits query; handlers may adjust the proposal.
    GetMinMaxInfo(MinMaxInfo),
    /// Compute the client area for a proposed window rectangle. Both
    /// rectangles are in parent client coordinates.
    NcCalcSize { window: Rect, client: Rect },
    /// Caption repaint for (de)activation. Clearing `allow` on a
    /// deactivation vetoes the activation change.
    NcActivate { active: bool, allow: bool },
    Activate {
        state: ActivateState,
        minimized: bool,
        other: Option<WindowId>,
    },
    ActivateApp {
        active: bool,
        other_task: Option<TaskId>,
    },
    ChildActivate,
    ShowWindow { show: bool },
    WindowPosChanging(WindowPos),
    WindowPosChanged(WindowPos),
    Size { kind: SizeKind, width: i32, height: i32 },
    Move { x: i32, y: i32 },
    /// Screen-coordinate hit test.
    NcHitTest { point: Point, result: HitTest },
    /// Set `realized` when the window realized a palette on activation.
    QueryNewPalette { realized: bool },
    PaletteIsChanging { source: WindowId },
    SetFocus { previous: Option<WindowId> },
    KillFocus { next: Option<WindowId> },
}

/// Whether the window procedure fully handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// Run the default handling as well.
    Default,
}

/// Per-window message handler.
///
/// The handler gets the whole manager, so it may call back into any
/// positioning or activation operation. The window it was invoked for can
/// be destroyed by such a call; callers re-validate afterwards.
pub trait WindowProc {
    fn handle(&mut self, wm: &mut WindowManager, hwnd: WindowId, msg: &mut Message) -> Dispatch;
}

impl<F> WindowProc for F
where
    F: FnMut(&mut WindowManager, WindowId, &mut Message) -> Dispatch,
{
    fn handle(&mut self, wm: &mut WindowManager, hwnd: WindowId, msg: &mut Message) -> Dispatch {
        self(wm, hwnd, msg)
    }
}
