//! Moving, sizing, restacking and showing windows.

use tracing::{debug, trace, warn};

use crate::backend::PositionChange;
use crate::manager::WindowManager;
use crate::message::Message;
use crate::style::{Style, SwpFlags};
use crate::window::{InsertAfter, WindowId};

/// A requested position change.
///
/// `x`/`y` and `cx`/`cy` are in the parent's client coordinates and are
/// ignored when `NOMOVE` or `NOSIZE` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPos {
    pub window: WindowId,
    pub insert_after: InsertAfter,
    pub x: i32,
    pub y: i32,
    pub cx: i32,
    pub cy: i32,
    pub flags: SwpFlags,
}

impl WindowPos {
    pub fn new(
        window: WindowId,
        insert_after: InsertAfter,
        x: i32,
        y: i32,
        cx: i32,
        cy: i32,
        flags: SwpFlags,
    ) -> Self {
        Self {
            window,
            insert_after,
            x,
            y,
            cx,
            cy,
            flags,
        }
    }
}

impl WindowManager {
    /// Change a window's size, position, z-order and visibility in one step.
    #[allow(clippy::too_many_arguments)]
    pub fn set_window_pos(
        &mut self,
        hwnd: WindowId,
        insert_after: InsertAfter,
        x: i32,
        y: i32,
        cx: i32,
        cy: i32,
        flags: SwpFlags,
    ) -> bool {
        self.apply_window_pos(WindowPos::new(hwnd, insert_after, x, y, cx, cy, flags))
    }

    /// Move and resize without touching z-order or activation.
    pub fn move_window(&mut self, hwnd: WindowId, x: i32, y: i32, cx: i32, cy: i32, repaint: bool) -> bool {
        let mut flags = SwpFlags::NOZORDER | SwpFlags::NOACTIVATE;
        if !repaint {
            flags |= SwpFlags::NOREDRAW;
        }
        self.set_window_pos(hwnd, InsertAfter::Top, x, y, cx, cy, flags)
    }

    /// Raise a window to the top of its siblings and activate it.
    pub fn bring_window_to_top(&mut self, hwnd: WindowId) -> bool {
        self.set_window_pos(hwnd, InsertAfter::Top, 0, 0, 0, 0, SwpFlags::NOMOVE | SwpFlags::NOSIZE)
    }

    pub(crate) fn apply_window_pos(&mut self, mut pos: WindowPos) -> bool {
        let hwnd = pos.window;
        if hwnd == self.desktop() {
            debug!("refusing to reposition the desktop window");
            return false;
        }
        let Some(rec) = self.windows.get(hwnd) else {
            debug!(window = hwnd, "set_window_pos on unknown window");
            return false;
        };

        if rec.style.contains(Style::VISIBLE) {
            pos.flags.remove(SwpFlags::SHOWWINDOW);
        } else {
            pos.flags.remove(SwpFlags::HIDEWINDOW);
            if !pos.flags.contains(SwpFlags::SHOWWINDOW) {
                pos.flags.insert(SwpFlags::NOREDRAW);
            }
        }
        pos.cx = pos.cx.max(0);
        pos.cy = pos.cy.max(0);
        if rec.window_rect.width == pos.cx && rec.window_rect.height == pos.cy {
            pos.flags.insert(SwpFlags::NOSIZE);
        }
        if rec.window_rect.x == pos.x && rec.window_rect.y == pos.y {
            pos.flags.insert(SwpFlags::NOMOVE);
        }
        if pos.insert_after == InsertAfter::After(hwnd) {
            pos.flags.insert(SwpFlags::NOZORDER);
        }

        let mut msg = Message::WindowPosChanging(pos);
        self.send_message(hwnd, &mut msg);
        if let Message::WindowPosChanging(adjusted) = msg {
            pos = WindowPos {
                window: hwnd,
                ..adjusted
            };
        }
        let Some(rec) = self.windows.get(hwnd) else {
            return false;
        };

        let old_window = rec.window_rect;
        let old_client = rec.client_rect;
        let mut new_window = old_window;
        if !pos.flags.contains(SwpFlags::NOMOVE) {
            new_window.x = pos.x;
            new_window.y = pos.y;
        }
        if !pos.flags.contains(SwpFlags::NOSIZE) {
            new_window.width = pos.cx.max(0);
            new_window.height = pos.cy.max(0);
        }

        let new_client = if pos.flags.contains(SwpFlags::NOSIZE) && !pos.flags.contains(SwpFlags::FRAMECHANGED) {
            old_client.offset(new_window.x - old_window.x, new_window.y - old_window.y)
        } else {
            let mut calc = Message::NcCalcSize {
                window: new_window,
                client: new_window,
            };
            self.send_message(hwnd, &mut calc);
            if !self.is_window(hwnd) {
                return false;
            }
            match calc {
                Message::NcCalcSize { client, .. } if client.width >= 0 && client.height >= 0 => {
                    new_window.intersection(&client)
                }
                _ => new_window,
            }
        };

        let change = PositionChange {
            pos,
            window_rect: new_window,
            client_rect: new_client,
        };
        if let Err(e) = self.backend.commit(&change) {
            warn!(window = hwnd, error = %e, "backend rejected position change");
            return false;
        }

        let Some(rec) = self.windows.get_mut(hwnd) else {
            return false;
        };
        rec.window_rect = new_window;
        rec.client_rect = new_client;
        if pos.flags.contains(SwpFlags::SHOWWINDOW) {
            rec.style.insert(Style::VISIBLE);
        } else if pos.flags.contains(SwpFlags::HIDEWINDOW) {
            rec.style.remove(Style::VISIBLE);
        }
        if !pos.flags.contains(SwpFlags::NOZORDER) {
            self.windows.restack(hwnd, pos.insert_after);
        }
        trace!(
            window = hwnd,
            x = new_window.x,
            y = new_window.y,
            width = new_window.width,
            height = new_window.height,
            flags = ?pos.flags,
            "position committed"
        );

        let visible = self.windows.is_visible(hwnd);
        if !pos.flags.contains(SwpFlags::NOACTIVATE) && visible {
            self.change_active_window(Some(hwnd), false);
        }

        if self.is_window(hwnd) {
            let mut changed = Message::WindowPosChanged(pos);
            self.send_message(hwnd, &mut changed);
        }
        true
    }

    /// Default clamp applied before a size change: never larger than the
    /// maximized size, and never below the minimum tracking size unless
    /// minimized. Applies to sizing-frame windows and plain overlapped
    /// windows.
    pub(crate) fn handle_window_pos_changing(&mut self, hwnd: WindowId, pos: &mut WindowPos) {
        if pos.flags.contains(SwpFlags::NOSIZE) {
            return;
        }
        let Some(style) = self.style(hwnd) else {
            return;
        };
        if !style.contains(Style::THICKFRAME) && style.intersects(Style::POPUP | Style::CHILD) {
            return;
        }
        let info = self.get_min_max_info(hwnd);
        pos.cx = pos.cx.min(info.max_size.width);
        pos.cy = pos.cy.min(info.max_size.height);
        if !style.contains(Style::MINIMIZE) {
            pos.cx = pos.cx.max(info.min_track.width);
            pos.cy = pos.cy.max(info.min_track.height);
        }
    }
}
