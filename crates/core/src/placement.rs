//! Remembered normal, minimized and maximized positions.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::geometry::{Point, Rect};
use crate::manager::WindowManager;
use crate::message::Message;
use crate::minmax::ShowCommand;
use crate::style::{ExStyle, Style, SwpFlags};
use crate::window::{InsertAfter, WindowDesc, WindowId};

/// Per-window placement memory, created lazily on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalPlacement {
    /// Rectangle to restore to.
    pub normal: Rect,
    /// Icon slot while minimized; `None` until one is assigned.
    pub icon_pos: Option<Point>,
    /// Origin while maximized; `None` until one is assigned.
    pub max_pos: Option<Point>,
    /// Restoring from minimized goes to maximized.
    pub restore_to_maximized: bool,
    pub icon_title: Option<WindowId>,
}

impl InternalPlacement {
    fn new(normal: Rect) -> Self {
        Self {
            normal,
            icon_pos: None,
            max_pos: None,
            restore_to_maximized: false,
            icon_title: None,
        }
    }
}

/// Public placement snapshot, as exchanged with applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    pub show_cmd: ShowCommand,
    /// Honour `min_position` even for a window that is not minimized yet.
    #[serde(default)]
    pub set_min_position: bool,
    #[serde(default)]
    pub restore_to_maximized: bool,
    #[serde(default)]
    pub min_position: Option<Point>,
    #[serde(default)]
    pub max_position: Option<Point>,
    pub normal_position: Rect,
}

/// Which placement fields a `set_placement` call updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlaceFields {
    min: bool,
    max: bool,
    rect: bool,
}

impl PlaceFields {
    const ALL: Self = Self {
        min: true,
        max: true,
        rect: true,
    };
}

impl WindowManager {
    /// Create the placement record if needed and store the position
    /// matching the window's current state.
    pub(crate) fn init_internal_pos(&mut self, hwnd: WindowId, pt: Point, restore: Option<Rect>) -> bool {
        let Some(rec) = self.windows.get_mut(hwnd) else {
            return false;
        };
        let window_rect = rec.window_rect;
        let style = rec.style;
        let placement = rec
            .placement
            .get_or_insert_with(|| InternalPlacement::new(window_rect));
        if style.contains(Style::MINIMIZE) {
            placement.icon_pos = Some(pt);
        } else if style.contains(Style::MAXIMIZE) {
            placement.max_pos = Some(pt);
        } else if let Some(r) = restore {
            placement.normal = r;
        }
        true
    }

    pub fn get_window_placement(&mut self, hwnd: WindowId) -> Option<WindowPlacement> {
        let rec = self.windows.get(hwnd)?;
        let (origin, current) = (rec.window_rect.origin(), rec.window_rect);
        self.init_internal_pos(hwnd, origin, Some(current));
        let rec = self.windows.get(hwnd)?;
        let placement = rec.placement.as_ref()?;
        let show_cmd = if rec.style.contains(Style::MINIMIZE) {
            ShowCommand::ShowMinimized
        } else if rec.style.contains(Style::MAXIMIZE) {
            ShowCommand::ShowMaximized
        } else {
            ShowCommand::ShowNormal
        };
        Some(WindowPlacement {
            show_cmd,
            set_min_position: false,
            restore_to_maximized: placement.restore_to_maximized,
            min_position: placement.icon_pos,
            max_position: placement.max_pos,
            normal_position: placement.normal,
        })
    }

    pub fn set_window_placement(&mut self, hwnd: WindowId, wp: &WindowPlacement) -> bool {
        self.set_placement(hwnd, wp, PlaceFields::ALL)
    }

    fn set_placement(&mut self, hwnd: WindowId, wp: &WindowPlacement, fields: PlaceFields) -> bool {
        let Some(rec) = self.windows.get(hwnd) else {
            return false;
        };
        let (origin, current) = (rec.window_rect.origin(), rec.window_rect);
        self.init_internal_pos(hwnd, origin, Some(current));

        let Some(placement) = self.windows.get_mut(hwnd).and_then(|r| r.placement.as_mut()) else {
            return false;
        };
        if fields.min {
            placement.icon_pos = wp.min_position;
        }
        if fields.max {
            placement.max_pos = wp.max_position;
        }
        if fields.rect {
            placement.normal = wp.normal_position;
        }
        let (icon_pos, max_pos, normal) = (placement.icon_pos, placement.max_pos, placement.normal);

        let keep = SwpFlags::NOSIZE | SwpFlags::NOZORDER | SwpFlags::NOACTIVATE;
        if self.is_iconic(hwnd) {
            self.show_icon_title(hwnd, false);
            if let (true, Some(pt)) = (wp.set_min_position, icon_pos) {
                self.set_window_pos(hwnd, InsertAfter::Top, pt.x, pt.y, 0, 0, keep);
            }
        } else if self.is_zoomed(hwnd) {
            if let Some(pt) = max_pos {
                self.set_window_pos(hwnd, InsertAfter::Top, pt.x, pt.y, 0, 0, keep);
            }
        } else if fields.rect {
            self.set_window_pos(
                hwnd,
                InsertAfter::Top,
                normal.x,
                normal.y,
                normal.width,
                normal.height,
                SwpFlags::NOZORDER | SwpFlags::NOACTIVATE,
            );
        }

        self.show_window(hwnd, wp.show_cmd);

        if self.is_iconic(hwnd) {
            if self.windows.is_visible(hwnd) {
                self.show_icon_title(hwnd, true);
            }
            if wp.restore_to_maximized {
                if let Some(p) = self.windows.get_mut(hwnd).and_then(|r| r.placement.as_mut()) {
                    p.restore_to_maximized = true;
                }
            }
        }
        true
    }

    /// Legacy form: state, normal rectangle and icon position.
    pub fn get_internal_window_pos(&mut self, hwnd: WindowId) -> Option<(ShowCommand, Rect, Option<Point>)> {
        let wp = self.get_window_placement(hwnd)?;
        Some((wp.show_cmd, wp.normal_position, wp.min_position))
    }

    /// Legacy form of `set_window_placement`; only the fields supplied
    /// are updated.
    pub fn set_internal_window_pos(
        &mut self,
        hwnd: WindowId,
        show_cmd: ShowCommand,
        rect: Option<Rect>,
        pt: Option<Point>,
    ) -> bool {
        let wp = WindowPlacement {
            show_cmd,
            set_min_position: pt.is_some(),
            restore_to_maximized: false,
            min_position: pt,
            max_position: None,
            normal_position: rect.unwrap_or_default(),
        };
        let fields = PlaceFields {
            min: pt.is_some(),
            max: false,
            rect: rect.is_some(),
        };
        self.set_placement(hwnd, &wp, fields)
    }

    fn live_icon_title(&self, hwnd: WindowId) -> Option<WindowId> {
        self.windows
            .get(hwnd)?
            .placement
            .as_ref()?
            .icon_title
            .filter(|&t| self.is_window(t))
    }

    /// Show or hide the caption window under a minimized window's icon,
    /// creating it on first use.
    pub(crate) fn show_icon_title(&mut self, hwnd: WindowId, show: bool) -> bool {
        let Some(rec) = self.windows.get(hwnd) else {
            return false;
        };
        if rec.placement.is_none() || rec.ex_style.contains(ExStyle::MANAGED) {
            return false;
        }
        let title = match self.live_icon_title(hwnd) {
            Some(t) => t,
            None => {
                if !show {
                    return false;
                }
                let Some(t) = self.create_icon_title(hwnd) else {
                    warn!(window = hwnd, "failed to create icon title");
                    return false;
                };
                if let Some(p) = self.windows.get_mut(hwnd).and_then(|r| r.placement.as_mut()) {
                    p.icon_title = Some(t);
                }
                t
            }
        };

        if show {
            let Some(icon) = self.windows.get(hwnd).map(|r| r.window_rect) else {
                return false;
            };
            let at = self.icon_title_rect(icon);
            let visible = self.style(title).is_some_and(|s| s.contains(Style::VISIBLE));
            let mut flags = SwpFlags::NOSIZE | SwpFlags::NOZORDER | SwpFlags::NOACTIVATE;
            if !visible {
                self.send_message(title, &mut Message::ShowWindow { show: true });
                flags |= SwpFlags::SHOWWINDOW;
            }
            self.set_window_pos(title, InsertAfter::Top, at.x, at.y, 0, 0, flags)
        } else {
            self.show_window(title, ShowCommand::Hide);
            true
        }
    }

    fn icon_title_rect(&self, icon: Rect) -> Rect {
        let width = self.metrics.icon_spacing.width;
        Rect::new(
            icon.x + icon.width / 2 - width / 2,
            icon.bottom(),
            width,
            self.metrics.caption_height,
        )
    }

    fn create_icon_title(&mut self, owner: WindowId) -> Option<WindowId> {
        let rec = self.windows.get(owner)?;
        let kind = if rec.style.contains(Style::CHILD) {
            Style::CHILD
        } else {
            Style::POPUP
        };
        let style = kind | (rec.style & Style::DISABLED);
        let desc = WindowDesc {
            parent: rec.parent,
            owner: Some(owner),
            style,
            ex_style: ExStyle::empty(),
            rect: self.icon_title_rect(rec.window_rect),
            client_rect: None,
            queue: Some(rec.queue),
            region: None,
        };
        let title = self.create_window(desc)?;
        trace!(window = owner, title, "icon title created");
        Some(title)
    }

    /// Repaint a minimized window's title after an activation change.
    pub(crate) fn redraw_icon_title(&mut self, hwnd: WindowId) -> bool {
        match self.live_icon_title(hwnd) {
            Some(title) => {
                trace!(window = hwnd, title, "icon title repaint");
                self.send_message(title, &mut Message::ShowWindow { show: true })
            }
            None => false,
        }
    }

    /// Drop every reference the activation state and placement records
    /// hold to a window that is going away.
    pub(crate) fn check_internal_pos(&mut self, hwnd: WindowId) {
        if self.activation.prev_active == Some(hwnd) {
            self.activation.prev_active = None;
        }
        let Some(queue) = self.windows.queue(hwnd) else {
            return;
        };
        if let Some(mut guard) = self.queues.lock(queue) {
            if guard.active() == Some(hwnd) {
                warn!(window = hwnd, "active window destroyed while still active");
                guard.set_active(None);
            }
        }
        if let Some(title) = self.live_icon_title(hwnd) {
            if let Some(p) = self.windows.get_mut(hwnd).and_then(|r| r.placement.as_mut()) {
                p.icon_title = None;
            }
            self.destroy_window(title);
        }
    }
}
