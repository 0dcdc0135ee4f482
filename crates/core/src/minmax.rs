//! Minimize, maximize, restore and show commands.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::{Point, Rect};
use crate::hook::CbtEvent;
use crate::manager::{size_kind, WindowManager};
use crate::message::{Message, MinMaxInfo};
use crate::style::{ExStyle, Style, SwpFlags, WindowFlags};
use crate::window::{InsertAfter, WindowId};

/// Show commands accepted by [`WindowManager::show_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowCommand {
    Hide,
    ShowNormal,
    ShowMinimized,
    ShowMaximized,
    ShowNoActivate,
    Show,
    Minimize,
    ShowMinNoActive,
    ShowNa,
    Restore,
    ShowDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Minimize,
    Maximize,
    Restore,
}

impl ShowCommand {
    fn transition(self) -> Transition {
        match self {
            ShowCommand::Minimize | ShowCommand::ShowMinimized | ShowCommand::ShowMinNoActive => {
                Transition::Minimize
            }
            ShowCommand::ShowMaximized => Transition::Maximize,
            _ => Transition::Restore,
        }
    }
}

/// Where a minimize, maximize or restore wants the window to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMaxOutcome {
    /// Flags to pass to `set_window_pos`.
    pub flags: SwpFlags,
    /// Target window rectangle in parent client coordinates.
    pub rect: Rect,
    /// The host already performed the change natively.
    pub skip_positioning: bool,
}

impl MinMaxOutcome {
    fn unchanged() -> Self {
        Self {
            flags: SwpFlags::NOSIZE | SwpFlags::NOMOVE,
            rect: Rect::default(),
            skip_positioning: false,
        }
    }
}

impl WindowManager {
    pub fn is_iconic(&self, hwnd: WindowId) -> bool {
        self.style(hwnd).is_some_and(|s| s.contains(Style::MINIMIZE))
    }

    pub fn is_zoomed(&self, hwnd: WindowId) -> bool {
        self.style(hwnd).is_some_and(|s| s.contains(Style::MAXIMIZE))
    }

    /// Size limits for a window after the window procedure had its say.
    pub fn get_min_max_info(&mut self, hwnd: WindowId) -> MinMaxInfo {
        let screen = self.metrics.screen;
        let (inset, stored_max) = match self.windows.get(hwnd) {
            Some(rec) => (
                self.frame_inset(rec.style, rec.ex_style),
                rec.placement.as_ref().and_then(|p| p.max_pos),
            ),
            None => (Default::default(), None),
        };
        let mut info = MinMaxInfo {
            max_size: crate::geometry::Size::new(
                screen.width + 2 * inset.width,
                screen.height + 2 * inset.height,
            ),
            max_position: stored_max.unwrap_or(Point::new(-inset.width, -inset.height)),
            min_track: self.metrics.min_track,
            max_track: screen,
        };
        let mut msg = Message::GetMinMaxInfo(info);
        self.send_message(hwnd, &mut msg);
        if let Message::GetMinMaxInfo(answer) = msg {
            info = answer;
        }
        info.max_track.width = info.max_track.width.max(info.min_track.width);
        info.max_track.height = info.max_track.height.max(info.min_track.height);
        info
    }

    /// Pick the icon slot for a window being minimized.
    ///
    /// A remembered position is reused when it fits inside the parent and
    /// no other minimized sibling occupies it. Otherwise the parent's client
    /// area is scanned in `icon_spacing` cells, left to right within a row
    /// and rows from the bottom up, and the first free cell wins.
    pub fn find_icon_pos(&self, hwnd: WindowId, remembered: Option<Point>) -> Point {
        let icon = self.metrics.icon;
        let xs = self.metrics.icon_spacing.width.max(1);
        let ys = self.metrics.icon_spacing.height.max(1);
        let parent = self.windows.parent(hwnd).unwrap_or_else(|| self.desktop());
        let area = self
            .get_client_rect(parent)
            .unwrap_or_else(|| Rect::from_origin_size(Point::default(), self.metrics.screen));

        let occupied: Vec<Rect> = self
            .windows
            .children(parent)
            .iter()
            .filter(|&&w| w != hwnd)
            .filter_map(|&w| self.windows.get(w))
            .filter(|r| r.style.contains(Style::MINIMIZE))
            .map(|r| r.window_rect)
            .collect();

        if let Some(pt) = remembered {
            let slot = Rect::from_origin_size(pt, icon);
            let inside = pt.x >= area.x
                && pt.x + icon.width < area.right()
                && pt.y >= area.y
                && pt.y + icon.height < area.bottom();
            if inside && !occupied.iter().any(|r| r.intersects(&slot)) {
                return pt;
            }
        }

        let mut y = area.bottom();
        loop {
            let mut x = area.x;
            loop {
                let taken = occupied.iter().any(|r| {
                    r.x < x + xs && r.right() >= x && r.y <= y && r.bottom() > y - ys
                });
                if !taken {
                    return Point::new(x + (xs - icon.width) / 2, y - (ys + icon.height) / 2);
                }
                x += xs;
                if x > area.right() - xs {
                    break;
                }
            }
            y -= ys;
        }
    }

    /// Compute and record a minimize, maximize or restore transition.
    ///
    /// Updates the style bits and stored placement; the caller performs the
    /// actual move with the returned rectangle and flags. `None` means the
    /// window does not exist.
    pub fn min_maximize(&mut self, hwnd: WindowId, cmd: ShowCommand) -> Option<MinMaxOutcome> {
        let rec = self.windows.get(hwnd)?;
        let (origin, current) = (rec.window_rect.origin(), rec.window_rect);
        self.init_internal_pos(hwnd, origin, Some(current));

        if self.hooks.call(&CbtEvent::MinMax {
            window: hwnd,
            command: cmd,
        }) {
            return Some(MinMaxOutcome::unchanged());
        }

        let mut out = MinMaxOutcome {
            flags: SwpFlags::empty(),
            rect: Rect::default(),
            skip_positioning: false,
        };

        if self.is_iconic(hwnd) {
            let mut query = Message::QueryOpen { allow: true };
            self.send_message(hwnd, &mut query);
            if matches!(query, Message::QueryOpen { allow: false }) || !self.is_window(hwnd) {
                debug!(window = hwnd, "restore from minimized refused");
                return Some(MinMaxOutcome::unchanged());
            }
            out.flags |= SwpFlags::NOCOPYBITS;
        }

        let icon = self.metrics.icon;
        match cmd.transition() {
            Transition::Minimize => {
                let remembered = {
                    let rec = self.windows.get_mut(hwnd)?;
                    let was_maximized = rec.style.contains(Style::MAXIMIZE);
                    rec.style.remove(Style::MAXIMIZE);
                    rec.style.insert(Style::MINIMIZE);
                    let placement = rec.placement.as_mut()?;
                    placement.restore_to_maximized = was_maximized;
                    placement.icon_pos
                };
                if self.backend.set_iconic_state(hwnd, true) {
                    out.skip_positioning = true;
                }
                let pt = self.find_icon_pos(hwnd, remembered);
                if let Some(p) = self.windows.get_mut(hwnd)?.placement.as_mut() {
                    p.icon_pos = Some(pt);
                }
                out.rect = Rect::from_origin_size(pt, icon);
                out.flags |= SwpFlags::NOCOPYBITS;
            }
            Transition::Maximize => {
                let info = self.get_min_max_info(hwnd);
                if self.is_iconic(hwnd) {
                    self.backend.set_iconic_state(hwnd, false);
                    self.show_icon_title(hwnd, false);
                }
                let rec = self.windows.get_mut(hwnd)?;
                rec.style.remove(Style::MINIMIZE);
                rec.style.insert(Style::MAXIMIZE);
                if let Some(p) = rec.placement.as_mut() {
                    p.max_pos = Some(info.max_position);
                }
                out.rect = Rect::from_origin_size(info.max_position, info.max_size);
            }
            Transition::Restore => {
                if self.is_iconic(hwnd) {
                    self.backend.set_iconic_state(hwnd, false);
                    self.show_icon_title(hwnd, false);
                    let rec = self.windows.get_mut(hwnd)?;
                    rec.style.remove(Style::MINIMIZE);
                    let restore_max = rec.placement.as_ref().is_some_and(|p| p.restore_to_maximized);
                    if restore_max {
                        let info = self.get_min_max_info(hwnd);
                        let rec = self.windows.get_mut(hwnd)?;
                        rec.style.insert(Style::MAXIMIZE);
                        if let Some(p) = rec.placement.as_mut() {
                            p.max_pos = Some(info.max_position);
                        }
                        out.rect = Rect::from_origin_size(info.max_position, info.max_size);
                        return Some(out);
                    }
                } else if self.is_zoomed(hwnd) {
                    self.windows.get_mut(hwnd)?.style.remove(Style::MAXIMIZE);
                } else {
                    return Some(MinMaxOutcome::unchanged());
                }
                out.rect = self.windows.get(hwnd)?.placement.as_ref()?.normal;
            }
        }
        trace!(window = hwnd, ?cmd, rect = ?out.rect, "min/max transition computed");
        Some(out)
    }

    /// Show, hide, minimize, maximize or restore a window.
    /// Returns whether the window was visible before the call.
    pub fn show_window(&mut self, hwnd: WindowId, cmd: ShowCommand) -> bool {
        let Some(style) = self.style(hwnd) else {
            return false;
        };
        let was_visible = style.contains(Style::VISIBLE);
        let mut swp = SwpFlags::empty();
        let mut target = Rect::default();
        let mut skip_positioning = false;

        match cmd {
            ShowCommand::Hide => {
                if !was_visible {
                    return false;
                }
                swp |= SwpFlags::HIDEWINDOW
                    | SwpFlags::NOSIZE
                    | SwpFlags::NOMOVE
                    | SwpFlags::NOACTIVATE
                    | SwpFlags::NOZORDER;
            }
            ShowCommand::ShowMinNoActive | ShowCommand::ShowMinimized | ShowCommand::Minimize => {
                if cmd == ShowCommand::ShowMinNoActive {
                    swp |= SwpFlags::NOACTIVATE | SwpFlags::NOZORDER;
                }
                if cmd != ShowCommand::Minimize {
                    swp |= SwpFlags::SHOWWINDOW;
                }
                swp |= SwpFlags::FRAMECHANGED;
                if style.contains(Style::MINIMIZE) {
                    swp |= SwpFlags::NOSIZE | SwpFlags::NOMOVE;
                } else if let Some(out) = self.min_maximize(hwnd, ShowCommand::Minimize) {
                    swp |= out.flags;
                    target = out.rect;
                    skip_positioning = out.skip_positioning;
                }
            }
            ShowCommand::ShowMaximized => {
                swp |= SwpFlags::SHOWWINDOW | SwpFlags::FRAMECHANGED;
                if style.contains(Style::MAXIMIZE) {
                    swp |= SwpFlags::NOSIZE | SwpFlags::NOMOVE;
                } else if let Some(out) = self.min_maximize(hwnd, ShowCommand::ShowMaximized) {
                    swp |= out.flags;
                    target = out.rect;
                    skip_positioning = out.skip_positioning;
                }
            }
            ShowCommand::ShowNa | ShowCommand::Show => {
                if cmd == ShowCommand::ShowNa {
                    swp |= SwpFlags::NOACTIVATE | SwpFlags::NOZORDER;
                }
                swp |= SwpFlags::SHOWWINDOW | SwpFlags::NOSIZE | SwpFlags::NOMOVE;
                let on_top = self.windows.first_child(self.desktop()) == Some(hwnd);
                if on_top && (was_visible || self.get_active_window() == Some(hwnd)) {
                    swp |= SwpFlags::NOACTIVATE;
                }
            }
            ShowCommand::ShowNoActivate
            | ShowCommand::ShowNormal
            | ShowCommand::ShowDefault
            | ShowCommand::Restore => {
                if cmd == ShowCommand::ShowNoActivate {
                    swp |= SwpFlags::NOZORDER;
                    if self.get_active_window().is_some() {
                        swp |= SwpFlags::NOACTIVATE;
                    }
                }
                swp |= SwpFlags::SHOWWINDOW | SwpFlags::FRAMECHANGED;
                if style.intersects(Style::MINIMIZE | Style::MAXIMIZE) {
                    if let Some(out) = self.min_maximize(hwnd, ShowCommand::Restore) {
                        swp |= out.flags;
                        target = out.rect;
                        skip_positioning = out.skip_positioning;
                    }
                } else {
                    swp |= SwpFlags::NOSIZE | SwpFlags::NOMOVE;
                }
            }
        }

        let show = cmd != ShowCommand::Hide;
        if show != was_visible {
            self.send_message(hwnd, &mut Message::ShowWindow { show });
            if !self.is_window(hwnd) {
                return was_visible;
            }
        }

        let Some(rec) = self.windows.get(hwnd) else {
            return was_visible;
        };
        let parent_hidden = rec
            .parent
            .is_some_and(|p| !self.windows.is_visible(p));
        if rec.style.contains(Style::CHILD)
            && parent_hidden
            && swp.contains(SwpFlags::NOSIZE | SwpFlags::NOMOVE)
        {
            // Invisible parent: only the style bit changes.
            if let Some(rec) = self.windows.get_mut(hwnd) {
                if cmd == ShowCommand::Hide {
                    rec.style.remove(Style::VISIBLE);
                } else {
                    rec.style.insert(Style::VISIBLE);
                }
            }
        } else {
            if rec.style.contains(Style::CHILD) && !rec.ex_style.contains(ExStyle::MDICHILD) {
                swp |= SwpFlags::NOACTIVATE | SwpFlags::NOZORDER;
            }
            let parent = rec.parent;
            let is_child = rec.style.is_child();
            if !skip_positioning {
                self.set_window_pos(
                    hwnd,
                    InsertAfter::Top,
                    target.x,
                    target.y,
                    target.width,
                    target.height,
                    swp,
                );
                if cmd == ShowCommand::Hide && self.is_window(hwnd) {
                    if self.get_active_window() == Some(hwnd) {
                        self.activate_other_window(hwnd);
                    }
                    if let Some(focus) = self.get_focus() {
                        if focus == hwnd || self.windows.is_child(hwnd, focus) {
                            self.set_focus(parent.filter(|_| is_child));
                        }
                    }
                }
            }
            if !self.is_window(hwnd) {
                return was_visible;
            }
            if self.is_iconic(hwnd) {
                self.show_icon_title(hwnd, true);
            }
        }

        let Some(rec) = self.windows.get_mut(hwnd) else {
            return was_visible;
        };
        if rec.flags.contains(WindowFlags::NEED_SIZE) {
            rec.flags.remove(WindowFlags::NEED_SIZE);
            let client = rec.client_rect;
            let kind = size_kind(rec.style);
            self.send_message(
                hwnd,
                &mut Message::Size {
                    kind,
                    width: client.width,
                    height: client.height,
                },
            );
            self.send_message(
                hwnd,
                &mut Message::Move {
                    x: client.x,
                    y: client.y,
                },
            );
        }
        was_visible
    }

    /// Restore a minimized window or minimize it.
    pub fn switch_to_this_window(&mut self, hwnd: WindowId, restore: bool) {
        let cmd = if restore {
            ShowCommand::Restore
        } else {
            ShowCommand::ShowMinimized
        };
        self.show_window(hwnd, cmd);
    }

    /// Minimize a window without hiding it.
    pub fn close_window(&mut self, hwnd: WindowId) -> bool {
        if !self.is_window(hwnd) {
            return false;
        }
        self.show_window(hwnd, ShowCommand::Minimize);
        true
    }

    /// Lay out every minimized child of `parent` on the icon grid, in
    /// z-order. Returns the row height used.
    pub fn arrange_iconic_windows(&mut self, parent: WindowId) -> i32 {
        let Some(area) = self.get_client_rect(parent) else {
            return 0;
        };
        let icon = self.metrics.icon;
        let xs = self.metrics.icon_spacing.width.max(1);
        let ys = self.metrics.icon_spacing.height.max(1);
        let mut x = area.x;
        let mut y = area.bottom();

        for child in self.windows.children(parent).to_vec() {
            if !self.is_iconic(child) {
                continue;
            }
            self.show_icon_title(child, false);
            self.set_window_pos(
                child,
                InsertAfter::Top,
                x + (xs - icon.width) / 2,
                y - (ys + icon.height) / 2,
                0,
                0,
                SwpFlags::NOSIZE | SwpFlags::NOZORDER | SwpFlags::NOACTIVATE,
            );
            if !self.is_window(child) {
                continue;
            }
            if let Some(rec) = self.windows.get_mut(child) {
                let pos = rec.window_rect.origin();
                if let Some(p) = rec.placement.as_mut() {
                    p.icon_pos = Some(pos);
                }
            }
            self.show_icon_title(child, true);
            if x <= area.right() - 2 * xs {
                x += xs;
            } else {
                x = area.x;
                y -= ys;
            }
        }
        ys
    }
}
