//! Point-to-window resolution.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::manager::WindowManager;
use crate::message::Message;
use crate::style::{ChildSkip, ExStyle, Style};
use crate::window::{WindowId, WindowRecord};

/// Area of a window a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTest {
    Error,
    /// Pass the hit on to the window underneath.
    Transparent,
    Nowhere,
    Client,
    Caption,
    Left,
    Right,
    Top,
    TopLeft,
    TopRight,
    Bottom,
    BottomLeft,
    BottomRight,
    Border,
}

/// Outcome of [`WindowManager::window_from_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestResult {
    pub window: Option<WindowId>,
    pub code: HitTest,
}

impl HitTestResult {
    fn new(window: Option<WindowId>, code: HitTest) -> Self {
        Self { window, code }
    }
}

/// Point in the parent's client space against a window's shape.
fn shape_contains(rec: &WindowRecord, point: Point) -> bool {
    match &rec.region {
        Some(region) => region.contains(point.offset(-rec.window_rect.x, -rec.window_rect.y)),
        None => rec.window_rect.contains(point),
    }
}

fn local_client(client: Rect) -> Rect {
    Rect::new(0, 0, client.width, client.height)
}

/// Visible, not click-through, and either enabled or a non-child window.
fn eligible(rec: &WindowRecord) -> bool {
    if !rec.style.contains(Style::VISIBLE) {
        return false;
    }
    if rec.ex_style.contains(ExStyle::LAYERED | ExStyle::TRANSPARENT) {
        return false;
    }
    !rec.style.contains(Style::DISABLED) || !rec.style.is_child()
}

impl WindowManager {
    /// Find the deepest window under a screen point, starting from `scope`.
    ///
    /// Windows owned by other queues are reported with a client hit code
    /// without being asked. A window answering [`HitTest::Transparent`]
    /// passes the hit to its next sibling, then to its parent.
    pub fn window_from_point(&mut self, scope: WindowId, point: Point) -> HitTestResult {
        let Some(scope_rec) = self.windows.get(scope) else {
            return HitTestResult::new(None, HitTest::Error);
        };
        if scope_rec.style.contains(Style::DISABLED) {
            return HitTestResult::new(None, HitTest::Error);
        }

        let managed_miss = scope_rec.ex_style.contains(ExStyle::MANAGED)
            && !self
                .windows
                .screen_client_rect(scope)
                .is_some_and(|r| r.contains(point));

        let mut xy = self.screen_to_client(scope, point);
        let mut cursor = if managed_miss {
            None
        } else {
            self.windows.first_child(scope)
        };
        let mut found: Option<WindowId> = None;
        let limit = self.windows.len() * 4 + 4;
        let mut steps = 0;

        loop {
            // Descend through the z-order looking for the deepest hit.
            while let Some(w) = cursor {
                steps += 1;
                if steps > limit {
                    return HitTestResult::new(found, HitTest::Nowhere);
                }
                let Some(rec) = self.windows.get(w) else {
                    cursor = None;
                    break;
                };
                if eligible(rec) && shape_contains(rec, xy) {
                    found = Some(w);
                    if rec.style.contains(Style::MINIMIZE) {
                        return HitTestResult::new(Some(w), HitTest::Caption);
                    }
                    if rec.style.contains(Style::DISABLED) {
                        return HitTestResult::new(Some(w), HitTest::Error);
                    }
                    if !rec.client_rect.contains(xy) {
                        break;
                    }
                    xy = xy.offset(-rec.client_rect.x, -rec.client_rect.y);
                    cursor = rec.children.first().copied();
                } else {
                    cursor = self.windows.next_sibling(w);
                }
            }

            let target = found.unwrap_or(scope);
            let Some(rec) = self.windows.get(target) else {
                return HitTestResult::new(None, HitTest::Nowhere);
            };
            if rec.queue != self.current_queue {
                return HitTestResult::new(Some(target), HitTest::Client);
            }
            let client_origin = rec.client_rect.origin();
            let parent = rec.parent;

            let mut msg = Message::NcHitTest {
                point,
                result: HitTest::Nowhere,
            };
            self.send_message(target, &mut msg);
            if !self.is_window(target) {
                trace!(window = target, "window vanished during hit test");
                return HitTestResult::new(None, HitTest::Nowhere);
            }
            let code = match msg {
                Message::NcHitTest { result, .. } => result,
                _ => HitTest::Nowhere,
            };
            if code != HitTest::Transparent {
                return HitTestResult::new(Some(target), code);
            }
            if target == scope {
                return HitTestResult::new(Some(scope), HitTest::Transparent);
            }

            // Continue below the transparent window, in its parent's space.
            if cursor.is_none() {
                xy = xy.offset(client_origin.x, client_origin.y);
            }
            cursor = self.windows.next_sibling(target);
            found = parent;
        }
    }

    /// Hit test from the desktop down.
    pub fn window_from_point_screen(&mut self, point: Point) -> HitTestResult {
        let desktop = self.desktop();
        self.window_from_point(desktop, point)
    }

    /// The immediate child of `parent` containing a point in `parent`'s
    /// client coordinates, or `parent` itself when no child does.
    pub fn child_window_from_point(&self, parent: WindowId, point: Point) -> Option<WindowId> {
        let rec = self.windows.get(parent)?;
        if !local_client(rec.client_rect).contains(point) {
            return None;
        }
        for &child in &rec.children {
            if let Some(c) = self.windows.get(child) {
                if c.window_rect.contains(point) {
                    return Some(child);
                }
            }
        }
        Some(parent)
    }

    /// Like [`child_window_from_point`](Self::child_window_from_point), but
    /// skipping children that match `skip`.
    pub fn child_window_from_point_ex(
        &self,
        parent: WindowId,
        point: Point,
        skip: ChildSkip,
    ) -> Option<WindowId> {
        let rec = self.windows.get(parent)?;
        if !local_client(rec.client_rect).contains(point) {
            return None;
        }
        for &child in &rec.children {
            let Some(c) = self.windows.get(child) else {
                continue;
            };
            if skip.contains(ChildSkip::INVISIBLE) && !c.style.contains(Style::VISIBLE) {
                continue;
            }
            if skip.contains(ChildSkip::DISABLED) && c.style.contains(Style::DISABLED) {
                continue;
            }
            if skip.contains(ChildSkip::TRANSPARENT) && c.ex_style.contains(ExStyle::TRANSPARENT) {
                continue;
            }
            if c.window_rect.contains(point) {
                return Some(child);
            }
        }
        Some(parent)
    }

    /// Default non-client hit test for a screen point.
    pub(crate) fn default_nc_hit_test(&self, hwnd: WindowId, point: Point) -> HitTest {
        let Some(rec) = self.windows.get(hwnd) else {
            return HitTest::Error;
        };
        let (Some(window), Some(client)) = (
            self.windows.screen_window_rect(hwnd),
            self.windows.screen_client_rect(hwnd),
        ) else {
            return HitTest::Error;
        };
        if !window.contains(point) {
            return HitTest::Nowhere;
        }
        if rec.style.contains(Style::MINIMIZE) {
            return HitTest::Caption;
        }
        if client.contains(point) {
            return HitTest::Client;
        }

        if rec.style.has_thick_frame() {
            let frame = self.metrics.frame;
            let left = point.x < window.x + frame.width;
            let right = point.x >= window.right() - frame.width;
            let top = point.y < window.y + frame.height;
            let bottom = point.y >= window.bottom() - frame.height;
            match (left, right, top, bottom) {
                (true, _, true, _) => return HitTest::TopLeft,
                (_, true, true, _) => return HitTest::TopRight,
                (true, _, _, true) => return HitTest::BottomLeft,
                (_, true, _, true) => return HitTest::BottomRight,
                (true, _, _, _) => return HitTest::Left,
                (_, true, _, _) => return HitTest::Right,
                (_, _, true, _) => return HitTest::Top,
                (_, _, _, true) => return HitTest::Bottom,
                _ => {}
            }
        }

        if rec.style.contains(Style::CAPTION) && point.y < client.y {
            return HitTest::Caption;
        }
        HitTest::Border
    }
}
