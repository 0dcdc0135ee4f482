//! Window records and the arena that owns them.

use std::collections::HashMap;
use std::fmt;

use crate::geometry::{Point, Rect, Region};
use crate::message::WindowProc;
use crate::placement::InternalPlacement;
use crate::queue::QueueId;
use crate::style::{ExStyle, Style, WindowFlags};

/// Unique identifier for a window. Identifiers are never reused, so a
/// stale id simply stops resolving once its window is destroyed.
pub type WindowId = u64;

/// Position in a parent's z-order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAfter {
    /// Front of the sibling list.
    Top,
    /// Back of the sibling list.
    Bottom,
    /// Directly behind the given sibling.
    After(WindowId),
}

/// State of a single window.
///
/// `window_rect` and `client_rect` are expressed in the parent's client
/// coordinates; the client rectangle always lies inside the window
/// rectangle.
pub struct WindowRecord {
    pub id: WindowId,
    pub style: Style,
    pub ex_style: ExStyle,
    pub flags: WindowFlags,
    pub window_rect: Rect,
    pub client_rect: Rect,
    pub parent: Option<WindowId>,
    pub owner: Option<WindowId>,
    /// Children in z-order, topmost first.
    pub children: Vec<WindowId>,
    pub queue: QueueId,
    pub region: Option<Region>,
    /// Most recently active window in this window's owned group.
    pub last_active: Option<WindowId>,
    pub placement: Option<InternalPlacement>,
    pub(crate) proc_: Option<Box<dyn WindowProc>>,
}

impl fmt::Debug for WindowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRecord")
            .field("id", &self.id)
            .field("style", &self.style)
            .field("ex_style", &self.ex_style)
            .field("window_rect", &self.window_rect)
            .field("client_rect", &self.client_rect)
            .field("parent", &self.parent)
            .field("owner", &self.owner)
            .field("queue", &self.queue)
            .field("has_proc", &self.proc_.is_some())
            .finish()
    }
}

/// Creation parameters for a window.
#[derive(Debug, Clone)]
pub struct WindowDesc {
    /// Parent window; `None` means the desktop.
    pub parent: Option<WindowId>,
    pub owner: Option<WindowId>,
    pub style: Style,
    pub ex_style: ExStyle,
    /// Window rectangle in parent client coordinates.
    pub rect: Rect,
    /// Client rectangle; computed from the frame style when absent.
    pub client_rect: Option<Rect>,
    /// Owning queue; the manager's current queue when absent.
    pub queue: Option<QueueId>,
    pub region: Option<Region>,
}

impl WindowDesc {
    /// A visible top-level popup covering `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            parent: None,
            owner: None,
            style: Style::POPUP | Style::VISIBLE,
            ex_style: ExStyle::empty(),
            rect,
            client_rect: None,
            queue: None,
            region: None,
        }
    }

    /// A visible child of `parent`.
    pub fn child(parent: WindowId, rect: Rect) -> Self {
        Self {
            parent: Some(parent),
            style: Style::CHILD | Style::VISIBLE,
            ..Self::new(rect)
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_ex_style(mut self, ex_style: ExStyle) -> Self {
        self.ex_style = ex_style;
        self
    }

    pub fn owned_by(mut self, owner: WindowId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn on_queue(mut self, queue: QueueId) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_client_rect(mut self, client: Rect) -> Self {
        self.client_rect = Some(client);
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}

/// Arena of window records rooted at the desktop window.
#[derive(Debug)]
pub struct WindowStore {
    windows: HashMap<WindowId, WindowRecord>,
    next_id: WindowId,
    desktop: WindowId,
}

impl WindowStore {
    /// Create a store holding only the desktop window.
    pub fn new(screen: Rect, queue: QueueId) -> Self {
        let desktop = 1;
        let mut windows = HashMap::new();
        windows.insert(
            desktop,
            WindowRecord {
                id: desktop,
                style: Style::VISIBLE,
                ex_style: ExStyle::empty(),
                flags: WindowFlags::empty(),
                window_rect: screen,
                client_rect: screen,
                parent: None,
                owner: None,
                children: Vec::new(),
                queue,
                region: None,
                last_active: None,
                placement: None,
                proc_: None,
            },
        );
        Self {
            windows,
            next_id: desktop + 1,
            desktop,
        }
    }

    pub fn desktop(&self) -> WindowId {
        self.desktop
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn is_window(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&id)
    }

    /// Insert a new record at the top of its parent's z-order.
    /// Returns `None` when the parent does not exist.
    pub(crate) fn insert(
        &mut self,
        desc: WindowDesc,
        parent: WindowId,
        client_rect: Rect,
        queue: QueueId,
    ) -> Option<WindowId> {
        let id = self.next_id;
        let owner = desc.owner.filter(|o| self.windows.contains_key(o));
        self.windows.get_mut(&parent)?.children.insert(0, id);
        self.next_id += 1;
        self.windows.insert(
            id,
            WindowRecord {
                id,
                style: desc.style,
                ex_style: desc.ex_style,
                flags: WindowFlags::empty(),
                window_rect: desc.rect,
                client_rect,
                parent: Some(parent),
                owner,
                children: Vec::new(),
                queue,
                region: desc.region,
                last_active: None,
                placement: None,
                proc_: None,
            },
        );
        Some(id)
    }

    /// Every window in the subtree rooted at `id`, children before parents.
    pub fn subtree_post_order(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((w, expanded)) = stack.pop() {
            if expanded {
                out.push(w);
                continue;
            }
            let Some(rec) = self.get(w) else { continue };
            stack.push((w, true));
            for &child in rec.children.iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Remove `id` and its whole subtree from the arena.
    pub(crate) fn remove_subtree(&mut self, id: WindowId) -> usize {
        let doomed = self.subtree_post_order(id);
        if let Some(parent) = self.get(id).and_then(|r| r.parent) {
            if let Some(p) = self.windows.get_mut(&parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for w in &doomed {
            self.windows.remove(w);
        }
        doomed.len()
    }

    /// Windows owned by `owner`, in arbitrary order.
    pub fn owned_windows(&self, owner: WindowId) -> Vec<WindowId> {
        self.windows
            .values()
            .filter(|r| r.owner == Some(owner))
            .map(|r| r.id)
            .collect()
    }

    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.get(id)?.parent
    }

    pub fn owner(&self, id: WindowId) -> Option<WindowId> {
        self.get(id)?.owner
    }

    pub fn style(&self, id: WindowId) -> Option<Style> {
        self.get(id).map(|r| r.style)
    }

    pub fn queue(&self, id: WindowId) -> Option<QueueId> {
        self.get(id).map(|r| r.queue)
    }

    /// Children of `id`, topmost first. Empty for unknown windows.
    pub fn children(&self, id: WindowId) -> &[WindowId] {
        self.get(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn first_child(&self, id: WindowId) -> Option<WindowId> {
        self.children(id).first().copied()
    }

    /// The sibling directly below `id` in z-order.
    pub fn next_sibling(&self, id: WindowId) -> Option<WindowId> {
        let siblings = self.children(self.parent(id)?);
        let idx = siblings.iter().position(|&w| w == id)?;
        siblings.get(idx + 1).copied()
    }

    /// Walk up through child windows to the first non-child ancestor.
    pub fn top_parent(&self, id: WindowId) -> Option<WindowId> {
        let mut current = id;
        for _ in 0..self.windows.len() {
            let rec = self.get(current)?;
            if !rec.style.is_child() {
                return Some(current);
            }
            current = rec.parent?;
        }
        None
    }

    /// Walk the owner chain to the window that has no owner.
    pub fn unowned_ancestor(&self, id: WindowId) -> WindowId {
        let mut current = id;
        for _ in 0..self.windows.len() {
            match self.owner(current) {
                Some(owner) if self.is_window(owner) => current = owner,
                _ => break,
            }
        }
        current
    }

    /// True when `child` is a descendant of `parent` through child windows.
    pub fn is_child(&self, parent: WindowId, child: WindowId) -> bool {
        let mut current = child;
        for _ in 0..self.windows.len() {
            let Some(rec) = self.get(current) else {
                return false;
            };
            if !rec.style.contains(Style::CHILD) {
                return false;
            }
            match rec.parent {
                Some(p) if p == parent => return true,
                Some(p) => current = p,
                None => return false,
            }
        }
        false
    }

    /// True when the window and all of its ancestors carry the visible bit.
    pub fn is_visible(&self, id: WindowId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.windows.len() {
            let Some(w) = current else { return true };
            match self.get(w) {
                Some(rec) if rec.style.contains(Style::VISIBLE) => current = rec.parent,
                _ => return false,
            }
        }
        false
    }

    /// Offset from `id`'s client origin to screen coordinates.
    pub fn client_origin(&self, id: WindowId) -> Point {
        let mut origin = Point::default();
        let mut current = Some(id);
        for _ in 0..self.windows.len() {
            let Some(w) = current else { break };
            if w == self.desktop {
                break;
            }
            let Some(rec) = self.get(w) else { break };
            origin = origin.offset(rec.client_rect.x, rec.client_rect.y);
            current = rec.parent;
        }
        origin
    }

    /// Window rectangle in screen coordinates.
    pub fn screen_window_rect(&self, id: WindowId) -> Option<Rect> {
        let rec = self.get(id)?;
        let base = rec.parent.map(|p| self.client_origin(p)).unwrap_or_default();
        Some(rec.window_rect.offset(base.x, base.y))
    }

    /// Client rectangle in screen coordinates.
    pub fn screen_client_rect(&self, id: WindowId) -> Option<Rect> {
        let rec = self.get(id)?;
        let base = rec.parent.map(|p| self.client_origin(p)).unwrap_or_default();
        Some(rec.client_rect.offset(base.x, base.y))
    }

    /// Move `id` within its parent's z-order. An `After` target that is not
    /// a sibling leaves the order unchanged.
    pub(crate) fn restack(&mut self, id: WindowId, insert_after: InsertAfter) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(siblings) = self.windows.get_mut(&parent).map(|p| &mut p.children) else {
            return false;
        };
        if let InsertAfter::After(after) = insert_after {
            if after == id || !siblings.contains(&after) {
                return false;
            }
        }
        siblings.retain(|&w| w != id);
        match insert_after {
            InsertAfter::Top => siblings.insert(0, id),
            InsertAfter::Bottom => siblings.push(id),
            InsertAfter::After(after) => {
                let idx = siblings.iter().position(|&w| w == after).map_or(0, |i| i + 1);
                siblings.insert(idx, id);
            }
        }
        true
    }

    /// Every live window id, in arbitrary order.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }
}
