//! The window manager: owns every window, queue and hook, and dispatches
//! notifications to window procedures.

use tracing::{debug, trace, warn};

use crate::activation::ActivationContext;
use crate::backend::{NullBackend, PositionBackend};
use crate::geometry::{Point, Rect, Region, Size};
use crate::hook::HookChain;
use crate::message::{ActivateState, Dispatch, Message, SizeKind, WindowProc};
use crate::metrics::SystemMetrics;
use crate::queue::{QueueId, QueueStore, TaskId};
use crate::style::{has_dlg_frame, ExStyle, Style, SwpFlags, WindowFlags};
use crate::window::{WindowDesc, WindowId, WindowStore};

/// Queue created together with the manager; owns the desktop window.
pub const DEFAULT_QUEUE: QueueId = 1;

/// Task owning [`DEFAULT_QUEUE`].
pub const DEFAULT_TASK: TaskId = 1;

pub struct WindowManager {
    pub(crate) windows: WindowStore,
    pub(crate) queues: QueueStore,
    pub(crate) activation: ActivationContext,
    pub(crate) hooks: HookChain,
    pub(crate) backend: Box<dyn PositionBackend>,
    pub(crate) metrics: SystemMetrics,
    pub(crate) current_queue: QueueId,
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.windows.len())
            .field("activation", &self.activation)
            .field("current_queue", &self.current_queue)
            .finish()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(SystemMetrics::default())
    }
}

impl WindowManager {
    /// Create a manager with a desktop sized to `metrics.screen` and a
    /// backend that accepts every change.
    pub fn new(metrics: SystemMetrics) -> Self {
        Self::with_backend(metrics, Box::new(NullBackend))
    }

    pub fn with_backend(metrics: SystemMetrics, backend: Box<dyn PositionBackend>) -> Self {
        let mut queues = QueueStore::new();
        queues.create(DEFAULT_QUEUE, DEFAULT_TASK);
        let screen = Rect::from_origin_size(Point::default(), metrics.screen);
        debug!(width = screen.width, height = screen.height, "window manager created");
        Self {
            windows: WindowStore::new(screen, DEFAULT_QUEUE),
            queues,
            activation: ActivationContext::default(),
            hooks: HookChain::default(),
            backend,
            metrics,
            current_queue: DEFAULT_QUEUE,
        }
    }

    pub fn metrics(&self) -> &SystemMetrics {
        &self.metrics
    }

    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    pub fn queues(&self) -> &QueueStore {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut QueueStore {
        &mut self.queues
    }

    pub fn hooks_mut(&mut self) -> &mut HookChain {
        &mut self.hooks
    }

    pub fn desktop(&self) -> WindowId {
        self.windows.desktop()
    }

    pub fn is_window(&self, hwnd: WindowId) -> bool {
        self.windows.is_window(hwnd)
    }

    /// The queue that stands in for the calling thread.
    pub fn current_queue(&self) -> QueueId {
        self.current_queue
    }

    pub fn set_current_queue(&mut self, queue: QueueId) -> bool {
        if !self.queues.contains(queue) {
            return false;
        }
        self.current_queue = queue;
        true
    }

    pub fn create_queue(&mut self, queue: QueueId, task: TaskId) -> bool {
        self.queues.create(queue, task)
    }

    // ========================================================================
    // Window lifetime
    // ========================================================================

    /// Create a window. Returns `None` if the parent or queue is unknown.
    pub fn create_window(&mut self, desc: WindowDesc) -> Option<WindowId> {
        let parent = desc.parent.unwrap_or_else(|| self.windows.desktop());
        let queue = desc.queue.unwrap_or(self.current_queue);
        if !self.queues.contains(queue) {
            warn!(queue, "cannot create window on unknown queue");
            return None;
        }
        let frame = self.default_client_rect(desc.style, desc.ex_style, desc.rect);
        let client = desc
            .client_rect
            .map(|c| desc.rect.intersection(&c))
            .unwrap_or(frame);
        let id = self.windows.insert(desc, parent, client, queue)?;
        trace!(window = id, parent, queue, "window created");
        Some(id)
    }

    pub fn create_window_with_proc(
        &mut self,
        desc: WindowDesc,
        proc_: Box<dyn WindowProc>,
    ) -> Option<WindowId> {
        let id = self.create_window(desc)?;
        self.set_window_proc(id, proc_);
        Some(id)
    }

    pub fn set_window_proc(&mut self, hwnd: WindowId, proc_: Box<dyn WindowProc>) -> bool {
        match self.windows.get_mut(hwnd) {
            Some(rec) => {
                rec.proc_ = Some(proc_);
                true
            }
            None => false,
        }
    }

    /// Destroy a window, its children and the windows it owns.
    pub fn destroy_window(&mut self, hwnd: WindowId) -> bool {
        if hwnd == self.desktop() || !self.is_window(hwnd) {
            return false;
        }
        if self.windows.is_visible(hwnd) {
            self.show_window(hwnd, crate::minmax::ShowCommand::Hide);
            if !self.is_window(hwnd) {
                return true;
            }
        }
        for owned in self.windows.owned_windows(hwnd) {
            self.destroy_window(owned);
        }
        if !self.is_window(hwnd) {
            return true;
        }
        for w in self.windows.subtree_post_order(hwnd) {
            self.check_internal_pos(w);
            self.forget_focus(w);
            self.backend.unbind_native(w);
        }
        let removed = self.windows.remove_subtree(hwnd);
        debug!(window = hwnd, removed, "window destroyed");
        true
    }

    /// Tie a window to a host handle so the backend can act on it.
    pub fn bind_native(&mut self, hwnd: WindowId, handle: isize) -> bool {
        if hwnd == self.desktop() || !self.is_window(hwnd) {
            return false;
        }
        self.backend.bind_native(hwnd, handle)
    }

    fn forget_focus(&mut self, hwnd: WindowId) {
        let Some(queue) = self.windows.queue(hwnd) else {
            return;
        };
        if let Some(mut guard) = self.queues.lock(queue) {
            if guard.focus() == Some(hwnd) {
                guard.set_focus(None);
            }
        }
    }

    pub fn style(&self, hwnd: WindowId) -> Option<Style> {
        self.windows.style(hwnd)
    }

    /// Clear then set style bits. Visibility, minimize and maximize bits
    /// should change through `show_window` instead.
    pub fn modify_style(&mut self, hwnd: WindowId, remove: Style, add: Style) -> bool {
        match self.windows.get_mut(hwnd) {
            Some(rec) => {
                rec.style = (rec.style - remove) | add;
                true
            }
            None => false,
        }
    }

    pub fn enable_window(&mut self, hwnd: WindowId, enable: bool) -> bool {
        if enable {
            self.modify_style(hwnd, Style::DISABLED, Style::empty())
        } else {
            self.modify_style(hwnd, Style::empty(), Style::DISABLED)
        }
    }

    /// Request size and move notifications on the next `show_window`.
    pub fn mark_need_size(&mut self, hwnd: WindowId) -> bool {
        match self.windows.get_mut(hwnd) {
            Some(rec) => {
                rec.flags.insert(WindowFlags::NEED_SIZE);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Deliver a message to a window's procedure, then run the default
    /// handling unless the procedure handled it.
    ///
    /// Returns false if the window does not exist. The window may not exist
    /// afterwards either.
    pub fn send_message(&mut self, hwnd: WindowId, msg: &mut Message) -> bool {
        let Some(rec) = self.windows.get_mut(hwnd) else {
            trace!(window = hwnd, ?msg, "message to dead window dropped");
            return false;
        };
        let taken = rec.proc_.take();
        trace!(window = hwnd, ?msg, "dispatch");
        let dispatch = match taken {
            Some(mut proc_) => {
                let dispatch = proc_.handle(self, hwnd, msg);
                if let Some(rec) = self.windows.get_mut(hwnd) {
                    if rec.proc_.is_none() {
                        rec.proc_ = Some(proc_);
                    }
                }
                dispatch
            }
            None => Dispatch::Default,
        };
        if dispatch == Dispatch::Default && self.is_window(hwnd) {
            self.def_window_proc(hwnd, msg);
        }
        true
    }

    /// Default handling for every message kind.
    pub fn def_window_proc(&mut self, hwnd: WindowId, msg: &mut Message) {
        match msg {
            Message::NcCalcSize { window, client } => {
                let Some(rec) = self.windows.get(hwnd) else {
                    return;
                };
                *client = if rec.style.contains(Style::MINIMIZE) {
                    *window
                } else {
                    self.default_client_rect(rec.style, rec.ex_style, *window)
                };
            }
            Message::Activate { state, .. } => {
                if *state != ActivateState::Inactive && !self.is_iconic(hwnd) {
                    self.set_focus(Some(hwnd));
                }
            }
            Message::WindowPosChanging(pos) => {
                self.handle_window_pos_changing(hwnd, pos);
            }
            Message::WindowPosChanged(pos) => {
                let flags = pos.flags;
                self.send_move_size(hwnd, flags);
            }
            Message::NcHitTest { point, result } => {
                *result = self.default_nc_hit_test(hwnd, *point);
            }
            _ => {}
        }
    }

    /// Send the move and size notifications owed after a position change.
    fn send_move_size(&mut self, hwnd: WindowId, flags: SwpFlags) {
        if !flags.contains(SwpFlags::NOMOVE) {
            if let Some(client) = self.windows.get(hwnd).map(|r| r.client_rect) {
                self.send_message(
                    hwnd,
                    &mut Message::Move {
                        x: client.x,
                        y: client.y,
                    },
                );
            }
        }
        if !flags.contains(SwpFlags::NOSIZE) {
            if let Some(rec) = self.windows.get(hwnd) {
                let mut msg = Message::Size {
                    kind: size_kind(rec.style),
                    width: rec.client_rect.width,
                    height: rec.client_rect.height,
                };
                self.send_message(hwnd, &mut msg);
            }
        }
    }

    /// Send `msg` to every top-level window, in z-order.
    pub(crate) fn broadcast_top_level(&mut self, msg: &Message) {
        let targets = self.windows.children(self.desktop()).to_vec();
        for w in targets {
            let mut m = msg.clone();
            self.send_message(w, &mut m);
        }
    }

    // ========================================================================
    // Frame math
    // ========================================================================

    /// Combined frame thickness used for maximized sizing.
    pub(crate) fn frame_inset(&self, style: Style, ex_style: ExStyle) -> Size {
        let m = &self.metrics;
        if ex_style.contains(ExStyle::MANAGED) {
            return Size::default();
        }
        if has_dlg_frame(style, ex_style) {
            return m.dlg_frame;
        }
        let mut inset = Size::default();
        if style.has_thick_frame() {
            inset.width += m.frame.width;
            inset.height += m.frame.height;
        }
        if style.contains(Style::BORDER) {
            inset.width += m.border.width;
            inset.height += m.border.height;
        }
        inset
    }

    /// Client area for a window rectangle, from its frame and caption.
    pub(crate) fn default_client_rect(&self, style: Style, ex_style: ExStyle, window: Rect) -> Rect {
        let inset = self.frame_inset(style, ex_style);
        let mut client = window.inset(inset.width, inset.height);
        if style.contains(Style::CAPTION) && !ex_style.contains(ExStyle::MANAGED) {
            let caption = self.metrics.caption_height.min(client.height);
            client.y += caption;
            client.height -= caption;
        }
        client
    }

    // ========================================================================
    // Coordinates
    // ========================================================================

    /// Window rectangle in screen coordinates.
    pub fn get_window_rect(&self, hwnd: WindowId) -> Option<Rect> {
        self.windows.screen_window_rect(hwnd)
    }

    /// Client rectangle relative to the client origin.
    pub fn get_client_rect(&self, hwnd: WindowId) -> Option<Rect> {
        let rec = self.windows.get(hwnd)?;
        Some(Rect::new(0, 0, rec.client_rect.width, rec.client_rect.height))
    }

    /// Offset that converts `from`'s client coordinates into `to`'s.
    /// `None` on either side means the screen.
    fn client_offset(&self, from: Option<WindowId>, to: Option<WindowId>) -> Point {
        let origin = |w: Option<WindowId>| w.map(|w| self.windows.client_origin(w)).unwrap_or_default();
        let (a, b) = (origin(from), origin(to));
        Point::new(a.x - b.x, a.y - b.y)
    }

    /// Convert points between client spaces in place. Returns the applied
    /// offset.
    pub fn map_window_points(
        &self,
        from: Option<WindowId>,
        to: Option<WindowId>,
        points: &mut [Point],
    ) -> Point {
        let offset = self.client_offset(from, to);
        for p in points.iter_mut() {
            *p = p.offset(offset.x, offset.y);
        }
        offset
    }

    pub fn client_to_screen(&self, hwnd: WindowId, point: Point) -> Point {
        let offset = self.client_offset(Some(hwnd), None);
        point.offset(offset.x, offset.y)
    }

    pub fn screen_to_client(&self, hwnd: WindowId, point: Point) -> Point {
        let offset = self.client_offset(None, Some(hwnd));
        point.offset(offset.x, offset.y)
    }

    // ========================================================================
    // Shape
    // ========================================================================

    /// Replace a window's shape. `None` restores the rectangular shape.
    pub fn set_window_rgn(&mut self, hwnd: WindowId, region: Option<Region>, redraw: bool) -> bool {
        let Some(rec) = self.windows.get_mut(hwnd) else {
            return false;
        };
        rec.region = region;
        if redraw && self.windows.is_visible(hwnd) {
            trace!(window = hwnd, "window shape changed, repaint requested");
        }
        true
    }

    pub fn get_window_rgn(&self, hwnd: WindowId) -> Option<Region> {
        self.windows.get(hwnd)?.region.clone()
    }
}

pub(crate) fn size_kind(style: Style) -> SizeKind {
    if style.contains(Style::MINIMIZE) {
        SizeKind::Minimized
    } else if style.contains(Style::MAXIMIZE) {
        SizeKind::Maximized
    } else {
        SizeKind::Restored
    }
}
