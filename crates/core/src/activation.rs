//! Active window, foreground queue and keyboard focus.
//!
//! Activation is a fixed sequence of notifications. Window procedures run
//! in the middle of it and may re-enter any operation, so every step after
//! a notification re-validates the windows it is about to touch.

use tracing::{debug, trace};

use crate::hook::CbtEvent;
use crate::manager::WindowManager;
use crate::message::{ActivateState, Message};
use crate::queue::QueueId;
use crate::style::{ExStyle, Style, SwpFlags};
use crate::window::{InsertAfter, WindowId};

/// Process-wide activation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationContext {
    pub(crate) active_queue: Option<QueueId>,
    pub(crate) prev_active: Option<WindowId>,
    pub(crate) sys_modal: Option<WindowId>,
}

impl ActivationContext {
    /// Queue holding the foreground window.
    pub fn active_queue(&self) -> Option<QueueId> {
        self.active_queue
    }

    /// The window that was active before the current activation started.
    pub fn previous_active(&self) -> Option<WindowId> {
        self.prev_active
    }

    pub fn sys_modal(&self) -> Option<WindowId> {
        self.sys_modal
    }
}

impl WindowManager {
    pub fn activation(&self) -> &ActivationContext {
        &self.activation
    }

    /// Set the system-modal window. A system-modal target activates even
    /// when the current active window refuses to let go.
    pub fn set_sys_modal_window(&mut self, hwnd: Option<WindowId>) -> Option<WindowId> {
        let previous = self.activation.sys_modal;
        self.activation.sys_modal = hwnd.filter(|&w| self.is_window(w));
        previous
    }

    /// The current queue's active window.
    pub fn get_active_window(&self) -> Option<WindowId> {
        self.queues.snapshot(self.current_queue)?.active
    }

    /// The active window of the foreground queue.
    pub fn get_foreground_window(&self) -> Option<WindowId> {
        self.queues.snapshot(self.activation.active_queue?)?.active
    }

    /// The current queue's focus window.
    pub fn get_focus(&self) -> Option<WindowId> {
        self.queues.snapshot(self.current_queue)?.focus
    }

    /// Visible, enabled, top-level.
    pub fn can_activate(&self, hwnd: WindowId) -> bool {
        self.style(hwnd)
            .is_some_and(|s| s & (Style::DISABLED | Style::VISIBLE | Style::CHILD) == Style::VISIBLE)
    }

    /// Activate a top-level window belonging to the current queue's data.
    /// Returns the previously active window of that queue.
    pub fn set_active_window(&mut self, hwnd: WindowId) -> Option<WindowId> {
        let rec = self.windows.get(hwnd)?;
        if rec.style.intersects(Style::DISABLED | Style::CHILD) {
            return None;
        }
        if !self.queues.shares_data(self.current_queue, rec.queue) {
            debug!(window = hwnd, "set_active_window across unrelated queues refused");
            return None;
        }
        let queue = rec.queue;
        let previous = self.queues.snapshot(queue).and_then(|d| d.active);
        self.activate(Some(hwnd), false, false);
        previous
    }

    pub fn set_foreground_window(&mut self, hwnd: WindowId) -> bool {
        self.change_active_window(Some(hwnd), false)
    }

    /// Make `hwnd` (or nothing) the active window.
    ///
    /// Sequence: hook veto, deactivation of the previous window (which may
    /// refuse unless the target is system-modal), queue update, palette
    /// query, raise, application switch notifications, activation of the
    /// target, focus hand-off and a host raise when nothing was active
    /// before. Returns true if `hwnd` is active when the call returns.
    pub fn activate(&mut self, hwnd: Option<WindowId>, via_mouse: bool, change_focus: bool) -> bool {
        let old_queue = self.activation.active_queue;
        let mut active = self.get_foreground_window();

        if hwnd == Some(self.desktop()) {
            return false;
        }
        if hwnd == active {
            return true;
        }
        if hwnd.is_some_and(|w| !self.is_window(w)) {
            return false;
        }
        let was_iconic = active.is_some_and(|a| self.is_iconic(a));

        if self.hooks.call(&CbtEvent::Activate {
            window: hwnd,
            via_mouse,
            active,
        }) {
            return false;
        }

        // Deactivate the previous window.
        self.activation.prev_active = active;
        if let Some(prev) = active.filter(|&p| self.is_window(p)) {
            let mut nc = Message::NcActivate {
                active: false,
                allow: true,
            };
            self.send_message(prev, &mut nc);
            let allowed = matches!(nc, Message::NcActivate { allow: true, .. });
            if !allowed && self.activation.sys_modal != hwnd {
                debug!(window = prev, "deactivation refused");
                return false;
            }
            self.send_message(
                prev,
                &mut Message::Activate {
                    state: ActivateState::Inactive,
                    minimized: was_iconic,
                    other: hwnd,
                },
            );
            let Some(queue) = self.activation.active_queue else {
                return false;
            };
            if self.queues.snapshot(queue).and_then(|d| d.active) != Some(prev) {
                debug!("activation changed while deactivating, aborting");
                return false;
            }
        }

        // Record the new active window.
        if hwnd.is_some_and(|w| !self.is_window(w)) {
            return false;
        }
        let target_queue = hwnd.and_then(|w| self.windows.queue(w));
        if let Some(mut guard) = target_queue.or(old_queue).and_then(|q| self.queues.lock(q)) {
            guard.set_active(hwnd);
        }
        active = hwnd;

        if let Some(w) = hwnd {
            let mut palette = Message::QueryNewPalette { realized: false };
            self.send_message(w, &mut palette);
            if matches!(palette, Message::QueryNewPalette { realized: true }) {
                self.broadcast_top_level(&Message::PaletteIsChanging { source: w });
            }
            if !self.is_window(w) {
                return false;
            }
        }

        if let Some(prev) = self.activation.prev_active {
            if self.is_iconic(prev) {
                self.redraw_icon_title(prev);
            }
        }

        // Raise the new window unless it already is the top visible one.
        if let Some(w) = hwnd {
            let Some(rec) = self.windows.get(w) else {
                return false;
            };
            if !rec.style.contains(Style::CHILD) && !rec.ex_style.contains(ExStyle::MANAGED) {
                let top_visible = self
                    .windows
                    .children(self.desktop())
                    .iter()
                    .copied()
                    .find(|&c| self.style(c).is_some_and(|s| s.contains(Style::VISIBLE)));
                if top_visible != Some(w) {
                    self.set_window_pos(
                        w,
                        InsertAfter::Top,
                        0,
                        0,
                        0,
                        0,
                        SwpFlags::NOSIZE | SwpFlags::NOMOVE | SwpFlags::NOACTIVATE,
                    );
                }
                if !self.is_window(w) {
                    return false;
                }
            }
        }

        // Application switch.
        let new_queue = hwnd.and_then(|w| self.windows.queue(w));
        if old_queue != new_queue {
            let old_task = old_queue.and_then(|q| self.queues.task(q));
            let new_task = new_queue.and_then(|q| self.queues.task(q));
            for w in self.windows.children(self.desktop()).to_vec() {
                if self.windows.queue(w).is_some() && self.windows.queue(w) == old_queue {
                    self.send_message(
                        w,
                        &mut Message::ActivateApp {
                            active: false,
                            other_task: new_task,
                        },
                    );
                }
            }
            self.activation.active_queue = new_queue;
            for w in self.windows.children(self.desktop()).to_vec() {
                if self.windows.queue(w).is_some() && self.windows.queue(w) == new_queue {
                    self.send_message(
                        w,
                        &mut Message::ActivateApp {
                            active: true,
                            other_task: old_task,
                        },
                    );
                }
            }
            if hwnd.is_some_and(|w| !self.is_window(w)) {
                return false;
            }
        }

        // Activate the new window.
        if let Some(w) = hwnd {
            let root = self.windows.unowned_ancestor(w);
            if let Some(rec) = self.windows.get_mut(root) {
                rec.last_active = Some(w);
            }
            let minimized = self.is_iconic(root);
            self.send_message(
                w,
                &mut Message::NcActivate {
                    active: true,
                    allow: true,
                },
            );
            let state = if via_mouse {
                ActivateState::ClickActive
            } else {
                ActivateState::Active
            };
            self.send_message(
                w,
                &mut Message::Activate {
                    state,
                    minimized,
                    other: self.activation.prev_active,
                },
            );
            if !self.is_window(w) {
                return false;
            }
        }

        if change_focus {
            self.hand_off_focus(active, new_queue, old_queue);
        }

        if self.activation.prev_active.is_none() {
            if let Some(w) = hwnd {
                self.backend.force_raise(w);
            }
        }

        if let Some(a) = active {
            if self.is_iconic(a) {
                self.redraw_icon_title(a);
            }
        }
        trace!(window = ?hwnd, "activation complete");
        true
    }

    /// Move focus off windows that no longer belong to the active
    /// top-level window.
    fn hand_off_focus(
        &mut self,
        active: Option<WindowId>,
        new_queue: Option<QueueId>,
        old_queue: Option<QueueId>,
    ) {
        if let Some(q) = new_queue {
            if let Some(focus) = self.queues.snapshot(q).and_then(|d| d.focus) {
                if self.windows.top_parent(focus) != active {
                    let next = active.filter(|&a| !self.is_iconic(a));
                    self.switch_focus(q, Some(focus), next);
                }
            }
        }
        if let Some(oq) = old_queue {
            let shared = new_queue.is_some_and(|nq| self.queues.shares_data(nq, oq));
            if !shared {
                if let Some(focus) = self.queues.snapshot(oq).and_then(|d| d.focus) {
                    self.switch_focus(oq, Some(focus), None);
                }
            }
        }
    }

    /// Store the new focus window, then tell both sides.
    fn switch_focus(&mut self, queue: QueueId, old: Option<WindowId>, new: Option<WindowId>) {
        if let Some(mut guard) = self.queues.lock(queue) {
            guard.set_focus(new);
        }
        if let Some(o) = old.filter(|&o| self.is_window(o)) {
            self.send_message(o, &mut Message::KillFocus { next: new });
        }
        if let Some(n) = new.filter(|&n| self.is_window(n)) {
            if self.queues.snapshot(queue).and_then(|d| d.focus) == Some(n) {
                self.send_message(n, &mut Message::SetFocus { previous: old });
            }
        }
    }

    /// Give keyboard focus to `hwnd`, activating its top-level window first.
    /// Returns the previous focus window.
    pub fn set_focus(&mut self, hwnd: Option<WindowId>) -> Option<WindowId> {
        let Some(w) = hwnd else {
            let queue = self.current_queue;
            let previous = self.queues.snapshot(queue)?.focus;
            if previous.is_some() {
                self.switch_focus(queue, previous, None);
            }
            return previous;
        };

        let queue = self.windows.queue(w)?;
        let previous = self.queues.snapshot(queue)?.focus;
        if previous == Some(w) {
            return previous;
        }

        // Focus may not land inside a minimized or disabled ancestor.
        let top = self.windows.top_parent(w)?;
        let mut current = w;
        while current != top {
            let style = self.style(current)?;
            if style.intersects(Style::MINIMIZE | Style::DISABLED) {
                return None;
            }
            current = self.windows.parent(current)?;
        }

        if self.queues.snapshot(queue)?.active != Some(top) && !self.activate(Some(top), false, false) {
            return None;
        }
        if !self.is_window(w) {
            return None;
        }

        let current = self.queues.snapshot(queue)?.focus;
        if current != Some(w) {
            self.switch_focus(queue, current, Some(w));
        }
        previous
    }

    /// Pick and activate a replacement for `hwnd`, which is going away or
    /// being hidden.
    ///
    /// The owner's top-level window is preferred; otherwise the previously
    /// active window, then the siblings below `hwnd`'s top-level window in
    /// z-order.
    pub fn activate_other_window(&mut self, hwnd: WindowId) -> bool {
        let active = self.get_foreground_window();
        if self.activation.prev_active == Some(hwnd) {
            self.activation.prev_active = None;
        }
        let Some(rec) = self.windows.get(hwnd) else {
            return false;
        };
        if active != Some(hwnd) && (active.is_some() || self.queues.is_exiting(rec.queue)) {
            return false;
        }

        let owner_top = if rec.style.contains(Style::POPUP) {
            rec.owner.and_then(|o| self.windows.top_parent(o))
        } else {
            None
        };
        let target = match owner_top.filter(|&o| self.can_activate(o)) {
            Some(o) => Some(o),
            None => {
                let mut cursor = self.windows.top_parent(hwnd);
                let mut candidate = self.activation.prev_active;
                let mut steps = 0;
                while !candidate.is_some_and(|c| self.can_activate(c)) {
                    candidate = cursor.and_then(|c| self.windows.next_sibling(c));
                    cursor = candidate;
                    steps += 1;
                    if candidate.is_none() || steps > self.windows.len() {
                        candidate = None;
                        break;
                    }
                }
                candidate
            }
        };
        debug!(window = hwnd, replacement = ?target, "activating replacement window");

        let ok = self.activate(target, false, true);
        if let Some(queue) = target.and_then(|t| self.windows.queue(t)) {
            let desktop = self.desktop();
            if let Some(d) = self.windows.get_mut(desktop) {
                d.queue = queue;
            }
        }
        self.activation.prev_active = None;
        ok
    }

    /// Activate `hwnd` in response to user input or a foreground request.
    ///
    /// A child window only receives a child-activation notice and the call
    /// returns false; so does a request for the window that is already
    /// active.
    pub fn change_active_window(&mut self, hwnd: Option<WindowId>, via_mouse: bool) -> bool {
        let Some(w) = hwnd else {
            return self.activate(None, via_mouse, true);
        };
        let Some(rec) = self.windows.get(w) else {
            return false;
        };
        if rec.style.is_child() {
            self.send_message(w, &mut Message::ChildActivate);
            return false;
        }
        if Some(w) == self.get_foreground_window() {
            return false;
        }
        if !self.activate(Some(w), via_mouse, true) {
            return false;
        }
        let desktop = self.desktop();
        if self.windows.parent(w) == Some(desktop) {
            if let Some(queue) = self.windows.queue(w) {
                if let Some(d) = self.windows.get_mut(desktop) {
                    d.queue = queue;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::message::Dispatch;
    use crate::window::WindowDesc;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// A window procedure that records activation traffic.
    fn recorder(log: &Log, name: &'static str) -> Box<dyn crate::message::WindowProc> {
        let log = log.clone();
        Box::new(move |wm: &mut WindowManager, _: WindowId, msg: &mut Message| {
            let entry = match msg {
                Message::NcActivate { active, .. } => Some(format!("{name}:ncactivate:{active}")),
                Message::Activate { state, .. } => Some(format!(
                    "{name}:activate:{state:?}:fg={:?}",
                    wm.get_foreground_window()
                )),
                Message::ActivateApp { active, .. } => Some(format!("{name}:activateapp:{active}")),
                Message::SetFocus { .. } => Some(format!("{name}:setfocus")),
                Message::KillFocus { .. } => Some(format!("{name}:killfocus")),
                _ => None,
            };
            if let Some(e) = entry {
                log.borrow_mut().push(e);
            }
            Dispatch::Default
        })
    }

    fn top(wm: &mut WindowManager, log: &Log, name: &'static str) -> WindowId {
        wm.create_window_with_proc(WindowDesc::new(Rect::new(0, 0, 100, 100)), recorder(log, name))
            .unwrap()
    }

    #[test]
    fn test_activation_message_order() {
        let log: Log = Rc::default();
        let mut wm = WindowManager::default();
        let a = top(&mut wm, &log, "a");
        let b = top(&mut wm, &log, "b");
        assert!(wm.activate(Some(a), false, true));
        log.borrow_mut().clear();

        assert!(wm.activate(Some(b), false, true));
        let entries = log.borrow().clone();
        let pos = |needle: &str| entries.iter().position(|e| e.starts_with(needle)).unwrap();
        assert!(pos("a:ncactivate:false") < pos("a:activate:Inactive"));
        assert!(pos("a:activate:Inactive") < pos("b:ncactivate:true"));
        assert!(pos("b:ncactivate:true") < pos("b:activate:Active"));
        // A still sees itself as foreground while being deactivated.
        assert!(entries.contains(&format!("a:activate:Inactive:fg=Some({a})")));
        assert_eq!(wm.get_active_window(), Some(b));
        assert_eq!(wm.get_focus(), Some(b));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let log: Log = Rc::default();
        let mut wm = WindowManager::default();
        let a = top(&mut wm, &log, "a");
        assert!(wm.activate(Some(a), false, true));
        log.borrow_mut().clear();
        assert!(wm.activate(Some(a), false, true));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_activate_desktop_fails() {
        let mut wm = WindowManager::default();
        let desktop = wm.desktop();
        assert!(!wm.activate(Some(desktop), false, true));
        assert!(!wm.activate(Some(12345), false, true));
    }

    #[test]
    fn test_deactivation_veto_is_honoured() {
        let mut wm = WindowManager::default();
        let stubborn = wm
            .create_window_with_proc(
                WindowDesc::new(Rect::new(0, 0, 100, 100)),
                Box::new(|_: &mut WindowManager, _: WindowId, msg: &mut Message| {
                    if let Message::NcActivate { active: false, allow } = msg {
                        *allow = false;
                        return Dispatch::Handled;
                    }
                    Dispatch::Default
                }),
            )
            .unwrap();
        let other = wm.create_window(WindowDesc::new(Rect::new(0, 0, 50, 50))).unwrap();
        assert!(wm.activate(Some(stubborn), false, true));
        assert!(!wm.activate(Some(other), false, true));
        assert_eq!(wm.get_active_window(), Some(stubborn));

        // a system-modal window wins anyway
        wm.set_sys_modal_window(Some(other));
        assert!(wm.activate(Some(other), false, true));
        assert_eq!(wm.get_active_window(), Some(other));
    }

    #[test]
    fn test_hook_veto_blocks_activation() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        wm.hooks_mut()
            .install(Box::new(|e: &CbtEvent| matches!(e, CbtEvent::Activate { .. })));
        assert!(!wm.activate(Some(a), false, true));
        assert_eq!(wm.get_active_window(), None);
    }

    #[test]
    fn test_reentrant_activation_during_deactivate_aborts_outer() {
        let mut wm = WindowManager::default();
        let c = wm.create_window(WindowDesc::new(Rect::new(0, 0, 10, 10))).unwrap();
        let a = wm
            .create_window_with_proc(
                WindowDesc::new(Rect::new(0, 0, 100, 100)),
                Box::new(move |wm: &mut WindowManager, _: WindowId, msg: &mut Message| {
                    if let Message::Activate {
                        state: ActivateState::Inactive,
                        other,
                        ..
                    } = msg
                    {
                        if *other != Some(c) {
                            wm.activate(Some(c), false, true);
                        }
                    }
                    Dispatch::Default
                }),
            )
            .unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        assert!(wm.activate(Some(a), false, true));
        assert!(!wm.activate(Some(b), false, true));
        assert_eq!(wm.get_active_window(), Some(c));
    }

    #[test]
    fn test_activation_raises_window() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let desktop = wm.desktop();
        assert_eq!(wm.windows().children(desktop), &[b, a]);
        assert!(wm.activate(Some(a), false, true));
        assert_eq!(wm.windows().children(desktop), &[a, b]);
    }

    #[test]
    fn test_activate_app_on_queue_switch() {
        let log: Log = Rc::default();
        let mut wm = WindowManager::default();
        wm.create_queue(2, 20);
        let a = top(&mut wm, &log, "a");
        let b = wm
            .create_window_with_proc(
                WindowDesc::new(Rect::new(0, 0, 100, 100)).on_queue(2),
                recorder(&log, "b"),
            )
            .unwrap();
        assert!(wm.activate(Some(a), false, true));
        assert!(log.borrow().contains(&"a:activateapp:true".to_string()));
        log.borrow_mut().clear();

        assert!(wm.activate(Some(b), false, true));
        let entries = log.borrow().clone();
        let deact = entries.iter().position(|e| e == "a:activateapp:false").unwrap();
        let act = entries.iter().position(|e| e == "b:activateapp:true").unwrap();
        assert!(deact < act);
        assert_eq!(wm.activation().active_queue(), Some(2));
        assert_eq!(wm.get_foreground_window(), Some(b));
        // focus left queue 1 because its data is not shared with queue 2
        assert_eq!(wm.queues().snapshot(1).unwrap().focus, None);
    }

    #[test]
    fn test_focus_stays_on_child_of_new_active_window() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let edit = wm
            .create_window(WindowDesc::child(a, Rect::new(10, 10, 20, 20)))
            .unwrap();
        assert_eq!(wm.set_focus(Some(edit)), None);
        assert_eq!(wm.get_active_window(), Some(a));
        assert_eq!(wm.get_focus(), Some(edit));
        assert_eq!(wm.set_focus(None), Some(edit));
        assert_eq!(wm.get_focus(), None);
    }

    #[test]
    fn test_focus_refused_inside_disabled_parent() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let panel = wm
            .create_window(WindowDesc::child(a, Rect::new(0, 0, 50, 50)))
            .unwrap();
        let edit = wm
            .create_window(WindowDesc::child(panel, Rect::new(0, 0, 20, 20)))
            .unwrap();
        wm.enable_window(panel, false);
        assert_eq!(wm.set_focus(Some(edit)), None);
        assert_eq!(wm.get_focus(), None);
    }

    #[test]
    fn test_activate_other_prefers_owner() {
        let mut wm = WindowManager::default();
        let owner = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let bystander = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let dialog = wm
            .create_window(WindowDesc::new(Rect::new(10, 10, 50, 50)).owned_by(owner))
            .unwrap();
        wm.activate(Some(bystander), false, true);
        wm.activate(Some(dialog), false, true);
        wm.show_window(dialog, crate::minmax::ShowCommand::Hide);
        assert_eq!(wm.get_active_window(), Some(owner));
        assert_eq!(wm.activation().previous_active(), None);
    }

    #[test]
    fn test_activate_other_falls_back_to_previous_then_siblings() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        wm.activate(Some(a), false, true);
        wm.activate(Some(b), false, true);
        wm.show_window(b, crate::minmax::ShowCommand::Hide);
        assert_eq!(wm.get_active_window(), Some(a));

        // no previous window: take the next sibling below in z-order
        let c = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        wm.activate(Some(c), false, true);
        wm.activation.prev_active = None;
        let desktop = wm.desktop();
        assert_eq!(wm.windows().children(desktop)[0], c);
        wm.show_window(c, crate::minmax::ShowCommand::Hide);
        assert_eq!(wm.get_active_window(), Some(a));
    }

    #[test]
    fn test_activate_other_refused_when_not_active() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        wm.activate(Some(a), false, true);
        assert!(!wm.activate_other_window(b));
        assert_eq!(wm.get_active_window(), Some(a));
    }

    #[test]
    fn test_change_active_window_on_child_sends_child_activate() {
        let seen = Rc::new(RefCell::new(false));
        let flag = seen.clone();
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let child = wm
            .create_window_with_proc(
                WindowDesc::child(a, Rect::new(0, 0, 10, 10)),
                Box::new(move |_: &mut WindowManager, _: WindowId, msg: &mut Message| {
                    if matches!(msg, Message::ChildActivate) {
                        *flag.borrow_mut() = true;
                    }
                    Dispatch::Default
                }),
            )
            .unwrap();
        assert!(!wm.change_active_window(Some(child), false));
        assert!(*seen.borrow());
        assert_eq!(wm.get_active_window(), None);
    }

    #[test]
    fn test_set_foreground_window() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        assert!(wm.set_foreground_window(a));
        assert_eq!(wm.get_foreground_window(), Some(a));
        // already foreground
        assert!(!wm.set_foreground_window(a));
    }

    #[test]
    fn test_set_active_window_returns_previous() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        assert_eq!(wm.set_active_window(a), None);
        assert_eq!(wm.set_active_window(b), Some(a));
        let child = wm
            .create_window(WindowDesc::child(b, Rect::new(0, 0, 10, 10)))
            .unwrap();
        assert_eq!(wm.set_active_window(child), None);
        assert_eq!(wm.get_active_window(), Some(b));
    }

    #[test]
    fn test_set_active_window_refuses_foreign_queue() {
        let mut wm = WindowManager::default();
        wm.create_queue(2, 2);
        let other = wm
            .create_window(WindowDesc::new(Rect::new(0, 0, 100, 100)).on_queue(2))
            .unwrap();
        assert_eq!(wm.set_active_window(other), None);
        assert_eq!(wm.get_foreground_window(), None);

        wm.queues_mut().attach(2, 1);
        wm.set_active_window(other);
        assert_eq!(wm.get_foreground_window(), Some(other));
    }

    #[test]
    fn test_destroying_active_window_activates_another() {
        let mut wm = WindowManager::default();
        let a = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let b = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        wm.activate(Some(a), false, true);
        wm.activate(Some(b), false, true);
        assert!(wm.destroy_window(b));
        assert_eq!(wm.get_active_window(), Some(a));
    }

    #[test]
    fn test_activation_records_last_active_on_owner() {
        let mut wm = WindowManager::default();
        let owner = wm.create_window(WindowDesc::new(Rect::new(0, 0, 100, 100))).unwrap();
        let popup = wm
            .create_window(WindowDesc::new(Rect::new(0, 0, 10, 10)).owned_by(owner))
            .unwrap();
        assert!(wm.activate(Some(popup), false, true));
        assert_eq!(wm.windows().get(owner).unwrap().last_active, Some(popup));
        assert!(wm
            .set_window_pos(owner, InsertAfter::Top, 0, 0, 0, 0, SwpFlags::NOMOVE | SwpFlags::NOSIZE));
        assert_eq!(wm.get_active_window(), Some(owner));
    }
}
