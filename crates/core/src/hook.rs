//! Computer-based-training hooks that may veto state changes.

use tracing::debug;

use crate::minmax::ShowCommand;
use crate::window::WindowId;

/// Event offered to the hook chain before it takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbtEvent {
    /// A minimize, maximize or restore is about to run.
    MinMax {
        window: WindowId,
        command: ShowCommand,
    },
    /// A window is about to become active.
    Activate {
        window: Option<WindowId>,
        via_mouse: bool,
        active: Option<WindowId>,
    },
}

/// A hook returns `true` to veto the event.
pub trait CbtHook {
    fn call(&mut self, event: &CbtEvent) -> bool;
}

impl<F> CbtHook for F
where
    F: FnMut(&CbtEvent) -> bool,
{
    fn call(&mut self, event: &CbtEvent) -> bool {
        self(event)
    }
}

pub type HookId = u32;

/// Installed hooks, most recently installed first.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<(HookId, Box<dyn CbtHook>)>,
    next_id: HookId,
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl HookChain {
    pub fn install(&mut self, hook: Box<dyn CbtHook>) -> HookId {
        self.next_id += 1;
        self.hooks.insert(0, (self.next_id, hook));
        self.next_id
    }

    pub fn remove(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hid, _)| *hid != id);
        self.hooks.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Offer `event` to each hook in turn; stops at the first veto.
    pub fn call(&mut self, event: &CbtEvent) -> bool {
        for (id, hook) in self.hooks.iter_mut() {
            if hook.call(event) {
                debug!(hook = *id, ?event, "hook vetoed event");
                return true;
            }
        }
        false
    }
}
