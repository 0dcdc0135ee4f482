//! Batched position changes applied in one pass.

use tracing::{debug, warn};

use crate::error::WinPosError;
use crate::manager::WindowManager;
use crate::position::WindowPos;
use crate::style::SwpFlags;
use crate::window::{InsertAfter, WindowId};

/// Capacity used when a batch is started with a count of zero.
pub const DEFAULT_BATCH_CAPACITY: usize = 8;

/// Flags that are only kept when every merged request carries them.
const SUPPRESSING: SwpFlags = SwpFlags::NOSIZE
    .union(SwpFlags::NOMOVE)
    .union(SwpFlags::NOZORDER)
    .union(SwpFlags::NOREDRAW)
    .union(SwpFlags::NOACTIVATE)
    .union(SwpFlags::NOCOPYBITS)
    .union(SwpFlags::NOOWNERZORDER);

/// Flags that stick once any merged request sets them.
const STICKY: SwpFlags = SwpFlags::SHOWWINDOW
    .union(SwpFlags::HIDEWINDOW)
    .union(SwpFlags::FRAMECHANGED);

/// Pending position changes, at most one per window, kept in first-request
/// order.
///
/// A batch is an owned value: every `defer_window_pos` call consumes it and
/// hands back the updated batch, and a failed call drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredBatch {
    entries: Vec<WindowPos>,
    capacity: usize,
}

impl DeferredBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries the batch can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[WindowPos] {
        &self.entries
    }

    /// Fold a new request into an existing entry for the same window.
    fn merge(entry: &mut WindowPos, new: &WindowPos) {
        if !new.flags.contains(SwpFlags::NOZORDER) {
            entry.insert_after = new.insert_after;
        }
        if !new.flags.contains(SwpFlags::NOMOVE) {
            entry.x = new.x;
            entry.y = new.y;
        }
        if !new.flags.contains(SwpFlags::NOSIZE) {
            entry.cx = new.cx;
            entry.cy = new.cy;
        }
        entry.flags &= new.flags | !SUPPRESSING;
        entry.flags |= new.flags & STICKY;
    }
}

impl WindowManager {
    /// Start a batch sized for `count` windows.
    pub fn begin_defer_window_pos(&self, count: i32) -> Result<DeferredBatch, WinPosError> {
        if count < 0 {
            return Err(WinPosError::InvalidCount(count));
        }
        let capacity = match count {
            0 => DEFAULT_BATCH_CAPACITY,
            n => n as usize,
        };
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| WinPosError::ResourceExhausted(capacity))?;
        debug!(capacity, "deferred batch started");
        Ok(DeferredBatch { entries, capacity })
    }

    /// Add or merge a request. On error the batch is gone.
    #[allow(clippy::too_many_arguments)]
    pub fn defer_window_pos(
        &self,
        mut batch: DeferredBatch,
        hwnd: WindowId,
        insert_after: InsertAfter,
        x: i32,
        y: i32,
        cx: i32,
        cy: i32,
        flags: SwpFlags,
    ) -> Result<DeferredBatch, WinPosError> {
        if hwnd == self.desktop() {
            return Err(WinPosError::DesktopWindow);
        }
        if !self.is_window(hwnd) {
            return Err(WinPosError::WindowNotFound(hwnd));
        }
        let request = WindowPos::new(hwnd, insert_after, x, y, cx, cy, flags);

        if let Some(entry) = batch.entries.iter_mut().find(|e| e.window == hwnd) {
            DeferredBatch::merge(entry, &request);
            return Ok(batch);
        }

        if batch.entries.len() >= batch.capacity {
            let grow = batch.capacity.max(1);
            let wanted = batch.capacity + grow;
            batch
                .entries
                .try_reserve_exact(wanted - batch.entries.len())
                .map_err(|_| WinPosError::ResourceExhausted(wanted))?;
            debug!(from = batch.capacity, to = wanted, "deferred batch grown");
            batch.capacity = wanted;
        }
        batch.entries.push(request);
        Ok(batch)
    }

    /// Apply every entry in order, stopping at the first failure.
    pub fn end_defer_window_pos(&mut self, batch: DeferredBatch) -> bool {
        let total = batch.entries.len();
        for (applied, pos) in batch.entries.into_iter().enumerate() {
            if !self.apply_window_pos(pos) {
                warn!(window = pos.window, applied, total, "deferred batch stopped early");
                return false;
            }
        }
        debug!(total, "deferred batch applied");
        true
    }
}
