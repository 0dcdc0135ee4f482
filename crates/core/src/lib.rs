//! winpos core
//!
//! Platform-agnostic window placement, activation and z-order engine.
//!
//! The crate models a tree of windows rooted at a desktop window and
//! answers the questions a window manager compatibility layer has to:
//! - which window lies under a point (hit testing)
//! - where a window goes when it is moved, resized, minimized or maximized
//! - which window is active and focused, and which messages that sends
//! - how a batch of position changes is merged and applied
//!
//! Window procedures see the same notification sequence a native desktop
//! would send. Actual drawing and native window handles live behind the
//! [`PositionBackend`] trait.

pub mod activation;
pub mod backend;
pub mod defer;
pub mod error;
pub mod geometry;
pub mod hittest;
pub mod hook;
pub mod manager;
pub mod message;
pub mod metrics;
pub mod minmax;
pub mod placement;
pub mod position;
pub mod queue;
pub mod style;
pub mod window;

pub use activation::ActivationContext;
pub use backend::{BackendError, NullBackend, PositionBackend, PositionChange};
pub use defer::{DeferredBatch, DEFAULT_BATCH_CAPACITY};
pub use error::WinPosError;
pub use geometry::{Point, Rect, Region, Size};
pub use hittest::{HitTest, HitTestResult};
pub use hook::{CbtEvent, CbtHook, HookChain, HookId};
pub use manager::{WindowManager, DEFAULT_QUEUE, DEFAULT_TASK};
pub use message::{ActivateState, Dispatch, Message, MinMaxInfo, SizeKind, WindowProc};
pub use metrics::SystemMetrics;
pub use minmax::{MinMaxOutcome, ShowCommand};
pub use placement::{InternalPlacement, WindowPlacement};
pub use position::WindowPos;
pub use queue::{PerQueueData, QueueId, QueueStore, TaskId};
pub use style::{ChildSkip, ExStyle, Style, SwpFlags, WindowFlags};
pub use window::{InsertAfter, WindowDesc, WindowId, WindowRecord, WindowStore};
