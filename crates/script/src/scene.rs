//! Scene files: the windows, queues and steps of one scripted session.

use serde::{Deserialize, Serialize};
use winpos_core::{ExStyle, HitTest, QueueId, Rect, Region, Size, Style, SwpFlags, TaskId};

use crate::command::Command;
use crate::ScriptError;

/// A complete scripted session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Extra message queues. Queue 1 always exists.
    pub queues: Vec<QueueSpec>,
    /// Windows in creation order. Parents and owners must come first.
    pub windows: Vec<WindowSpec>,
    /// Windows whose activation is vetoed by an installed hook.
    pub veto_activate: Vec<String>,
    /// Windows whose minimize/maximize/restore is vetoed by a hook.
    pub veto_minmax: Vec<String>,
    pub steps: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub id: QueueId,
    #[serde(default = "default_task")]
    pub task: TaskId,
    /// Share the per-queue data of another queue.
    #[serde(default)]
    pub attach_to: Option<QueueId>,
}

fn default_task() -> TaskId {
    1
}

/// One window declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub name: String,
    /// Parent window name; top level when absent.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub queue: Option<QueueId>,
    /// Style names such as `"caption"` or `"thickframe"`. When empty the
    /// window is a visible popup, or a visible child if it has a parent.
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub ex_style: Vec<String>,
    pub rect: Rect,
    #[serde(default)]
    pub client_rect: Option<Rect>,
    /// Window shape, relative to the window's top-left corner.
    #[serde(default)]
    pub region: Option<Vec<Rect>>,
    #[serde(default)]
    pub replies: Replies,
    /// Native window handle to mirror this window onto.
    #[serde(default)]
    pub native: Option<isize>,
}

impl WindowSpec {
    pub fn region(&self) -> Option<Region> {
        self.region.as_ref().map(|rects| Region::new(rects.clone()))
    }
}

/// Canned answers the window gives to queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replies {
    /// Refuse to be restored from minimized.
    pub refuse_query_open: bool,
    /// Veto losing activation.
    pub refuse_nc_activate: bool,
    /// Fixed answer to hit tests.
    pub hit_test: Option<HitTest>,
    /// Override the minimum tracking size.
    pub min_track: Option<Size>,
    /// Override the maximum tracking size.
    pub max_track: Option<Size>,
}

impl Replies {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Scene {
    pub fn from_toml(text: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(text)?)
    }

    /// Check names and flags without building anything.
    pub fn validate(&self) -> Result<(), ScriptError> {
        let mut seen: Vec<&str> = Vec::new();
        let mut queues: Vec<QueueId> = vec![winpos_core::DEFAULT_QUEUE];
        for q in &self.queues {
            if let Some(target) = q.attach_to {
                if !queues.contains(&target) {
                    return Err(ScriptError::UnknownQueue(target));
                }
            }
            queues.push(q.id);
        }
        for w in &self.windows {
            if seen.contains(&w.name.as_str()) {
                return Err(ScriptError::DuplicateWindow(w.name.clone()));
            }
            for other in [&w.parent, &w.owner].into_iter().flatten() {
                if !seen.contains(&other.as_str()) {
                    return Err(ScriptError::UnknownWindow(other.clone()));
                }
            }
            if let Some(q) = w.queue {
                if !queues.contains(&q) {
                    return Err(ScriptError::UnknownQueue(q));
                }
            }
            parse_style(&w.style)?;
            parse_ex_style(&w.ex_style)?;
            seen.push(&w.name);
        }
        for name in self.veto_activate.iter().chain(&self.veto_minmax) {
            if !seen.contains(&name.as_str()) {
                return Err(ScriptError::UnknownWindow(name.clone()));
            }
        }
        Ok(())
    }
}

fn flag_name(name: &str) -> String {
    name.trim().replace('-', "_").to_ascii_uppercase()
}

pub fn parse_style(names: &[String]) -> Result<Style, ScriptError> {
    names.iter().try_fold(Style::empty(), |acc, name| {
        Style::from_name(&flag_name(name))
            .map(|s| acc | s)
            .ok_or_else(|| ScriptError::UnknownFlag {
                kind: "style",
                name: name.clone(),
            })
    })
}

pub fn parse_ex_style(names: &[String]) -> Result<ExStyle, ScriptError> {
    names.iter().try_fold(ExStyle::empty(), |acc, name| {
        ExStyle::from_name(&flag_name(name))
            .map(|s| acc | s)
            .ok_or_else(|| ScriptError::UnknownFlag {
                kind: "ex_style",
                name: name.clone(),
            })
    })
}

pub fn parse_swp_flags(names: &[String]) -> Result<SwpFlags, ScriptError> {
    names.iter().try_fold(SwpFlags::empty(), |acc, name| {
        SwpFlags::from_name(&flag_name(name))
            .map(|s| acc | s)
            .ok_or_else(|| ScriptError::UnknownFlag {
                kind: "swp",
                name: name.clone(),
            })
    })
}
