//! winpos Scripting
//!
//! Scene files describe a desktop (queues, windows, canned window replies)
//! and a list of steps to run against it. The [`Runner`] builds the scene
//! inside a `WindowManager` and answers every step with a [`Response`].

pub mod command;
pub mod runner;
pub mod scene;

pub use command::{Command, Response};
pub use runner::Runner;
pub use scene::{QueueSpec, Replies, Scene, WindowSpec};

use thiserror::Error;
use winpos_core::{QueueId, WinPosError};

/// Errors raised while loading or running a scene.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Unknown window: {0}")]
    UnknownWindow(String),

    #[error("Window name used twice: {0}")]
    DuplicateWindow(String),

    #[error("Unknown {kind} flag: {name}")]
    UnknownFlag { kind: &'static str, name: String },

    #[error("Unknown queue: {0}")]
    UnknownQueue(QueueId),

    #[error("Queue {0} already exists")]
    QueueExists(QueueId),

    #[error("Failed to create window: {0}")]
    CreateFailed(String),

    #[error("Backend cannot bind window {0} to a native handle")]
    NativeUnsupported(String),

    #[error("No deferred batch is open")]
    NoBatch,

    #[error("A deferred batch is already open")]
    BatchOpen,

    #[error(transparent)]
    Engine(#[from] WinPosError),

    #[error("Failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One JSON object per response, newline separated.
pub fn to_json_lines(responses: &[Response]) -> Result<String, ScriptError> {
    let mut out = String::new();
    for response in responses {
        out.push_str(&serde_json::to_string(response)?);
        out.push('\n');
    }
    Ok(out)
}
