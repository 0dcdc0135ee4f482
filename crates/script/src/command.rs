//! Scene steps and the answers the runner gives to them.

use serde::{Deserialize, Serialize};
use winpos_core::{HitTest, Point, QueueId, Rect, ShowCommand, WindowPlacement};

/// One scripted operation. Windows are referred to by scene name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ShowWindow {
        window: String,
        command: ShowCommand,
    },
    SetWindowPos {
        window: String,
        /// `"top"`, `"bottom"` or the name of the window to go below.
        #[serde(default)]
        insert_after: Option<String>,
        #[serde(default)]
        rect: Rect,
        /// Flag names such as `"nozorder"`.
        #[serde(default)]
        flags: Vec<String>,
    },
    MoveWindow {
        window: String,
        rect: Rect,
        #[serde(default = "default_true")]
        repaint: bool,
    },
    SetActiveWindow {
        window: String,
    },
    SetForegroundWindow {
        window: String,
    },
    /// Focus a window, or clear focus when `window` is absent.
    SetFocus {
        #[serde(default)]
        window: Option<String>,
    },
    SetCurrentQueue {
        queue: QueueId,
    },
    /// Resolve a screen point, from the desktop unless `scope` is given.
    HitTest {
        point: Point,
        #[serde(default)]
        scope: Option<String>,
    },
    ChildFromPoint {
        parent: String,
        point: Point,
        /// Any of `"invisible"`, `"disabled"`, `"transparent"`.
        #[serde(default)]
        skip: Vec<String>,
    },
    BeginDefer {
        #[serde(default)]
        count: i32,
    },
    DeferWindowPos {
        window: String,
        #[serde(default)]
        insert_after: Option<String>,
        #[serde(default)]
        rect: Rect,
        #[serde(default)]
        flags: Vec<String>,
    },
    EndDefer,
    GetPlacement {
        window: String,
    },
    SetPlacement {
        window: String,
        placement: WindowPlacement,
    },
    /// Arrange minimized children of `parent`, or of the desktop.
    ArrangeIconic {
        #[serde(default)]
        parent: Option<String>,
    },
    /// Map a point between client spaces; absent names mean the desktop.
    MapPoint {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
        point: Point,
    },
    QueryWindow {
        window: String,
    },
    QueryActive,
    DestroyWindow {
        window: String,
    },
}

fn default_true() -> bool {
    true
}

/// The runner's answer to one [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Error {
        message: String,
    },
    Bool {
        value: bool,
    },
    HitTest {
        window: Option<String>,
        code: HitTest,
    },
    /// Window state; rectangles are in screen coordinates.
    Window {
        name: String,
        rect: Rect,
        client_rect: Rect,
        visible: bool,
        minimized: bool,
        maximized: bool,
    },
    Active {
        active: Option<String>,
        foreground: Option<String>,
        focus: Option<String>,
    },
    Placement {
        placement: WindowPlacement,
    },
    Point {
        point: Point,
    },
    /// A plain number, such as the row height of arranged icons.
    Value {
        value: i32,
    },
    Batch {
        entries: usize,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::ShowWindow {
            window: "main".into(),
            command: ShowCommand::ShowMaximized,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"show_window\""));
        assert!(json.contains("show_maximized"));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_command_defaults() {
        let cmd: Command = serde_json::from_str(r#"{"type":"begin_defer"}"#).unwrap();
        assert_eq!(cmd, Command::BeginDefer { count: 0 });

        let cmd: Command = serde_json::from_str(
            r#"{"type":"move_window","window":"a","rect":{"x":1,"y":2,"width":3,"height":4}}"#,
        )
        .unwrap();
        assert!(matches!(cmd, Command::MoveWindow { repaint: true, .. }));
    }

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_string(&Response::Ok).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);

        let resp = Response::HitTest {
            window: Some("button".into()),
            code: HitTest::Client,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"hit_test\""));
        assert!(json.contains("\"code\":\"client\""));
    }

    #[test]
    fn test_error_response() {
        let resp = Response::error("boom");
        assert!(resp.is_error());
        assert_eq!(
            resp,
            Response::Error {
                message: "boom".into()
            }
        );
    }
}
