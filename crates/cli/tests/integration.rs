//! Integration tests for whole scenes.
//!
//! These tests build scenes from TOML, run their steps through the engine
//! with the host backend and check the responses. They test:
//! - Hit testing through nested and foreign-queue windows
//! - Minimize/maximize/restore round trips
//! - Activation hand-off between top-level windows
//! - Deferred batches
//! - JSON line output

use winpos_core::{HitTest, Point, Rect, ShowCommand, SystemMetrics, WindowPlacement};
use winpos_platform_win32::{HostBackend, HostEvent, HostJournal};
use winpos_script::{to_json_lines, Command, Response, Runner, Scene};

fn build(text: &str) -> (Runner, HostJournal) {
    let scene = Scene::from_toml(text).expect("scene parses");
    let backend = HostBackend::default();
    let journal = backend.journal();
    let runner =
        Runner::new(&scene, SystemMetrics::default(), Box::new(backend)).expect("scene builds");
    (runner, journal)
}

fn run(text: &str) -> Vec<Response> {
    let scene = Scene::from_toml(text).expect("scene parses");
    let mut runner = Runner::new(&scene, SystemMetrics::default(), Box::new(HostBackend::default()))
        .expect("scene builds");
    runner.run(&scene.steps)
}

// ============================================================================
// Hit Testing
// ============================================================================

/// A point inside the child's client area lands on the child; a point
/// outside it lands on the parent.
#[test]
fn test_parent_child_hit_test_scenario() {
    let responses = run(r#"
        [[windows]]
        name = "parent"
        rect = { x = 0, y = 0, width = 800, height = 600 }

        [[windows]]
        name = "child"
        parent = "parent"
        rect = { x = 100, y = 100, width = 200, height = 200 }

        [[steps]]
        type = "hit_test"
        point = { x = 150, y = 150 }

        [[steps]]
        type = "hit_test"
        point = { x = 50, y = 50 }

        [[steps]]
        type = "query_window"
        window = "child"
    "#);

    assert_eq!(
        responses[0],
        Response::HitTest {
            window: Some("child".into()),
            code: HitTest::Client
        }
    );
    assert_eq!(
        responses[1],
        Response::HitTest {
            window: Some("parent".into()),
            code: HitTest::Client
        }
    );
    assert!(matches!(
        &responses[2],
        Response::Window { rect, .. } if *rect == Rect::new(100, 100, 200, 200)
    ));
}

/// Windows of another queue are not asked; they answer as client area.
#[test]
fn test_foreign_queue_window_answers_client() {
    let responses = run(r#"
        [[queues]]
        id = 2
        task = 2

        [[windows]]
        name = "other"
        queue = 2
        rect = { x = 0, y = 0, width = 300, height = 300 }
        replies = { hit_test = "caption" }

        [[steps]]
        type = "hit_test"
        point = { x = 10, y = 10 }

        [[steps]]
        type = "set_current_queue"
        queue = 2

        [[steps]]
        type = "hit_test"
        point = { x = 10, y = 10 }
    "#);

    assert_eq!(
        responses[0],
        Response::HitTest {
            window: Some("other".into()),
            code: HitTest::Client
        }
    );
    assert_eq!(responses[1], Response::Ok);
    assert_eq!(
        responses[2],
        Response::HitTest {
            window: Some("other".into()),
            code: HitTest::Caption
        }
    );
}

/// A transparent child passes the hit on to the sibling underneath.
#[test]
fn test_transparent_child_passes_hit_through() {
    let responses = run(r#"
        [[windows]]
        name = "parent"
        rect = { x = 0, y = 0, width = 400, height = 400 }

        [[windows]]
        name = "under"
        parent = "parent"
        rect = { x = 0, y = 0, width = 200, height = 200 }

        [[windows]]
        name = "glass"
        parent = "parent"
        rect = { x = 0, y = 0, width = 200, height = 200 }
        replies = { hit_test = "transparent" }

        [[steps]]
        type = "hit_test"
        point = { x = 20, y = 20 }
    "#);

    assert_eq!(
        responses[0],
        Response::HitTest {
            window: Some("under".into()),
            code: HitTest::Client
        }
    );
}

// ============================================================================
// Minimize / Maximize / Restore
// ============================================================================

const FRAMED: &str = r#"
    [[windows]]
    name = "app"
    style = ["popup", "visible", "caption", "thickframe"]
    rect = { x = 50, y = 50, width = 300, height = 200 }
"#;

/// Minimizing puts the window in the first icon cell; restoring brings
/// back the normal rectangle.
#[test]
fn test_minimize_restore_round_trip() {
    let (mut runner, _) = build(FRAMED);
    let steps = vec![
        Command::ShowWindow {
            window: "app".into(),
            command: ShowCommand::ShowMinimized,
        },
        Command::QueryWindow {
            window: "app".into(),
        },
        Command::ShowWindow {
            window: "app".into(),
            command: ShowCommand::Restore,
        },
        Command::QueryWindow {
            window: "app".into(),
        },
    ];
    let responses = runner.run(&steps);

    match &responses[1] {
        Response::Window {
            rect, minimized, ..
        } => {
            assert!(*minimized);
            // bottom-left cell of a 1024x768 desktop with 75x75 spacing
            assert_eq!(*rect, Rect::new(21, 715, 32, 32));
        }
        other => panic!("unexpected response {other:?}"),
    }
    match &responses[3] {
        Response::Window {
            rect,
            minimized,
            maximized,
            ..
        } => {
            assert!(!*minimized);
            assert!(!*maximized);
            assert_eq!(*rect, Rect::new(50, 50, 300, 200));
        }
        other => panic!("unexpected response {other:?}"),
    }
}

/// A window minimized from maximized comes back maximized.
#[test]
fn test_restore_to_maximized() {
    let (mut runner, _) = build(FRAMED);
    let show = |command| Command::ShowWindow {
        window: "app".into(),
        command,
    };
    let steps = vec![
        show(ShowCommand::ShowMaximized),
        Command::QueryWindow {
            window: "app".into(),
        },
        show(ShowCommand::ShowMinimized),
        show(ShowCommand::Restore),
        Command::QueryWindow {
            window: "app".into(),
        },
        show(ShowCommand::Restore),
        Command::QueryWindow {
            window: "app".into(),
        },
    ];
    let responses = runner.run(&steps);

    let Response::Window {
        rect: max_rect,
        maximized: true,
        ..
    } = responses[1].clone()
    else {
        panic!("not maximized: {:?}", responses[1]);
    };
    assert!(matches!(
        &responses[4],
        Response::Window { rect, maximized: true, minimized: false, .. } if *rect == max_rect
    ));
    assert!(matches!(
        &responses[6],
        Response::Window { rect, maximized: false, .. } if *rect == Rect::new(50, 50, 300, 200)
    ));
}

/// A window that refuses `QueryOpen` stays minimized.
#[test]
fn test_query_open_refusal_keeps_icon() {
    let responses = run(r#"
        [[windows]]
        name = "stubborn"
        rect = { x = 0, y = 0, width = 100, height = 100 }
        replies = { refuse_query_open = true }

        [[steps]]
        type = "show_window"
        window = "stubborn"
        command = "minimize"

        [[steps]]
        type = "show_window"
        window = "stubborn"
        command = "restore"

        [[steps]]
        type = "query_window"
        window = "stubborn"
    "#);
    assert!(matches!(responses[2], Response::Window { minimized: true, .. }));
}

/// Placement written with `set_placement` reads back unchanged.
#[test]
fn test_set_get_placement() {
    let (mut runner, _) = build(FRAMED);
    let placement = WindowPlacement {
        show_cmd: ShowCommand::ShowNormal,
        set_min_position: false,
        restore_to_maximized: false,
        min_position: None,
        max_position: Some(Point::new(-4, -4)),
        normal_position: Rect::new(10, 20, 400, 300),
    };
    let responses = runner.run(&[
        Command::SetPlacement {
            window: "app".into(),
            placement,
        },
        Command::GetPlacement {
            window: "app".into(),
        },
    ]);
    assert_eq!(responses[0], Response::Bool { value: true });
    let Response::Placement { placement: back } = &responses[1] else {
        panic!("unexpected response {:?}", responses[1]);
    };
    assert_eq!(back.show_cmd, ShowCommand::ShowNormal);
    assert_eq!(back.normal_position, Rect::new(10, 20, 400, 300));
    assert_eq!(back.max_position, Some(Point::new(-4, -4)));
}

// ============================================================================
// Activation
// ============================================================================

/// Activating B after A leaves B active, foreground and focused.
#[test]
fn test_activation_hand_off() {
    let responses = run(r#"
        [[windows]]
        name = "a"
        rect = { x = 0, y = 0, width = 200, height = 100 }

        [[windows]]
        name = "b"
        rect = { x = 300, y = 0, width = 200, height = 100 }

        [[steps]]
        type = "set_active_window"
        window = "a"

        [[steps]]
        type = "set_active_window"
        window = "b"

        [[steps]]
        type = "query_active"
    "#);
    assert_eq!(
        responses[2],
        Response::Active {
            active: Some("b".into()),
            foreground: Some("b".into()),
            focus: Some("b".into()),
        }
    );
}

/// A vetoing hook keeps the current window active.
#[test]
fn test_activation_veto_hook() {
    let responses = run(r#"
        veto_activate = ["b"]

        [[windows]]
        name = "a"
        rect = { x = 0, y = 0, width = 200, height = 100 }

        [[windows]]
        name = "b"
        rect = { x = 300, y = 0, width = 200, height = 100 }

        [[steps]]
        type = "set_active_window"
        window = "a"

        [[steps]]
        type = "set_foreground_window"
        window = "b"

        [[steps]]
        type = "query_active"
    "#);
    assert_eq!(responses[1], Response::Bool { value: false });
    assert!(matches!(
        &responses[2],
        Response::Active { active: Some(a), .. } if a == "a"
    ));
}

// ============================================================================
// Deferred Positioning
// ============================================================================

/// Nine windows in a batch started with the default capacity are all
/// committed, in request order.
#[test]
fn test_nine_entry_batch() {
    let mut text = String::new();
    for i in 0..9 {
        text.push_str(&format!(
            "[[windows]]\nname = \"w{i}\"\nrect = {{ x = {i}, y = 0, width = 10, height = 10 }}\n\n"
        ));
    }
    let (mut runner, journal) = build(&text);

    let mut steps = vec![Command::BeginDefer { count: 0 }];
    for i in 0..9 {
        steps.push(Command::DeferWindowPos {
            window: format!("w{i}"),
            insert_after: None,
            rect: Rect::new(100 + i * 20, 100, 15, 15),
            flags: vec!["nozorder".into(), "noactivate".into()],
        });
    }
    steps.push(Command::EndDefer);
    let responses = runner.run(&steps);

    assert_eq!(responses[9], Response::Batch { entries: 9 });
    assert_eq!(responses[10], Response::Bool { value: true });

    let committed: Vec<Rect> = journal
        .events()
        .into_iter()
        .filter_map(|e| match e {
            HostEvent::Committed { rect, .. } => Some(rect),
            _ => None,
        })
        .collect();
    let expected: Vec<Rect> = (0..9).map(|i| Rect::new(100 + i * 20, 100, 15, 15)).collect();
    assert_eq!(committed, expected);
}

/// A second request for the same window merges into the first entry.
#[test]
fn test_defer_merges_same_window() {
    let (mut runner, journal) = build(FRAMED);
    let defer = |rect, flags: &[&str]| Command::DeferWindowPos {
        window: "app".into(),
        insert_after: None,
        rect,
        flags: flags.iter().map(|f| f.to_string()).collect(),
    };
    let responses = runner.run(&[
        Command::BeginDefer { count: 2 },
        defer(Rect::new(5, 5, 0, 0), &["nosize", "nozorder", "noactivate"]),
        defer(Rect::new(0, 0, 500, 400), &["nomove", "nozorder", "noactivate"]),
        Command::EndDefer,
        Command::QueryWindow {
            window: "app".into(),
        },
    ]);

    assert_eq!(responses[2], Response::Batch { entries: 1 });
    assert_eq!(journal.len(), 1);
    assert!(matches!(
        &responses[4],
        Response::Window { rect, .. } if *rect == Rect::new(5, 5, 500, 400)
    ));
}

// ============================================================================
// Output
// ============================================================================

/// Every response is one JSON line that parses back.
#[test]
fn test_json_lines_output() {
    let responses = run(r#"
        [[windows]]
        name = "a"
        rect = { x = 0, y = 0, width = 50, height = 50 }

        [[steps]]
        type = "map_point"
        from = "a"
        point = { x = 1, y = 2 }

        [[steps]]
        type = "query_window"
        window = "missing"
    "#);
    let text = to_json_lines(&responses).unwrap();
    let parsed: Vec<Response> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(parsed, responses);
    assert_eq!(parsed[0], Response::Point { point: Point::new(1, 2) });
    assert!(parsed[1].is_error());
}

// ============================================================================
// Native Bindings
// ============================================================================

/// A scene window with a native handle is bound in the host backend before
/// any step runs, and later moves still reach the journal.
#[test]
fn test_scene_binds_native_handles() {
    let (mut runner, journal) = build(
        r#"
        [[windows]]
        name = "app"
        rect = { x = 10, y = 10, width = 200, height = 100 }
        native = 4096
    "#,
    );
    let app = runner.window("app").expect("app exists");
    assert_eq!(
        journal.events(),
        vec![HostEvent::Bound {
            window: app,
            native: 0x1000
        }]
    );

    let responses = runner.run(&[
        Command::MoveWindow {
            window: "app".into(),
            rect: Rect::new(20, 30, 200, 100),
            repaint: true,
        },
        Command::DestroyWindow {
            window: "app".into(),
        },
    ]);
    assert!(responses.iter().all(|r| !r.is_error()));
    assert!(journal.events().contains(&HostEvent::Committed {
        window: app,
        rect: Rect::new(20, 30, 200, 100)
    }));
}
