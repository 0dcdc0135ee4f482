//! Builds a scene inside a [`WindowManager`] and executes its steps.

use std::collections::HashMap;

use winpos_core::{
    CbtEvent, ChildSkip, DeferredBatch, Dispatch, InsertAfter, Message, PositionBackend, Rect,
    SystemMetrics, WindowDesc, WindowId, WindowManager,
};

use crate::command::{Command, Response};
use crate::scene::{parse_ex_style, parse_style, parse_swp_flags, Replies, Scene, WindowSpec};
use crate::ScriptError;

/// Executes scene steps against a live window manager.
#[derive(Debug)]
pub struct Runner {
    wm: WindowManager,
    names: HashMap<String, WindowId>,
    batch: Option<DeferredBatch>,
    stop_on_error: bool,
}

impl Runner {
    /// Build every queue, window and hook the scene declares.
    pub fn new(
        scene: &Scene,
        metrics: SystemMetrics,
        backend: Box<dyn PositionBackend>,
    ) -> Result<Self, ScriptError> {
        scene.validate()?;
        let mut runner = Self {
            wm: WindowManager::with_backend(metrics, backend),
            names: HashMap::new(),
            batch: None,
            stop_on_error: false,
        };

        for q in &scene.queues {
            if !runner.wm.create_queue(q.id, q.task) {
                return Err(ScriptError::QueueExists(q.id));
            }
            if let Some(target) = q.attach_to {
                if !runner.wm.queues_mut().attach(q.id, target) {
                    return Err(ScriptError::UnknownQueue(target));
                }
            }
        }
        for spec in &scene.windows {
            runner.create(spec)?;
        }
        runner.install_vetoes(&scene.veto_activate, &scene.veto_minmax)?;

        tracing::debug!(
            windows = scene.windows.len(),
            queues = scene.queues.len(),
            "scene built"
        );
        Ok(runner)
    }

    /// Stop `run` at the first step that answers with an error.
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn manager(&self) -> &WindowManager {
        &self.wm
    }

    pub fn manager_mut(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    pub fn window(&self, name: &str) -> Result<WindowId, ScriptError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ScriptError::UnknownWindow(name.to_string()))
    }

    /// Scene name of a window; unnamed windows such as icon titles and the
    /// desktop get a `#id` label.
    pub fn name_of(&self, id: WindowId) -> String {
        self.names
            .iter()
            .find(|(_, &w)| w == id)
            .map(|(n, _)| n.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    fn label(&self, id: Option<WindowId>) -> Option<String> {
        id.map(|w| self.name_of(w))
    }

    fn create(&mut self, spec: &WindowSpec) -> Result<(), ScriptError> {
        let mut desc = match &spec.parent {
            Some(parent) => WindowDesc::child(self.window(parent)?, spec.rect),
            None => WindowDesc::new(spec.rect),
        };
        if !spec.style.is_empty() {
            desc = desc.with_style(parse_style(&spec.style)?);
        }
        desc = desc.with_ex_style(parse_ex_style(&spec.ex_style)?);
        if let Some(owner) = &spec.owner {
            desc = desc.owned_by(self.window(owner)?);
        }
        if let Some(queue) = spec.queue {
            desc = desc.on_queue(queue);
        }
        if let Some(client) = spec.client_rect {
            desc = desc.with_client_rect(client);
        }
        if let Some(region) = spec.region() {
            desc = desc.with_region(region);
        }

        let id = self
            .wm
            .create_window(desc)
            .ok_or_else(|| ScriptError::CreateFailed(spec.name.clone()))?;
        if !spec.replies.is_default() {
            self.wm.set_window_proc(id, Box::new(scripted_proc(spec.replies.clone())));
        }
        self.names.insert(spec.name.clone(), id);
        if let Some(handle) = spec.native {
            if !self.wm.bind_native(id, handle) {
                return Err(ScriptError::NativeUnsupported(spec.name.clone()));
            }
        }
        Ok(())
    }

    fn install_vetoes(&mut self, activate: &[String], minmax: &[String]) -> Result<(), ScriptError> {
        let activate: Vec<WindowId> = activate
            .iter()
            .map(|n| self.window(n))
            .collect::<Result<_, _>>()?;
        let minmax: Vec<WindowId> = minmax
            .iter()
            .map(|n| self.window(n))
            .collect::<Result<_, _>>()?;
        if activate.is_empty() && minmax.is_empty() {
            return Ok(());
        }
        self.wm.hooks_mut().install(Box::new(move |event: &CbtEvent| match event {
            CbtEvent::Activate {
                window: Some(w), ..
            } => activate.contains(w),
            CbtEvent::MinMax { window, .. } => minmax.contains(window),
            _ => false,
        }));
        Ok(())
    }

    fn insert_after(&self, target: Option<&str>) -> Result<InsertAfter, ScriptError> {
        Ok(match target {
            None | Some("top") => InsertAfter::Top,
            Some("bottom") => InsertAfter::Bottom,
            Some(name) => InsertAfter::After(self.window(name)?),
        })
    }

    fn optional(&self, name: Option<&str>) -> Result<Option<WindowId>, ScriptError> {
        name.map(|n| self.window(n)).transpose()
    }

    /// Execute one step.
    pub fn execute(&mut self, cmd: &Command) -> Result<Response, ScriptError> {
        tracing::trace!(?cmd, "step");
        let response = match cmd {
            Command::ShowWindow { window, command } => {
                let w = self.window(window)?;
                let was_visible = self.wm.show_window(w, *command);
                Response::Bool { value: was_visible }
            }
            Command::SetWindowPos {
                window,
                insert_after,
                rect,
                flags,
            } => {
                let w = self.window(window)?;
                let after = self.insert_after(insert_after.as_deref())?;
                let flags = parse_swp_flags(flags)?;
                let value = self
                    .wm
                    .set_window_pos(w, after, rect.x, rect.y, rect.width, rect.height, flags);
                Response::Bool { value }
            }
            Command::MoveWindow {
                window,
                rect,
                repaint,
            } => {
                let w = self.window(window)?;
                let value = self
                    .wm
                    .move_window(w, rect.x, rect.y, rect.width, rect.height, *repaint);
                Response::Bool { value }
            }
            Command::SetActiveWindow { window } => {
                let w = self.window(window)?;
                self.wm.set_active_window(w);
                self.active_state()
            }
            Command::SetForegroundWindow { window } => {
                let w = self.window(window)?;
                Response::Bool {
                    value: self.wm.set_foreground_window(w),
                }
            }
            Command::SetFocus { window } => {
                let w = self.optional(window.as_deref())?;
                self.wm.set_focus(w);
                self.active_state()
            }
            Command::SetCurrentQueue { queue } => {
                if !self.wm.set_current_queue(*queue) {
                    return Err(ScriptError::UnknownQueue(*queue));
                }
                Response::Ok
            }
            Command::HitTest { point, scope } => {
                let hit = match scope {
                    Some(name) => {
                        let w = self.window(name)?;
                        self.wm.window_from_point(w, *point)
                    }
                    None => self.wm.window_from_point_screen(*point),
                };
                Response::HitTest {
                    window: self.label(hit.window),
                    code: hit.code,
                }
            }
            Command::ChildFromPoint {
                parent,
                point,
                skip,
            } => {
                let p = self.window(parent)?;
                let skip = skip.iter().try_fold(ChildSkip::empty(), |acc, name| {
                    ChildSkip::from_name(&name.to_ascii_uppercase())
                        .map(|s| acc | s)
                        .ok_or_else(|| ScriptError::UnknownFlag {
                            kind: "skip",
                            name: name.clone(),
                        })
                })?;
                let child = self.wm.child_window_from_point_ex(p, *point, skip);
                Response::HitTest {
                    window: self.label(child),
                    code: winpos_core::HitTest::Client,
                }
            }
            Command::BeginDefer { count } => {
                if self.batch.is_some() {
                    return Err(ScriptError::BatchOpen);
                }
                let batch = self.wm.begin_defer_window_pos(*count)?;
                self.batch = Some(batch);
                Response::Batch { entries: 0 }
            }
            Command::DeferWindowPos {
                window,
                insert_after,
                rect,
                flags,
            } => {
                if self.batch.is_none() {
                    return Err(ScriptError::NoBatch);
                }
                let w = self.window(window)?;
                let after = self.insert_after(insert_after.as_deref())?;
                let flags = parse_swp_flags(flags)?;
                // Only an engine failure consumes the open batch.
                let batch = self.batch.take().ok_or(ScriptError::NoBatch)?;
                let batch = self.wm.defer_window_pos(
                    batch,
                    w,
                    after,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    flags,
                )?;
                let entries = batch.len();
                self.batch = Some(batch);
                Response::Batch { entries }
            }
            Command::EndDefer => {
                let batch = self.batch.take().ok_or(ScriptError::NoBatch)?;
                Response::Bool {
                    value: self.wm.end_defer_window_pos(batch),
                }
            }
            Command::GetPlacement { window } => {
                let w = self.window(window)?;
                let placement = self
                    .wm
                    .get_window_placement(w)
                    .ok_or_else(|| ScriptError::UnknownWindow(window.clone()))?;
                Response::Placement { placement }
            }
            Command::SetPlacement { window, placement } => {
                let w = self.window(window)?;
                Response::Bool {
                    value: self.wm.set_window_placement(w, placement),
                }
            }
            Command::ArrangeIconic { parent } => {
                let p = match parent {
                    Some(name) => self.window(name)?,
                    None => self.wm.desktop(),
                };
                Response::Value {
                    value: self.wm.arrange_iconic_windows(p),
                }
            }
            Command::MapPoint { from, to, point } => {
                let from = self.optional(from.as_deref())?;
                let to = self.optional(to.as_deref())?;
                let mut points = [*point];
                self.wm.map_window_points(from, to, &mut points);
                Response::Point { point: points[0] }
            }
            Command::QueryWindow { window } => {
                let w = self.window(window)?;
                self.window_state(window, w)?
            }
            Command::QueryActive => self.active_state(),
            Command::DestroyWindow { window } => {
                let w = self.window(window)?;
                let value = self.wm.destroy_window(w);
                self.names.retain(|_, id| self.wm.is_window(*id));
                Response::Bool { value }
            }
        };
        Ok(response)
    }

    fn window_state(&self, name: &str, w: WindowId) -> Result<Response, ScriptError> {
        let store = self.wm.windows();
        let missing = || ScriptError::UnknownWindow(name.to_string());
        let rect: Rect = store.screen_window_rect(w).ok_or_else(missing)?;
        let client_rect = store.screen_client_rect(w).ok_or_else(missing)?;
        Ok(Response::Window {
            name: name.to_string(),
            rect,
            client_rect,
            visible: store.is_visible(w),
            minimized: self.wm.is_iconic(w),
            maximized: self.wm.is_zoomed(w),
        })
    }

    fn active_state(&self) -> Response {
        Response::Active {
            active: self.label(self.wm.get_active_window()),
            foreground: self.label(self.wm.get_foreground_window()),
            focus: self.label(self.wm.get_focus()),
        }
    }

    /// Execute every step. Failures become `error` responses; with
    /// `stop_on_error` the first one ends the run.
    pub fn run(&mut self, steps: &[Command]) -> Vec<Response> {
        let mut responses = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let response = self.execute(step).unwrap_or_else(|e| {
                tracing::warn!(step = index, "step failed: {e}");
                Response::error(e.to_string())
            });
            let failed = response.is_error();
            responses.push(response);
            if failed && self.stop_on_error {
                break;
            }
        }
        responses
    }
}

/// Window procedure that answers queries from a [`Replies`] table.
fn scripted_proc(
    replies: Replies,
) -> impl FnMut(&mut WindowManager, WindowId, &mut Message) -> Dispatch {
    move |_wm: &mut WindowManager, _hwnd: WindowId, msg: &mut Message| match msg {
        Message::QueryOpen { allow } if replies.refuse_query_open => {
            *allow = false;
            Dispatch::Handled
        }
        Message::NcActivate {
            active: false,
            allow,
        } if replies.refuse_nc_activate => {
            *allow = false;
            Dispatch::Handled
        }
        Message::NcHitTest { result, .. } => match replies.hit_test {
            Some(code) => {
                *result = code;
                Dispatch::Handled
            }
            None => Dispatch::Default,
        },
        Message::GetMinMaxInfo(info) => {
            if let Some(min) = replies.min_track {
                info.min_track = min;
            }
            if let Some(max) = replies.max_track {
                info.max_track = max;
            }
            Dispatch::Handled
        }
        _ => Dispatch::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winpos_core::{HitTest, NullBackend, Point, ShowCommand};

    fn runner(text: &str) -> Runner {
        let scene = Scene::from_toml(text).unwrap();
        Runner::new(&scene, SystemMetrics::default(), Box::new(NullBackend)).unwrap()
    }

    const TWO_WINDOWS: &str = r#"
        [[windows]]
        name = "a"
        style = ["popup", "visible", "caption"]
        rect = { x = 0, y = 0, width = 200, height = 100 }

        [[windows]]
        name = "b"
        style = ["popup", "visible", "caption"]
        rect = { x = 300, y = 0, width = 200, height = 100 }
    "#;

    #[test]
    fn test_names_resolve() {
        let r = runner(TWO_WINDOWS);
        let a = r.window("a").unwrap();
        assert_eq!(r.name_of(a), "a");
        assert!(matches!(r.window("zz"), Err(ScriptError::UnknownWindow(_))));
        assert_eq!(r.name_of(r.manager().desktop()), format!("#{}", r.manager().desktop()));
    }

    #[test]
    fn test_activation_steps() {
        let mut r = runner(TWO_WINDOWS);
        r.execute(&Command::SetActiveWindow { window: "a".into() })
            .unwrap();
        r.execute(&Command::SetActiveWindow { window: "b".into() })
            .unwrap();
        assert_eq!(
            r.execute(&Command::QueryActive).unwrap(),
            Response::Active {
                active: Some("b".into()),
                foreground: Some("b".into()),
                focus: Some("b".into()),
            }
        );
    }

    #[test]
    fn test_refused_nc_activate_keeps_window_active() {
        let mut r = runner(
            r#"
            [[windows]]
            name = "a"
            rect = { x = 0, y = 0, width = 200, height = 100 }
            replies = { refuse_nc_activate = true }

            [[windows]]
            name = "b"
            rect = { x = 300, y = 0, width = 200, height = 100 }
            "#,
        );
        r.execute(&Command::SetActiveWindow { window: "a".into() })
            .unwrap();
        r.execute(&Command::SetActiveWindow { window: "b".into() })
            .unwrap();
        let a = r.window("a").unwrap();
        assert_eq!(r.manager().get_active_window(), Some(a));
    }

    #[test]
    fn test_scripted_hit_test_answer() {
        let mut r = runner(
            r#"
            [[windows]]
            name = "main"
            rect = { x = 0, y = 0, width = 400, height = 300 }
            replies = { hit_test = "caption" }
            "#,
        );
        let resp = r
            .execute(&Command::HitTest {
                point: Point::new(50, 50),
                scope: None,
            })
            .unwrap();
        assert_eq!(
            resp,
            Response::HitTest {
                window: Some("main".into()),
                code: HitTest::Caption
            }
        );
    }

    #[test]
    fn test_defer_requires_open_batch() {
        let mut r = runner(TWO_WINDOWS);
        assert!(matches!(r.execute(&Command::EndDefer), Err(ScriptError::NoBatch)));
        r.execute(&Command::BeginDefer { count: 0 }).unwrap();
        assert!(matches!(
            r.execute(&Command::BeginDefer { count: 0 }),
            Err(ScriptError::BatchOpen)
        ));
        let resp = r
            .execute(&Command::DeferWindowPos {
                window: "a".into(),
                insert_after: None,
                rect: Rect::new(5, 5, 50, 50),
                flags: vec!["nozorder".into(), "noactivate".into()],
            })
            .unwrap();
        assert_eq!(resp, Response::Batch { entries: 1 });
        assert_eq!(r.execute(&Command::EndDefer).unwrap(), Response::Bool { value: true });
        let a = r.window("a").unwrap();
        assert_eq!(r.manager().get_window_rect(a), Some(Rect::new(5, 5, 50, 50)));
    }

    #[test]
    fn test_bad_defer_step_keeps_open_batch() {
        let mut r = runner(TWO_WINDOWS);
        r.execute(&Command::BeginDefer { count: 0 }).unwrap();
        r.execute(&Command::DeferWindowPos {
            window: "a".into(),
            insert_after: None,
            rect: Rect::new(5, 5, 50, 50),
            flags: vec!["nozorder".into(), "noactivate".into()],
        })
        .unwrap();

        assert!(matches!(
            r.execute(&Command::DeferWindowPos {
                window: "ghost".into(),
                insert_after: None,
                rect: Rect::new(0, 0, 10, 10),
                flags: vec![],
            }),
            Err(ScriptError::UnknownWindow(_))
        ));
        assert!(matches!(
            r.execute(&Command::DeferWindowPos {
                window: "b".into(),
                insert_after: None,
                rect: Rect::new(0, 0, 10, 10),
                flags: vec!["sideways".into()],
            }),
            Err(ScriptError::UnknownFlag { .. })
        ));

        assert_eq!(r.execute(&Command::EndDefer).unwrap(), Response::Bool { value: true });
        let a = r.window("a").unwrap();
        let b = r.window("b").unwrap();
        assert_eq!(r.manager().get_window_rect(a), Some(Rect::new(5, 5, 50, 50)));
        assert_eq!(r.manager().get_window_rect(b), Some(Rect::new(300, 0, 200, 100)));
    }

    #[test]
    fn test_native_handle_needs_capable_backend() {
        let scene = Scene::from_toml(
            r#"
            [[windows]]
            name = "a"
            rect = { x = 0, y = 0, width = 200, height = 100 }
            native = 4660
            "#,
        )
        .unwrap();
        assert_eq!(scene.windows[0].native, Some(0x1234));
        assert!(matches!(
            Runner::new(&scene, SystemMetrics::default(), Box::new(NullBackend)),
            Err(ScriptError::NativeUnsupported(_))
        ));
    }

    #[test]
    fn test_minmax_veto_hook() {
        let mut r = runner(
            r#"
            veto_minmax = ["a"]

            [[windows]]
            name = "a"
            rect = { x = 0, y = 0, width = 200, height = 100 }
            "#,
        );
        r.execute(&Command::ShowWindow {
            window: "a".into(),
            command: ShowCommand::ShowMinimized,
        })
        .unwrap();
        let a = r.window("a").unwrap();
        assert!(!r.manager().is_iconic(a));
    }

    #[test]
    fn test_run_collects_errors() {
        let mut r = runner(TWO_WINDOWS);
        let steps = vec![
            Command::QueryWindow { window: "ghost".into() },
            Command::QueryWindow { window: "a".into() },
        ];
        let responses = r.run(&steps);
        assert_eq!(responses.len(), 2);
        assert!(responses[0].is_error());
        assert!(matches!(&responses[1], Response::Window { name, visible: true, .. } if name == "a"));

        let mut r = runner(TWO_WINDOWS).stop_on_error(true);
        assert_eq!(r.run(&steps).len(), 1);
    }

    #[test]
    fn test_destroy_forgets_names() {
        let mut r = runner(
            r#"
            [[windows]]
            name = "main"
            rect = { x = 0, y = 0, width = 400, height = 300 }

            [[windows]]
            name = "child"
            parent = "main"
            rect = { x = 10, y = 10, width = 40, height = 30 }
            "#,
        );
        assert_eq!(
            r.execute(&Command::DestroyWindow { window: "main".into() })
                .unwrap(),
            Response::Bool { value: true }
        );
        assert!(r.window("child").is_err());
    }
}
