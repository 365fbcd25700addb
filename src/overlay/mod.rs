mod stealth;

use std::sync::Mutex;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, PhysicalPosition, Runtime,
    WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};

use crate::config::{MOVE_STEP, OVERLAY_OPACITY};

pub const OVERLAY_LABEL: &str = "overlay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Surface flags mirrored process-side. The window object cannot be queried
/// for always-on-top, and visibility is only ever mutated through the
/// controller, so this mirror is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SurfaceFlags {
    pub visible: bool,
    pub always_on_top: bool,
}

impl SurfaceFlags {
    pub(crate) fn new() -> Self {
        Self {
            visible: true,
            always_on_top: true,
        }
    }

    pub(crate) fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub(crate) fn toggle_always_on_top(&mut self) -> bool {
        self.always_on_top = !self.always_on_top;
        self.always_on_top
    }
}

/// Logical position and size covering a physical work area.
pub(crate) fn overlay_geometry(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    scale: f64,
) -> (LogicalPosition<f64>, LogicalSize<f64>) {
    let position = LogicalPosition::new(x as f64 / scale, y as f64 / scale);
    let size = LogicalSize::new(width as f64 / scale, height as f64 / scale);
    (position, size)
}

/// Process-wide handle to the single overlay surface.
///
/// Created once in setup and managed in Tauri state; every surface mutation
/// goes through here. The surface dies with the process.
pub struct OverlayController {
    flags: Mutex<SurfaceFlags>,
}

impl OverlayController {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(SurfaceFlags::new()),
        }
    }

    /// Build the overlay sized to the primary display's work area, then apply
    /// the host stealth strategy. Runs inside `setup`, i.e. after the
    /// windowing system has signalled readiness. Failure here is fatal.
    pub fn create<R: Runtime>(&self, app: &AppHandle<R>) -> Result<()> {
        let monitor = app
            .primary_monitor()
            .context("failed to enumerate monitors")?
            .context("no primary monitor")?;
        let scale = monitor.scale_factor();
        let area = monitor.work_area();
        let (position, size) = overlay_geometry(
            area.position.x,
            area.position.y,
            area.size.width,
            area.size.height,
            scale,
        );

        let window = WebviewWindowBuilder::new(app, OVERLAY_LABEL, WebviewUrl::App("index.html".into()))
            .title("")
            .position(position.x, position.y)
            .inner_size(size.width, size.height)
            .decorations(false)
            .resizable(false)
            .minimizable(false)
            .maximizable(false)
            .transparent(true)
            .always_on_top(true)
            .skip_taskbar(true)
            .focused(false)
            .shadow(false)
            .visible(true)
            .initialization_script(&opacity_script())
            .build()
            .context("failed to create overlay window")?;

        // Pointer events fall through to whatever is beneath the surface.
        window
            .set_ignore_cursor_events(true)
            .context("failed to make overlay input-transparent")?;

        // Capture-exclusion must hold for the surface's entire lifetime, so it
        // is applied before the window is handed to anyone else.
        let strategy = stealth::host_strategy();
        strategy.enable_capture_exclusion(&window)?;
        strategy.configure_visibility(&window)?;

        *self.flags.lock().unwrap() = SurfaceFlags::new();

        info!(
            "overlay created: {}x{} at ({}, {})",
            area.size.width, area.size.height, area.position.x, area.position.y
        );
        Ok(())
    }

    /// Recreate the surface if it is gone (macOS dock re-activation).
    pub fn ensure_created<R: Runtime>(&self, app: &AppHandle<R>) -> Result<()> {
        if app.get_webview_window(OVERLAY_LABEL).is_none() {
            self.create(app)?;
        }
        Ok(())
    }

    /// Hide or show the surface. Returns the new visibility. Hiding does not
    /// interrupt an in-flight analysis cycle; its result lands on the hidden
    /// surface.
    pub fn toggle_visibility<R: Runtime>(&self, app: &AppHandle<R>) -> Result<bool> {
        let window = Self::window(app)?;
        let visible = self.flags.lock().unwrap().toggle_visibility();
        if visible {
            window.show().context("failed to show overlay")?;
        } else {
            window.hide().context("failed to hide overlay")?;
        }
        Ok(visible)
    }

    /// Returns the new always-on-top state.
    pub fn toggle_always_on_top<R: Runtime>(&self, app: &AppHandle<R>) -> Result<bool> {
        let window = Self::window(app)?;
        let on_top = self.flags.lock().unwrap().toggle_always_on_top();
        window
            .set_always_on_top(on_top)
            .context("failed to set always-on-top")?;
        Ok(on_top)
    }

    /// Move the surface by a fixed vertical increment and forward the `move`
    /// event so the page can react.
    pub fn nudge<R: Runtime>(&self, app: &AppHandle<R>, direction: Direction) -> Result<()> {
        let window = Self::window(app)?;
        let current = window
            .outer_position()
            .context("failed to read overlay position")?;
        let delta = match direction {
            Direction::Up => -MOVE_STEP,
            Direction::Down => MOVE_STEP,
        };
        window
            .set_position(PhysicalPosition::new(current.x, current.y + delta))
            .context("failed to move overlay")?;
        window
            .emit("move", direction)
            .context("failed to emit move event")?;
        Ok(())
    }

    fn window<R: Runtime>(app: &AppHandle<R>) -> Result<WebviewWindow<R>> {
        app.get_webview_window(OVERLAY_LABEL)
            .context("overlay window not created")
    }
}

fn opacity_script() -> String {
    format!(
        "document.addEventListener('DOMContentLoaded', () => {{ document.body.style.opacity = '{OVERLAY_OPACITY}'; }});"
    )
}
