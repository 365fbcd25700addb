use anyhow::Result;
use tauri::{Runtime, WebviewWindow};

/// Platform capability for keeping the surface out of capture pipelines while
/// it stays visible on the local display. One strategy is selected per host at
/// startup so platform branches stay out of the pipeline code.
pub(crate) trait StealthStrategy<R: Runtime>: Send + Sync {
    /// Exclude the window's pixels from other applications' capture output.
    fn enable_capture_exclusion(&self, window: &WebviewWindow<R>) -> Result<()>;

    /// Keep the window out of capture-oriented enumeration (taskbar, spaces)
    /// while it remains visible on the local display.
    fn configure_visibility(&self, window: &WebviewWindow<R>) -> Result<()>;
}

#[cfg(target_os = "windows")]
struct WindowsStealth;

#[cfg(target_os = "windows")]
impl<R: Runtime> StealthStrategy<R> for WindowsStealth {
    fn enable_capture_exclusion(&self, window: &WebviewWindow<R>) -> Result<()> {
        // WDA_EXCLUDEFROMCAPTURE under the hood.
        window.set_content_protected(true)?;
        log::info!("content protection enabled");
        Ok(())
    }

    fn configure_visibility(&self, window: &WebviewWindow<R>) -> Result<()> {
        window.set_skip_taskbar(true)?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
struct MacosStealth;

#[cfg(target_os = "macos")]
impl<R: Runtime> StealthStrategy<R> for MacosStealth {
    fn enable_capture_exclusion(&self, window: &WebviewWindow<R>) -> Result<()> {
        // NSWindowSharingNone under the hood.
        window.set_content_protected(true)?;
        log::info!("window sharing disabled");
        Ok(())
    }

    fn configure_visibility(&self, window: &WebviewWindow<R>) -> Result<()> {
        window.set_visible_on_all_workspaces(true)?;
        Ok(())
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
struct NoStealth;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
impl<R: Runtime> StealthStrategy<R> for NoStealth {
    fn enable_capture_exclusion(&self, _window: &WebviewWindow<R>) -> Result<()> {
        log::warn!("host offers no capture-exclusion primitive; overlay will appear in captures");
        Ok(())
    }

    fn configure_visibility(&self, window: &WebviewWindow<R>) -> Result<()> {
        window.set_skip_taskbar(true)?;
        Ok(())
    }
}

pub(crate) fn host_strategy<R: Runtime>() -> &'static dyn StealthStrategy<R> {
    #[cfg(target_os = "windows")]
    {
        &WindowsStealth
    }
    #[cfg(target_os = "macos")]
    {
        &MacosStealth
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        &NoStealth
    }
}
