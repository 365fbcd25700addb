use std::sync::Mutex;

use log::warn;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};

/// Render states pushed to the overlay page.
///
/// The channel is fire-and-forget with no acknowledgement: last write wins,
/// and a state may be superseded before the page ever renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayState {
    Idle,
    Loading,
    Success { text: String },
    Failure { detail: String },
}

/// One-way bridge from the pipeline to the rendered surface.
///
/// Records the most recent state process-side, then emits the matching named
/// event (`loading`, `ai-analysis`) to the overlay page. Emit failures are
/// logged and dropped.
pub struct Presenter<R: Runtime> {
    app: AppHandle<R>,
    last: Mutex<OverlayState>,
}

impl<R: Runtime> Presenter<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            last: Mutex::new(OverlayState::Idle),
        }
    }

    pub fn present(&self, state: OverlayState) {
        *self.last.lock().unwrap() = state.clone();

        let result = match &state {
            OverlayState::Idle => Ok(()),
            OverlayState::Loading => self.app.emit("loading", ()),
            OverlayState::Success { text } => self.app.emit("ai-analysis", text.clone()),
            OverlayState::Failure { detail } => self
                .app
                .emit("ai-analysis", format!("Analysis failed: {detail}")),
        };

        if let Err(err) = result {
            warn!("failed to emit render event: {err}");
        }
    }

    /// Most recently presented state.
    pub fn last(&self) -> OverlayState {
        self.last.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauri::test::mock_app;

    #[test]
    fn starts_idle() {
        let app = mock_app();
        let presenter = Presenter::new(app.handle().clone());
        assert_eq!(presenter.last(), OverlayState::Idle);
    }

    #[test]
    fn last_write_wins() {
        let app = mock_app();
        let presenter = Presenter::new(app.handle().clone());

        presenter.present(OverlayState::Loading);
        presenter.present(OverlayState::Failure {
            detail: "boom".into(),
        });
        presenter.present(OverlayState::Success {
            text: "answer".into(),
        });

        assert_eq!(
            presenter.last(),
            OverlayState::Success {
                text: "answer".into()
            }
        );
    }
}
