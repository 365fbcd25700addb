use log::{error, info};
use reqwest::Client;
use tauri::{AppHandle, Manager, Runtime};

use crate::capture;
use crate::config::{Config, MAX_UPLOAD_WIDTH};
use crate::inference;
use crate::preprocess::{self, EncodedImage};
use crate::presenter::{OverlayState, Presenter};

/// Kick off one capture-analyze-present cycle without blocking the caller.
///
/// Cycles are not serialized: a second hotkey press while one is in flight
/// starts another, and whichever finishes last owns the surface. Each cycle
/// emits its loading state up front, so interleavings are visible rather than
/// silently dropped.
pub fn spawn_cycle<R: Runtime>(app: AppHandle<R>) {
    tauri::async_runtime::spawn(async move {
        let presenter = app.state::<Presenter<R>>();
        let client = app.state::<Client>();
        let config = app.state::<Config>();
        run_cycle(&presenter, &client, &config).await;
    });
}

async fn run_cycle<R: Runtime>(presenter: &Presenter<R>, client: &Client, config: &Config) {
    presenter.present(OverlayState::Loading);

    let captured = match tauri::async_runtime::spawn_blocking(capture::capture_primary).await {
        Ok(Ok(image)) => image,
        Ok(Err(err)) => {
            error!("screen capture failed: {err}");
            presenter.present(OverlayState::Failure {
                detail: err.to_string(),
            });
            return;
        }
        Err(err) => {
            error!("capture task panicked: {err}");
            presenter.present(OverlayState::Failure {
                detail: "screen capture failed".into(),
            });
            return;
        }
    };

    let encoded = match preprocess::encode_for_upload(&captured, MAX_UPLOAD_WIDTH) {
        Ok(encoded) => encoded,
        Err(err) => {
            error!("screenshot encoding failed: {err:#}");
            presenter.present(OverlayState::Failure {
                detail: err.to_string(),
            });
            return;
        }
    };
    info!(
        "captured {}x{}, uploading as {}x{}",
        captured.width(),
        captured.height(),
        encoded.width,
        encoded.height
    );

    finish_cycle(presenter, client, config, &encoded).await;
}

/// Inference half of the cycle, split out so the network path can run against
/// an already-encoded image.
pub async fn finish_cycle<R: Runtime>(
    presenter: &Presenter<R>,
    client: &Client,
    config: &Config,
    encoded: &EncodedImage,
) {
    match inference::analyze(client, config, encoded).await {
        Ok(text) => presenter.present(OverlayState::Success { text }),
        Err(err) => {
            error!("inference failed: {err}");
            presenter.present(OverlayState::Failure {
                detail: err.to_string(),
            });
        }
    }
}
