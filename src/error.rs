use thiserror::Error;

/// Screen capture could not produce an image. On macOS this usually means the
/// screen-recording permission was denied; elsewhere it is a backend failure.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no primary display available")]
    NoDisplay,
    #[error("screen capture failed: {0}")]
    Backend(String),
}

/// The remote inference call failed. `Status` carries the remote error payload
/// verbatim so it can be logged and shown to the user.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed inference response: missing content[0].text")]
    MalformedResponse,
}

/// A global hotkey combination could not be claimed, typically because another
/// process owns it. Recoverable: the binding is skipped and logged.
#[derive(Debug, Error)]
#[error("failed to bind global hotkey {combo}: {reason}")]
pub struct BindingError {
    pub combo: String,
    pub reason: String,
}
