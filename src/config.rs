use log::warn;

/// Remote multimodal endpoint (Anthropic Messages API).
pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-3-5-sonnet-20241022";
pub const MAX_TOKENS: u32 = 1000;

/// Fixed instruction sent with every screenshot.
pub const INSTRUCTION: &str = "Solve this coding problem using Python";

/// Screenshots are downscaled so their width never exceeds this before upload.
pub const MAX_UPLOAD_WIDTH: u32 = 1200;

/// The overlay page renders at this opacity; Tauri exposes no window alpha.
pub const OVERLAY_OPACITY: f64 = 0.7;

/// Vertical increment (physical px) for the move hotkeys.
pub const MOVE_STEP: i32 = 40;

/// Forwarded when no credential is configured; the endpoint rejects it.
pub const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_key: String,
}

impl Config {
    /// Read the credential from the environment. A missing key is a
    /// configuration problem, not a startup failure: the overlay still works,
    /// analysis requests fail remotely.
    pub fn from_env() -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_else(|_| {
            warn!("ANTHROPIC_API_KEY not set; inference requests will be rejected");
            PLACEHOLDER_KEY.to_string()
        });

        Self {
            endpoint: API_URL.to_string(),
            api_key,
        }
    }
}
