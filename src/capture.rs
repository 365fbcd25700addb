use image::RgbaImage;
use log::info;
use screenshots::Screen;

use crate::error::CaptureError;

/// Grab the full primary display as a lossless raster.
///
/// Blocking and potentially slow (hundreds of milliseconds); the pipeline runs
/// it on a blocking task. On macOS the first call can trip the
/// screen-recording permission prompt; a denial surfaces as `Backend`, never
/// a crash.
pub fn capture_primary() -> Result<RgbaImage, CaptureError> {
    let screens = Screen::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
    let screen = screens.into_iter().next().ok_or(CaptureError::NoDisplay)?;

    let image = screen
        .capture()
        .map_err(|e| CaptureError::Backend(e.to_string()))?;

    info!("captured {}x{} screenshot", image.width(), image.height());
    Ok(image)
}
