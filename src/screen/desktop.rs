//! Desktop backend: xcap for capture, enigo for the mouse.

use std::sync::Mutex;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse};
use image::{DynamicImage, GrayImage};
use log::debug;
use xcap::Monitor;

use crate::error::{Error, Result};
use crate::screen::{Region, ScreenControl};

/// Primary-monitor screen access.
///
/// Enigo is not `Sync`, so the handle sits behind a mutex; the automation
/// loop is strictly sequential, so the lock is never contended.
pub struct DesktopScreen {
    monitor: Monitor,
    mouse: Mutex<Enigo>,
}

impl DesktopScreen {
    /// Open the primary monitor (or the first one when none is marked
    /// primary) and an input handle.
    pub fn primary() -> Result<Self> {
        let mut monitors =
            Monitor::all().map_err(|e| Error::Capture(format!("monitor enumeration: {e}")))?;
        if monitors.is_empty() {
            return Err(Error::Capture("no monitors found".to_string()));
        }
        let primary = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        let monitor = monitors.swap_remove(primary);

        let mouse = Enigo::new(&enigo::Settings::default())
            .map_err(|e| Error::Input(format!("input handle: {e}")))?;

        debug!(
            "desktop screen ready: {} ({}x{})",
            monitor.name(),
            monitor.width(),
            monitor.height()
        );
        Ok(Self {
            monitor,
            mouse: Mutex::new(mouse),
        })
    }
}

impl ScreenControl for DesktopScreen {
    fn capture_region(&self, region: Option<Region>) -> Result<GrayImage> {
        let frame = self
            .monitor
            .capture_image()
            .map_err(|e| Error::Capture(format!("screen capture: {e}")))?;
        // xcap re-exports `image` 0.24, but this crate uses `image` 0.25;
        // move the identical RGBA8 bytes into our buffer type so the rest of
        // the pipeline can consume it.
        let (width, height) = (frame.width(), frame.height());
        let frame = image::RgbaImage::from_raw(width, height, frame.into_raw())
            .ok_or_else(|| Error::Capture("captured frame buffer malformed".to_string()))?;
        let gray = DynamicImage::ImageRgba8(frame).to_luma8();

        let Some(region) = region else {
            return Ok(gray);
        };
        // A region hanging off the screen would silently shift every
        // translated click, so refuse it rather than clip it.
        if !region.fits_within(gray.width(), gray.height()) {
            return Err(Error::Capture(format!(
                "capture region {}x{} at ({},{}) exceeds screen {}x{}",
                region.width,
                region.height,
                region.x,
                region.y,
                gray.width(),
                gray.height()
            )));
        }
        let cropped =
            image::imageops::crop_imm(&gray, region.x, region.y, region.width, region.height);
        Ok(cropped.to_image())
    }

    fn click(&self, x: u32, y: u32) -> Result<()> {
        let mut mouse = match self.mouse.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        mouse
            .move_mouse(x as i32, y as i32, Coordinate::Abs)
            .map_err(|e| Error::Input(format!("mouse move: {e}")))?;
        mouse
            .button(Button::Left, Direction::Click)
            .map_err(|e| Error::Input(format!("mouse click: {e}")))?;
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.monitor.width(), self.monitor.height())
    }
}
