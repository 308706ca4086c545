//! Screen access boundary: capturing pixels and sending clicks.
//!
//! The automation core only talks to this trait, so the matching and retry
//! logic can be exercised against a fake screen in tests and a different
//! backend can be dropped in without touching the loop.

pub mod desktop;
pub mod types;

pub use desktop::DesktopScreen;
pub use types::Region;

use image::GrayImage;

use crate::error::Result;

/// Capture and input capability supplied by the environment.
pub trait ScreenControl: Send + Sync + 'static {
    /// Grab a grayscale capture of the given region, or the whole screen
    /// when `None`.
    fn capture_region(&self, region: Option<Region>) -> Result<GrayImage>;

    /// Press and release the primary button at absolute screen coordinates.
    fn click(&self, x: u32, y: u32) -> Result<()>;

    /// Full screen size in pixels.
    fn screen_dimensions(&self) -> (u32, u32);
}
