//! Turning a match into a single click on the screen.

use log::debug;

use crate::error::Result;
use crate::matching::MatchResult;
use crate::screen::{Region, ScreenControl};

/// Absolute screen point to click for a match: the center of the matched
/// area plus the capture region's origin (0,0 when the whole screen was
/// captured).
pub fn click_point(result: &MatchResult, region: Option<Region>) -> (u32, u32) {
    let (offset_x, offset_y) = region.map(|r| r.origin()).unwrap_or((0, 0));
    let (center_x, center_y) = result.center();
    (offset_x + center_x, offset_y + center_y)
}

/// Issue exactly one click at the match's screen position.
///
/// The click itself is not retried or verified; a click the OS swallows is
/// indistinguishable from a successful one here.
pub fn dispatch<S: ScreenControl + ?Sized>(
    screen: &S,
    result: &MatchResult,
    region: Option<Region>,
) -> Result<(u32, u32)> {
    let (x, y) = click_point(result, region);
    debug!("dispatching click at ({x},{y})");
    screen.click(x, y)?;
    Ok((x, y))
}
