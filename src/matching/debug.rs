//! Visual inspection of matches.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::detector::MatchResult;

/// Render the matched rectangle over a copy of the capture.
///
/// Inspection aid only, outside the matching contract; the worker saves the
/// result to disk when debug mode is on.
pub fn render_overlay(capture: &GrayImage, result: &MatchResult) -> GrayImage {
    let mut canvas = capture.clone();
    if result.found && result.width > 0 && result.height > 0 {
        let rect = Rect::at(result.x as i32, result.y as i32).of_size(result.width, result.height);
        draw_hollow_rect_mut(&mut canvas, rect, Luma([255u8]));
    }
    canvas
}
