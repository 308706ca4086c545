/// Template matching module for finding the target button in captures
///
/// This module provides correlation-based matching with:
/// - Multi-scale search over a fixed scale ladder
/// - Confidence-threshold acceptance with best-of-scales selection
/// - A cached template that reloads when the configured path changes
/// - An overlay renderer for visual inspection of matches
pub mod debug;
pub mod detector;
pub mod template;


pub use debug::render_overlay;
pub use detector::{Detector, MatchResult, SCALE_FACTORS, locate};
pub use template::Template;
