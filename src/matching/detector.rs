//! Multi-scale template matching against a single capture.

use std::path::PathBuf;

use image::GrayImage;
use image::imageops::{self, FilterType};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use log::error;

use super::template::Template;
use crate::settings::Settings;

/// Scale factors tried in order when multi-scale search is enabled.
pub const SCALE_FACTORS: [f32; 5] = [0.8, 0.9, 1.0, 1.1, 1.2];

/// Outcome of one matching attempt.
///
/// When `found` is false, `confidence` still carries the best score seen
/// across all evaluated scales so misses can be logged with how close the
/// attempt came.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub found: bool,
    /// Top-left corner of the match, in capture-local coordinates.
    pub x: u32,
    pub y: u32,
    /// Size of the matched area after scaling.
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
    pub scale: f32,
}

impl MatchResult {
    pub(crate) fn not_found() -> Self {
        Self {
            found: false,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            confidence: 0.0,
            scale: 1.0,
        }
    }

    /// Center of the matched area, in capture-local coordinates.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Find the best placement of `template` inside `capture`.
///
/// Evaluates the template at each factor in [`SCALE_FACTORS`] (just 1.0 when
/// `enable_multiscale` is off), scoring every placement with normalized
/// cross-correlation and keeping each scale's global maximum. The winner is
/// the highest-scoring candidate, accepted only if it strictly exceeds
/// `threshold`. Exact score ties keep the first-evaluated scale; that order
/// dependence is documented behavior, not worth special-casing for float
/// ties that essentially never happen.
///
/// Scales whose resized template exceeds the capture in either axis are
/// skipped without error. Pure function of its inputs.
pub fn locate(
    capture: &GrayImage,
    template: &GrayImage,
    threshold: f32,
    enable_multiscale: bool,
) -> MatchResult {
    let scales: &[f32] = if enable_multiscale {
        &SCALE_FACTORS
    } else {
        &[1.0]
    };

    let mut best: Option<MatchResult> = None;
    let mut best_seen = 0.0f32;

    for &scale in scales {
        let resized;
        let candidate = if (scale - 1.0).abs() < 0.01 {
            template
        } else {
            let width = (template.width() as f32 * scale) as u32;
            let height = (template.height() as f32 * scale) as u32;
            if width == 0 || height == 0 {
                continue;
            }
            resized = imageops::resize(template, width, height, FilterType::CatmullRom);
            &resized
        };

        if candidate.width() > capture.width() || candidate.height() > capture.height() {
            continue;
        }

        let score_map = match_template(
            capture,
            candidate,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        let mut score = f32::NEG_INFINITY;
        let mut location = (0u32, 0u32);
        for (x, y, pixel) in score_map.enumerate_pixels() {
            if pixel[0] > score {
                score = pixel[0];
                location = (x, y);
            }
        }

        best_seen = best_seen.max(score);
        let beats_current = match &best {
            Some(b) => score > b.confidence,
            None => score > threshold,
        };
        if beats_current {
            best = Some(MatchResult {
                found: true,
                x: location.0,
                y: location.1,
                width: candidate.width(),
                height: candidate.height(),
                confidence: score,
                scale,
            });
        }
    }

    best.unwrap_or(MatchResult {
        confidence: best_seen,
        ..MatchResult::not_found()
    })
}

/// Matcher that owns the template for the lifetime of a run.
///
/// Loading failures are swallowed into a not-found result after logging, so
/// one bad attempt never kills the loop; the next attempt retries the load.
pub struct Detector {
    template_path: PathBuf,
    threshold: f32,
    enable_multiscale: bool,
    template: Option<Template>,
}

impl Detector {
    pub fn new(settings: &Settings) -> Self {
        Self {
            template_path: PathBuf::from(&settings.template_path),
            threshold: settings.confidence_threshold,
            enable_multiscale: settings.enable_multiscale,
            template: None,
        }
    }

    /// Run one matching attempt against `capture`.
    pub fn detect(&mut self, capture: &GrayImage) -> MatchResult {
        if let Err(e) = self.ensure_template() {
            error!("{e}");
            return MatchResult::not_found();
        }
        match &self.template {
            Some(template) => locate(
                capture,
                template.image(),
                self.threshold,
                self.enable_multiscale,
            ),
            None => MatchResult::not_found(),
        }
    }

    /// (Re)load the template when absent or when the configured path has
    /// changed since the last load.
    fn ensure_template(&mut self) -> crate::error::Result<()> {
        let stale = match &self.template {
            Some(t) => t.path() != self.template_path,
            None => true,
        };
        if stale {
            self.template = Some(Template::load(&self.template_path)?);
        }
        Ok(())
    }
}
