//! Tests for the scheduler loop and control surface, against a fake screen.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::GrayImage;
use tokio::time::timeout;

use super::controller::Controller;
use super::types::WorkerEvent;
use crate::error::{Error, Result};
use crate::screen::{Region, ScreenControl};
use crate::settings::Settings;

/// Scripted screen: serves a sequence of frames (the last one repeats) and
/// records every click.
struct FakeScreen {
    frames: Mutex<(Vec<GrayImage>, usize)>,
    clicks: Mutex<Vec<(u32, u32)>>,
    fail_capture: bool,
}

impl FakeScreen {
    fn new(frames: Vec<GrayImage>) -> Arc<Self> {
        assert!(!frames.is_empty());
        Arc::new(Self {
            frames: Mutex::new((frames, 0)),
            clicks: Mutex::new(Vec::new()),
            fail_capture: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new((vec![GrayImage::new(8, 8)], 0)),
            clicks: Mutex::new(Vec::new()),
            fail_capture: true,
        })
    }

    fn clicks(&self) -> Vec<(u32, u32)> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ScreenControl for FakeScreen {
    fn capture_region(&self, region: Option<Region>) -> Result<GrayImage> {
        if self.fail_capture {
            return Err(Error::Capture("injected capture failure".to_string()));
        }
        let frame = {
            let mut guard = self.frames.lock().unwrap();
            let (frames, index) = &mut *guard;
            let frame = frames[(*index).min(frames.len() - 1)].clone();
            *index += 1;
            frame
        };
        match region {
            Some(r) => {
                if !r.fits_within(frame.width(), frame.height()) {
                    return Err(Error::Capture("region out of bounds".to_string()));
                }
                Ok(image::imageops::crop_imm(&frame, r.x, r.y, r.width, r.height).to_image())
            }
            None => Ok(frame),
        }
    }

    fn click(&self, x: u32, y: u32) -> Result<()> {
        self.clicks.lock().unwrap().push((x, y));
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        let guard = self.frames.lock().unwrap();
        (guard.0[0].width(), guard.0[0].height())
    }
}

fn textured(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        image::Luma([((x * 31 + y * 17) % 251) as u8])
    })
}

// Black background; against a uniform non-zero field the correlation score
// of any texture is mean/rms, high enough to read as a spurious match.
fn frame_with_patch(width: u32, height: u32, patch: &GrayImage, x: u32, y: u32) -> GrayImage {
    let mut frame = GrayImage::new(width, height);
    image::imageops::replace(&mut frame, patch, x as i64, y as i64);
    frame
}

/// Write a template image under the temp dir so the detector can load it.
fn save_template(name: &str, template: &GrayImage) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "auto-accept-test-{}-{}.png",
        name,
        std::process::id()
    ));
    template.save(&path).unwrap();
    path
}

fn test_settings(template_path: &str, interval: f64) -> Settings {
    Settings {
        template_path: template_path.to_string(),
        confidence_threshold: 0.8,
        retry_interval_seconds: interval,
        capture_region: None,
        max_retries: 10,
        enable_multiscale: false,
        debug: false,
        start_hotkey: None,
        stop_hotkey: None,
    }
}

#[tokio::test]
async fn worker_clicks_at_region_translated_coordinates() {
    let template = textured(40, 30);
    let template_path = save_template("translate", &template);

    // Patch at absolute (110, 220); region origin (100, 200) makes that
    // capture-local (10, 20). Expected click: (100+10+20, 200+20+15).
    let frame = frame_with_patch(300, 300, &template, 110, 220);
    let screen = FakeScreen::new(vec![frame]);

    let mut settings = test_settings(&template_path.to_string_lossy(), 0.05);
    settings.capture_region = Some(Region::new(100, 200, 150, 90));

    let (events, _rx) = super::create_event_channel();
    let controller = Controller::new(settings, Arc::clone(&screen), events);
    controller.start().unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while screen.clicks().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    controller.stop();
    controller.wait().await;

    let clicks = screen.clicks();
    assert!(!clicks.is_empty(), "worker never clicked");
    assert_eq!(clicks[0], (130, 235));

    let _ = std::fs::remove_file(template_path);
}

#[tokio::test]
async fn stop_during_wait_ends_the_run_before_the_wait_elapses() {
    let template_path = save_template("promptstop", &textured(16, 16));
    // Black frame: the template never matches, so after the first miss the
    // worker sits in a long backoff wait.
    let screen = FakeScreen::new(vec![GrayImage::new(64, 64)]);
    let settings = test_settings(&template_path.to_string_lossy(), 30.0);

    let (events, _rx) = super::create_event_channel();
    let controller = Controller::new(settings, screen, events);
    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    controller.stop();
    timeout(Duration::from_secs(1), controller.wait())
        .await
        .expect("worker did not observe stop during its wait");

    let _ = std::fs::remove_file(template_path);
}

#[tokio::test]
async fn start_without_template_is_rejected() {
    let screen = FakeScreen::new(vec![GrayImage::new(8, 8)]);
    let (events, _rx) = super::create_event_channel();
    let controller = Controller::new(test_settings("", 1.0), screen, events);

    assert!(matches!(controller.start(), Err(Error::NoTemplate)));
    assert!(!controller.is_active());
}

#[tokio::test]
async fn start_while_running_is_rejected_and_restart_works_after_stop() {
    let template_path = save_template("restart", &textured(16, 16));
    let screen = FakeScreen::new(vec![GrayImage::new(64, 64)]);
    let settings = test_settings(&template_path.to_string_lossy(), 30.0);

    let (events, _rx) = super::create_event_channel();
    let controller = Controller::new(settings, screen, events);

    controller.start().unwrap();
    assert!(controller.is_active());
    assert!(matches!(controller.start(), Err(Error::AlreadyRunning)));

    // stop is idempotent
    controller.stop();
    controller.stop();
    controller.wait().await;
    assert!(!controller.is_active());

    controller.start().unwrap();
    controller.stop();
    controller.wait().await;

    let _ = std::fs::remove_file(template_path);
}

#[tokio::test]
async fn failure_count_resets_after_a_successful_click() {
    let template = textured(24, 24);
    let template_path = save_template("reset", &template);

    let miss = GrayImage::new(96, 96);
    let hit = frame_with_patch(96, 96, &template, 30, 30);
    // miss, hit, then misses forever
    let screen = FakeScreen::new(vec![miss.clone(), hit, miss]);

    let settings = test_settings(&template_path.to_string_lossy(), 0.05);
    let (events, mut rx) = super::create_event_channel();
    let controller = Controller::new(settings, screen, events);
    controller.start().unwrap();

    let mut saw_click = false;
    let mut first_miss_after_click = None;
    while first_miss_after_click.is_none() {
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for worker events")
            .expect("event channel closed");
        match event {
            WorkerEvent::Clicked { .. } => saw_click = true,
            WorkerEvent::NotFound {
                consecutive_failures,
            } if saw_click => first_miss_after_click = Some(consecutive_failures),
            _ => {}
        }
    }
    controller.stop();
    controller.wait().await;

    assert_eq!(first_miss_after_click, Some(1));

    let _ = std::fs::remove_file(template_path);
}

#[tokio::test]
async fn capture_failures_do_not_kill_the_loop() {
    let template_path = save_template("capfail", &textured(16, 16));
    let screen = FakeScreen::failing();
    let settings = test_settings(&template_path.to_string_lossy(), 0.05);

    let (events, mut rx) = super::create_event_channel();
    let controller = Controller::new(settings, screen, events);
    controller.start().unwrap();

    // Observe several failed attempts; the worker must still be alive.
    let mut failures = 0;
    while failures < 3 {
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for worker events")
            .expect("event channel closed");
        if matches!(event, WorkerEvent::AttemptFailed(_)) {
            failures += 1;
        }
    }
    assert!(controller.is_active());

    controller.stop();
    controller.wait().await;

    let _ = std::fs::remove_file(template_path);
}
