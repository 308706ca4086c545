use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::error;

use auto_accept::automation::{Controller, WorkerEvent, create_event_channel, dispatch};
use auto_accept::hotkey::HotkeyConfig;
use auto_accept::matching::{Detector, render_overlay};
use auto_accept::screen::{DesktopScreen, ScreenControl};
use auto_accept::settings::Settings;

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Defaults
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut once = false;
    let mut debug = false;
    let mut timeout_secs: Option<u64> = None;

    // Parse all flags (skip program name)
    for arg in args.iter().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            return ExitCode::SUCCESS;
        } else if arg == "--version" || arg == "-v" {
            println!("Auto Accept v{}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        } else if arg == "--once" {
            once = true;
        } else if arg == "--debug" {
            debug = true;
        } else if let Some(rest) = arg.strip_prefix("--config=") {
            config_path = PathBuf::from(rest);
        } else if let Some(rest) = arg.strip_prefix("--timeout=") {
            match rest.parse::<u64>() {
                Ok(secs) => timeout_secs = Some(secs),
                Err(_) => {
                    eprintln!("❌ Invalid timeout value: {rest}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            eprintln!("❌ Unknown argument: {arg}");
            print_help();
            return ExitCode::FAILURE;
        }
    }

    // A missing or invalid settings file is the one fatal startup error.
    let mut settings = match Settings::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("failed to load settings from {}: {e}", config_path.display());
            eprintln!(
                "❌ Failed to load settings from {}: {e}",
                config_path.display()
            );
            return ExitCode::FAILURE;
        }
    };
    if debug {
        settings.debug = true;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(settings, once, timeout_secs))
}

async fn run(settings: Settings, once: bool, timeout_secs: Option<u64>) -> ExitCode {
    let screen = match DesktopScreen::primary() {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("❌ Failed to open the screen: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logged for the frontend that registers them; this CLI stops on Ctrl-C.
    let _hotkeys = HotkeyConfig::from_settings(&settings);

    if once {
        return run_once(settings, &screen);
    }

    let (events, mut event_rx) = create_event_channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let controller = Controller::new(settings, Arc::new(screen), events);
    if let Err(e) = controller.start() {
        eprintln!("❌ Cannot start: {e}");
        return ExitCode::FAILURE;
    }
    println!("🚀 Watching the screen (Ctrl-C to stop)...");

    match timeout_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => println!("🛑 Ctrl-C received, stopping..."),
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    println!("⏲️ Timeout reached, stopping...");
                }
            }
        }
        None => {
            let _ = tokio::signal::ctrl_c().await;
            println!("🛑 Ctrl-C received, stopping...");
        }
    }

    controller.stop();
    controller.wait().await;
    ExitCode::SUCCESS
}

/// Single attempt: capture, match, click if found, report, exit.
fn run_once(settings: Settings, screen: &DesktopScreen) -> ExitCode {
    let mut detector = Detector::new(&settings);
    let capture = match screen.capture_region(settings.capture_region) {
        Ok(capture) => capture,
        Err(e) => {
            eprintln!("❌ Capture failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = detector.detect(&capture);
    if !result.found {
        println!(
            "👀 Target not found (best confidence {:.3})",
            result.confidence
        );
        return ExitCode::SUCCESS;
    }

    if settings.debug {
        let overlay = render_overlay(&capture, &result);
        if let Err(e) = overlay.save("debug-match.png") {
            eprintln!("⚠️ Failed to save debug overlay: {e}");
        }
    }

    match dispatch::dispatch(screen, &result, settings.capture_region) {
        Ok((x, y)) => {
            println!(
                "✅ Target found and clicked at ({x},{y}) (scale {:.2}, confidence {:.2})",
                result.scale, result.confidence
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Click failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_event(event: &WorkerEvent) {
    match event {
        WorkerEvent::Clicked {
            x,
            y,
            confidence,
            scale,
        } => {
            println!(
                "✅ Target found and clicked at ({x},{y}) (scale {scale:.2}, confidence {confidence:.2})"
            );
        }
        WorkerEvent::NotFound {
            consecutive_failures,
        } => {
            println!("👀 Target not found, retrying... (miss #{consecutive_failures})");
        }
        WorkerEvent::RetriesExhausted {
            consecutive_failures,
        } => {
            println!(
                "⚠️ Still no match after {consecutive_failures} attempts. Please check the screen."
            );
        }
        WorkerEvent::AttemptFailed(reason) => {
            println!("❌ Attempt failed: {reason}");
        }
        WorkerEvent::Stopped => {
            println!("⏹️ Automation stopped");
        }
    }
}

fn print_help() {
    println!("🖱️ Auto Accept Screen Watcher");
    println!();
    println!("USAGE:");
    println!("    auto-accept [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)          Watch the screen until Ctrl-C");
    println!("    --config=PATH       Settings file to load (default: config.json)");
    println!("    --once              Run a single matching attempt and exit");
    println!("    --debug             Save a match overlay image (debug-match.png)");
    println!("    --timeout=N         Auto-stop after N seconds (for testing)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    auto-accept");
    println!("    auto-accept --config=accept.json");
    println!("    auto-accept --once --debug");
    println!("    auto-accept --timeout=120");
}
