pub mod automation;
pub mod error;
pub mod hotkey;
pub mod matching;
pub mod screen;
pub mod settings;

pub use automation::{Controller, WorkerEvent, create_event_channel};
pub use error::{Error, Result};
pub use matching::{Detector, MatchResult, locate};
pub use screen::{DesktopScreen, Region, ScreenControl};
pub use settings::Settings;
