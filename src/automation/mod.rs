// Automation module
// Retry loop that drives matching attempts on a cadence and dispatches a
// click when the target is found.

pub mod channels;
pub mod controller;
pub mod dispatch;
pub mod types;
pub mod worker;

#[cfg(test)]
mod tests;

// Re-export the main types and functions for easy access
pub use channels::create_event_channel;
pub use controller::Controller;
pub use dispatch::{click_point, dispatch};
pub use types::{RunState, WorkerEvent};
pub use worker::Worker;
