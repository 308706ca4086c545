// Types and enums shared across the automation loop

/// Lifecycle of the scheduler worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopping,
}

/// Feedback from the worker to whichever frontend is listening.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Clicked {
        x: u32,
        y: u32,
        confidence: f32,
        scale: f32,
    },
    NotFound {
        consecutive_failures: u32,
    },
    RetriesExhausted {
        consecutive_failures: u32,
    },
    AttemptFailed(String),
    Stopped,
}
