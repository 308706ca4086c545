// Communication channel from the automation worker to the frontend
use tokio::sync::mpsc;

use super::types::WorkerEvent;

/// Helper function to create the worker event channel
pub fn create_event_channel() -> (mpsc::Sender<WorkerEvent>, mpsc::Receiver<WorkerEvent>) {
    mpsc::channel(32)
}
