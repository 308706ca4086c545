//! The control surface observed by the scheduler: start, stop, is_active.
//!
//! Frontends (GUI buttons, hotkey handlers, the CLI) only ever touch this
//! handle. It owns the run flag; the worker owns everything else.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::types::WorkerEvent;
use super::worker::Worker;
use crate::error::{Error, Result};
use crate::screen::ScreenControl;
use crate::settings::Settings;

struct RunHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct Controller<S: ScreenControl> {
    settings: Settings,
    screen: Arc<S>,
    events: mpsc::Sender<WorkerEvent>,
    run: Mutex<Option<RunHandle>>,
}

impl<S: ScreenControl> Controller<S> {
    pub fn new(settings: Settings, screen: Arc<S>, events: mpsc::Sender<WorkerEvent>) -> Self {
        Self {
            settings,
            screen,
            events,
            run: Mutex::new(None),
        }
    }

    /// Whether a worker is currently running.
    pub fn is_active(&self) -> bool {
        self.lock_run()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Spawn the scheduler worker for a new run.
    ///
    /// Rejected synchronously when a run is already active or when no
    /// template image is configured. Must be called from within a tokio
    /// runtime.
    pub fn start(&self) -> Result<()> {
        let mut run = self.lock_run();
        if run.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            return Err(Error::AlreadyRunning);
        }
        if self.settings.template_path.is_empty() {
            return Err(Error::NoTemplate);
        }

        let (stop_tx, stop_rx) = watch::channel(true);
        let worker = Worker::new(
            self.settings.clone(),
            Arc::clone(&self.screen),
            self.events.clone(),
            stop_rx,
        );
        let task = tokio::spawn(worker.run());
        *run = Some(RunHandle { stop_tx, task });
        info!("automation start requested");
        Ok(())
    }

    /// Signal the worker to stop. Safe to call at any time, in any state;
    /// the worker observes it at its next wait-interruption check.
    pub fn stop(&self) {
        if let Some(handle) = self.lock_run().as_ref() {
            let _ = handle.stop_tx.send(false);
            info!("automation stop requested");
        }
    }

    /// Wait for the current run's worker to finish. Intended to be called
    /// after [`stop`](Self::stop); clears the run handle.
    pub async fn wait(&self) {
        let handle = self.lock_run().take();
        if let Some(handle) = handle {
            let _ = handle.task.await;
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, Option<RunHandle>> {
        match self.run.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
