use crate::mouse_gestures::capture::{CaptureMachine, CaptureNotification, InputEvent, Transition};
use crate::mouse_gestures::clock::{Clock, SystemClock};
use crate::mouse_gestures::db::{CommandRef, GestureDb, GestureRecord};
use crate::mouse_gestures::matcher::best_match;
use crate::mouse_gestures::pattern::Pattern;
use crate::mouse_gestures::suppression::SuppressionMessage;
use crate::settings::{GestureSettings, SettingsError};
use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the service reports to the rest of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Started,
    /// Closest gesture for the pattern drawn so far, if any is within tolerance.
    Preview {
        label: Option<String>,
    },
    Aborted,
    Matched {
        label: String,
        command: CommandRef,
        difference: f64,
    },
    NoMatch,
    /// The gesture is over and any feedback should close.
    Ended,
    Broadcast(SuppressionMessage),
}

pub trait GestureEventSink: Send + Sync {
    fn dispatch(&self, event: GestureEvent);
}

/// Source of host input. `install` hands it the sender the worker listens on.
pub trait InputBackend: Send {
    fn install(&mut self, sender: Sender<InputEvent>) -> anyhow::Result<()>;
    fn uninstall(&mut self) -> anyhow::Result<()>;
    fn is_installed(&self) -> bool;
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

/// Runs a [`CaptureMachine`] and the matcher on one worker thread.
///
/// Events are processed strictly in order on that thread; the inactivity
/// timer is polled every `poll_interval_ms` while no input arrives.
pub struct GestureService {
    settings: GestureSettings,
    gestures: Arc<[GestureRecord]>,
    backend: Box<dyn InputBackend>,
    sink: Arc<dyn GestureEventSink>,
    clock: Arc<dyn Clock>,
    worker: Option<WorkerHandle>,
}

impl GestureService {
    pub fn new(backend: Box<dyn InputBackend>, sink: Arc<dyn GestureEventSink>) -> Self {
        Self::new_with_clock(backend, sink, Arc::new(SystemClock))
    }

    pub fn new_with_clock(
        backend: Box<dyn InputBackend>,
        sink: Arc<dyn GestureEventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings: GestureSettings::default(),
            gestures: Arc::from(Vec::<GestureRecord>::new()),
            backend,
            sink,
            clock,
            worker: None,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let (event_tx, event_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();

        if let Err(err) = self.backend.install(event_tx) {
            tracing::error!(?err, "failed to install input backend");
            return;
        }

        let machine = match CaptureMachine::new(self.settings.clone(), Arc::clone(&self.clock)) {
            Ok(machine) => machine,
            Err(err) => {
                tracing::error!(%err, "refusing to start with invalid gesture settings");
                if let Err(err) = self.backend.uninstall() {
                    tracing::error!(?err, "failed to uninstall input backend");
                }
                return;
            }
        };
        let worker = Worker {
            machine,
            gestures: Arc::clone(&self.gestures),
            sink: Arc::clone(&self.sink),
            debug_logging: self.settings.debug_logging,
        };
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms.max(1));
        let join = thread::spawn(move || worker.run(event_rx, stop_rx, poll_interval));
        self.worker = Some(WorkerHandle { stop_tx, join });
    }

    pub fn stop(&mut self) {
        if self.worker.is_none() && !self.backend.is_installed() {
            return;
        }

        if let Err(err) = self.backend.uninstall() {
            tracing::error!(?err, "failed to uninstall input backend");
        }

        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.join.join().is_err() {
                tracing::error!("gesture worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn update_settings(&mut self, settings: GestureSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        if self.settings == settings {
            return Ok(());
        }
        self.settings = settings;
        self.restart();
        Ok(())
    }

    /// Swap the catalog the worker matches against.
    pub fn update_db(&mut self, db: &GestureDb) {
        self.gestures = db.snapshot();
        // the worker holds the previous snapshot
        self.restart();
    }

    fn restart(&mut self) {
        if self.worker.is_some() {
            self.stop();
            self.start();
        }
    }
}

impl Drop for GestureService {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    machine: CaptureMachine,
    gestures: Arc<[GestureRecord]>,
    sink: Arc<dyn GestureEventSink>,
    debug_logging: bool,
}

impl Worker {
    fn run(mut self, event_rx: Receiver<InputEvent>, stop_rx: Receiver<()>, poll: Duration) {
        loop {
            if stop_rx.try_recv().is_ok() {
                let pending: Vec<InputEvent> = event_rx.try_iter().collect();
                for event in pending {
                    self.handle(&event);
                }
                break;
            }
            match event_rx.recv_timeout(poll) {
                Ok(event) => self.handle(&event),
                Err(mpsc::RecvTimeoutError::Timeout) => self.handle(&InputEvent::Tick),
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        let transition = self.machine.disable();
        self.report(transition);
    }

    fn handle(&mut self, event: &InputEvent) {
        let transition = self.machine.process(event);
        if self.debug_logging && !transition.is_empty() {
            tracing::debug!(
                state = ?self.machine.state(),
                notifications = transition.notifications.len(),
                "gesture transition"
            );
        }
        self.report(transition);
    }

    fn report(&self, transition: Transition) {
        for notification in transition.notifications {
            match notification {
                CaptureNotification::Start { .. } => self.sink.dispatch(GestureEvent::Started),
                CaptureNotification::Update { .. } => {}
                CaptureNotification::Change { pattern } => {
                    let settings = self.machine.settings();
                    let label = best_match(
                        &pattern,
                        &self.gestures,
                        settings.deviation_tolerance,
                        settings.matching_algorithm,
                    )
                    .map(|found| found.record.label.clone());
                    self.sink.dispatch(GestureEvent::Preview { label });
                }
                CaptureNotification::Abort => self.sink.dispatch(GestureEvent::Aborted),
                CaptureNotification::End { pattern, aborted } => {
                    if !aborted {
                        self.dispatch_match(&pattern);
                    }
                    self.sink.dispatch(GestureEvent::Ended);
                }
            }
        }
        if let Some(message) = transition.broadcast {
            self.sink.dispatch(GestureEvent::Broadcast(message));
        }
    }

    fn dispatch_match(&self, pattern: &Pattern) {
        let settings = self.machine.settings();
        match best_match(
            pattern,
            &self.gestures,
            settings.deviation_tolerance,
            settings.matching_algorithm,
        ) {
            Some(found) => {
                tracing::info!(
                    label = %found.record.label,
                    difference = found.difference,
                    "gesture matched"
                );
                self.sink.dispatch(GestureEvent::Matched {
                    label: found.record.label.clone(),
                    command: found.record.command.clone(),
                    difference: found.difference,
                });
            }
            None => {
                tracing::debug!(vectors = pattern.len(), "gesture did not match");
                self.sink.dispatch(GestureEvent::NoMatch);
            }
        }
    }
}

/// In-memory backend for tests; input is injected through [`MockInputHandle`].
#[derive(Clone)]
pub struct MockInputBackend {
    state: Arc<MockInputState>,
}

#[derive(Default)]
struct MockInputState {
    install_count: AtomicUsize,
    uninstall_count: AtomicUsize,
    sender: Mutex<Option<Sender<InputEvent>>>,
}

impl MockInputBackend {
    pub fn new() -> (Self, MockInputHandle) {
        let state = Arc::new(MockInputState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockInputHandle { state },
        )
    }
}

impl InputBackend for MockInputBackend {
    fn install(&mut self, sender: Sender<InputEvent>) -> anyhow::Result<()> {
        let mut guard = self.state.sender.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_none() {
            self.state.install_count.fetch_add(1, Ordering::SeqCst);
            *guard = Some(sender);
        }
        Ok(())
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        let mut guard = self.state.sender.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_some() {
            self.state.uninstall_count.fetch_add(1, Ordering::SeqCst);
        }
        *guard = None;
        Ok(())
    }

    fn is_installed(&self) -> bool {
        match self.state.sender.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }
}

pub struct MockInputHandle {
    state: Arc<MockInputState>,
}

impl MockInputHandle {
    pub fn install_count(&self) -> usize {
        self.state.install_count.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.state.uninstall_count.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: InputEvent) -> bool {
        match self.state.sender.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|sender| sender.send(event).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
