//! Lifecycle controller for the single managed llama-server.
//!
//! [`ServerController`] owns the server process. Mutating operations
//! (`start`, `stop`, `recover`) are single-flight: a second call while one is
//! in progress fails fast instead of queueing. Observed state is re-derived
//! by a background reconciliation task (see `reconcile`), and published
//! through a `watch` channel so [`ServerController::status`] never waits on
//! the state lock.

mod guard;
mod reconcile;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use llamadeck_core::ports::{
    DiscoveryError, LaunchSpec, ManagedProcess, ModelCatalogPort, ProcessLauncher, ReadinessProbe,
    StartError, StopError,
};
use llamadeck_core::{
    ControllerSettings, FailureReason, ModelDescriptor, ProcessState, ServerEvent, ServerRecord,
    find_model,
};
use tokio::sync::{Mutex, Notify, RwLock, broadcast, watch};
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::guard::OperationGuard;
use crate::state_file::{StateFile, StateRecord};

/// Capacity of the lifecycle event channel.
const EVENT_CAPACITY: usize = 64;

/// Mutable controller state. Every transition happens with this locked.
struct Inner {
    record: ServerRecord,
    process: Option<Box<dyn ManagedProcess>>,
    /// Model the tracked process is serving.
    model: Option<String>,
    /// Address the tracked process was told to bind.
    address: Option<String>,
    /// Bumped whenever the tracked process changes; stale probe results
    /// carry an older value.
    generation: u64,
    starting_since: Option<Instant>,
    stop_deadline: Option<Instant>,
    force_killed: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            record: ServerRecord::stopped(),
            process: None,
            model: None,
            address: None,
            generation: 0,
            starting_since: None,
            stop_deadline: None,
            force_killed: false,
        }
    }

    /// Start tracking a freshly spawned or adopted process.
    fn track(&mut self, process: Box<dyn ManagedProcess>, model: String, address: String) {
        self.generation += 1;
        self.process = Some(process);
        self.model = Some(model);
        self.address = Some(address);
        self.starting_since = Some(Instant::now());
        self.stop_deadline = None;
        self.force_killed = false;
    }

    fn untrack(&mut self) {
        self.generation += 1;
        self.process = None;
        self.model = None;
        self.address = None;
        self.starting_since = None;
        self.stop_deadline = None;
        self.force_killed = false;
    }
}

/// State shared between the controller handle and its reconciliation task.
struct Shared {
    settings: ControllerSettings,
    launcher: Arc<dyn ProcessLauncher>,
    probe: Arc<dyn ReadinessProbe>,
    catalog: Arc<dyn ModelCatalogPort>,
    state_file: Option<StateFile>,
    inner: Mutex<Inner>,
    snapshot: watch::Sender<ServerRecord>,
    events: broadcast::Sender<ServerEvent>,
    in_flight: AtomicBool,
    /// Result of the last successful catalog scan.
    known_models: RwLock<Vec<ModelDescriptor>>,
    wake: Notify,
}

impl Shared {
    /// Replace the record and publish it to snapshot readers and event
    /// subscribers.
    fn transition(&self, inner: &mut Inner, record: ServerRecord) {
        info!(
            from = inner.record.process_state.name(),
            to = %record.process_state,
            pid = ?record.pid,
            "Server state changed"
        );
        let event = ServerEvent::from_record(&record, inner.model.as_deref());
        inner.record = record.clone();
        self.snapshot.send_replace(record);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Transition to a terminal record and drop the tracked process.
    fn finish(&self, inner: &mut Inner, record: ServerRecord) {
        self.transition(inner, record);
        inner.untrack();
        self.forget_state_file();
    }

    fn persist(&self, record: &StateRecord) {
        let Some(state_file) = &self.state_file else {
            return;
        };
        if let Err(e) = state_file.write(record) {
            warn!(path = %state_file.path().display(), error = %e, "Failed to write state file");
        }
    }

    fn forget_state_file(&self) {
        let Some(state_file) = &self.state_file else {
            return;
        };
        if let Err(e) = state_file.remove() {
            warn!(path = %state_file.path().display(), error = %e, "Failed to remove state file");
        }
    }
}

/// Controls the lifecycle of one llama-server process.
///
/// Must be created inside a Tokio runtime: construction spawns the
/// reconciliation task, which runs until [`shutdown`](Self::shutdown) or drop.
pub struct ServerController {
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl ServerController {
    /// Create a controller and start its reconciliation task.
    ///
    /// `state_file` enables persistence of spawned servers for
    /// [`recover`](Self::recover); pass `None` to keep no state on disk.
    pub fn new(
        settings: ControllerSettings,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn ReadinessProbe>,
        catalog: Arc<dyn ModelCatalogPort>,
        state_file: Option<StateFile>,
    ) -> Self {
        let (snapshot, _) = watch::channel(ServerRecord::stopped());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let shared = Arc::new(Shared {
            settings,
            launcher,
            probe,
            catalog,
            state_file,
            inner: Mutex::new(Inner::new()),
            snapshot,
            events,
            in_flight: AtomicBool::new(false),
            known_models: RwLock::new(Vec::new()),
            wake: Notify::new(),
        });

        let cancel = CancellationToken::new();
        tokio::spawn(reconcile::run(Arc::clone(&shared), cancel.clone()));

        Self { shared, cancel }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.shared.settings
    }

    /// Scan the model catalog.
    ///
    /// Never touches the server record. A successful result becomes the set
    /// of models [`start`](Self::start) accepts; a failed scan keeps the
    /// previous set.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError> {
        let models = self.shared.catalog.scan().await?;
        debug!(
            location = %self.shared.catalog.location().display(),
            count = models.len(),
            "Model catalog refreshed"
        );
        *self.shared.known_models.write().await = models.clone();
        Ok(models)
    }

    /// Last reconciled record. Never blocks and never touches the OS.
    pub fn status(&self) -> ServerRecord {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver notified on every record change.
    pub fn subscribe(&self) -> watch::Receiver<ServerRecord> {
        self.shared.snapshot.subscribe()
    }

    /// Receiver of discrete lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<ServerEvent> {
        self.shared.events.subscribe()
    }

    /// Whether a mutating operation is in progress.
    pub fn busy(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Spawn llama-server serving `model_name`.
    ///
    /// Returns once the process is spawned; the record is then `Starting`
    /// and the reconciliation task moves it to `Running` when the readiness
    /// probe succeeds. `model_name` must be in the result of the last
    /// successful [`list_models`](Self::list_models).
    pub async fn start(&self, model_name: &str) -> Result<(), StartError> {
        let _guard = OperationGuard::try_acquire(&self.shared.in_flight)
            .ok_or(StartError::OperationInProgress)?;

        let current = self.shared.inner.lock().await.record.process_state.clone();
        if !current.can_start() {
            return Err(StartError::InvalidState(current));
        }

        let model = find_model(&self.shared.known_models.read().await, model_name)
            .cloned()
            .ok_or_else(|| StartError::UnknownModel(model_name.to_string()))?;

        let settings = &self.shared.settings;
        let mut spec = LaunchSpec::new(&model.name, &model.path, &settings.host, settings.port)
            .with_extra_args(settings.extra_args.clone());
        if let Some(ctx) = settings.context_size {
            spec = spec.with_context_size(ctx);
        }

        info!(model = %model.name, address = %spec.address(), "Starting server");
        let launched = timeout(settings.spawn_timeout(), self.shared.launcher.launch(&spec)).await;

        let mut inner = self.shared.inner.lock().await;
        let process = match launched {
            Ok(Ok(process)) => process,
            Ok(Err(e)) => {
                warn!(model = %model.name, error = %e, "Failed to spawn server");
                self.shared.transition(
                    &mut inner,
                    ServerRecord::failed(FailureReason::SpawnFailed {
                        message: e.to_string(),
                    }),
                );
                return Err(if e.kind() == io::ErrorKind::NotFound {
                    StartError::BinaryUnavailable(e.to_string())
                } else {
                    StartError::Spawn(e.to_string())
                });
            }
            Err(_) => {
                warn!(model = %model.name, timeout = ?settings.spawn_timeout(), "Spawning server timed out");
                self.shared.transition(
                    &mut inner,
                    ServerRecord::failed(FailureReason::SpawnFailed {
                        message: format!("timed out after {:?}", settings.spawn_timeout()),
                    }),
                );
                return Err(StartError::SpawnTimedOut(settings.spawn_timeout()));
            }
        };

        let pid = process.pid();
        let binary = process.executable().map(Path::to_path_buf);
        inner.track(process, model.name.clone(), spec.address());
        self.shared.transition(&mut inner, ServerRecord::starting(pid));
        drop(inner);

        self.shared.persist(&StateRecord {
            pid,
            port: settings.port,
            model: model.name,
            binary,
        });
        self.shared.wake.notify_one();
        Ok(())
    }

    /// Ask the server to stop.
    ///
    /// Sends a graceful termination and returns with the record `Stopping`;
    /// the reconciliation task escalates to a forced kill once the grace
    /// period passes. Stopping when no server is running succeeds without
    /// any OS call.
    pub async fn stop(&self) -> Result<(), StopError> {
        let _guard = OperationGuard::try_acquire(&self.shared.in_flight)
            .ok_or(StopError::OperationInProgress)?;

        let mut inner = self.shared.inner.lock().await;
        match &inner.record.process_state {
            ProcessState::Stopped | ProcessState::Failed(_) => {
                debug!("Stop requested with no server running");
                return Ok(());
            }
            ProcessState::Stopping => {
                return Err(StopError::InvalidState(ProcessState::Stopping));
            }
            ProcessState::Starting | ProcessState::Running => {}
        }

        let Some(process) = inner.process.as_mut() else {
            self.shared.finish(&mut inner, ServerRecord::stopped());
            return Ok(());
        };

        let pid = process.pid();
        process
            .terminate()
            .map_err(|e| StopError::Terminate(e.to_string()))?;
        info!(pid = %pid, "Sent graceful termination");

        inner.stop_deadline = Some(Instant::now() + self.shared.settings.stop_grace());
        inner.force_killed = false;
        let address = inner.record.bound_address.clone();
        self.shared
            .transition(&mut inner, ServerRecord::stopping(pid, address));
        drop(inner);

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Rebuild the record from the persisted state file.
    ///
    /// Only acts while `Stopped`. If the recorded process is alive and is
    /// llama-server it is adopted (record `Starting`, the readiness probe
    /// confirms `Running`) and its pid returned; otherwise the stale state
    /// file is removed.
    pub async fn recover(&self) -> Option<u32> {
        let state_file = self.shared.state_file.as_ref()?;
        let _guard = OperationGuard::try_acquire(&self.shared.in_flight)?;

        let mut inner = self.shared.inner.lock().await;
        if inner.record.process_state != ProcessState::Stopped {
            return None;
        }

        let saved = match state_file.read() {
            Ok(Some(saved)) => saved,
            Ok(None) => return None,
            Err(e) => {
                warn!(path = %state_file.path().display(), error = %e, "Discarding unreadable state file");
                self.shared.forget_state_file();
                return None;
            }
        };

        let Some(process) = self.shared.launcher.adopt(saved.pid, saved.binary.as_deref()) else {
            info!(pid = %saved.pid, "Removing stale state file");
            self.shared.forget_state_file();
            return None;
        };

        let address = format!("{}:{}", self.shared.settings.host, saved.port);
        info!(pid = %saved.pid, model = %saved.model, %address, "Adopted running server");
        inner.track(process, saved.model, address);
        self.shared
            .transition(&mut inner, ServerRecord::starting(saved.pid));
        drop(inner);

        self.shared.wake.notify_one();
        Some(saved.pid)
    }

    /// Stop any tracked server and end the reconciliation task.
    ///
    /// Waits for the server to exit for at most twice the stop grace period.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            warn!(error = %e, "Stop during shutdown failed");
        }

        let settings = &self.shared.settings;
        let deadline = Instant::now() + settings.stop_grace() * 2;
        loop {
            self.shared.reconcile_once().await;
            if !self.status().process_state.has_process() {
                break;
            }
            if Instant::now() >= deadline {
                warn!(pid = ?self.status().pid, "Server still running at shutdown");
                break;
            }
            sleep(settings.fast_poll_interval()).await;
        }

        self.cancel.cancel();
        debug!("Controller shut down");
    }
}

impl Drop for ServerController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
