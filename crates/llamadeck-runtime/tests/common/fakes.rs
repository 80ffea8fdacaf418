//! In-memory port implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use llamadeck_core::ports::{
    DiscoveryError, ExitInfo, LaunchSpec, ManagedProcess, ModelCatalogPort, ProbeOutcome,
    ProcessLauncher, ReadinessProbe,
};
use llamadeck_core::ModelDescriptor;
use tokio::sync::Notify;

const SIGTERM: i32 = 15;
const SIGKILL: i32 = 9;

/// Binary every fake launch reports.
pub const FAKE_BINARY: &str = "/opt/llama.cpp/bin/llama-server";

/// Test-side view of a fake process.
#[derive(Debug, Default)]
pub struct ProcessControl {
    state: Mutex<ProcessFlags>,
}

#[derive(Debug, Default)]
struct ProcessFlags {
    exit: Option<ExitInfo>,
    exit_on_terminate: bool,
    fail_try_exit: bool,
    terminate_calls: usize,
    kill_calls: usize,
}

impl ProcessControl {
    fn flags(&self) -> std::sync::MutexGuard<'_, ProcessFlags> {
        self.state.lock().unwrap()
    }

    /// Make the process exit on its own.
    pub fn exit_with(&self, exit: ExitInfo) {
        self.flags().exit = Some(exit);
    }

    /// Make liveness checks fail.
    pub fn lose(&self) {
        self.flags().fail_try_exit = true;
    }

    pub fn terminate_calls(&self) -> usize {
        self.flags().terminate_calls
    }

    pub fn kill_calls(&self) -> usize {
        self.flags().kill_calls
    }
}

struct FakeProcess {
    pid: u32,
    executable: Option<PathBuf>,
    control: Arc<ProcessControl>,
}

impl ManagedProcess for FakeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>> {
        let flags = self.control.flags();
        if flags.fail_try_exit {
            return Err(io::Error::other("wait failed"));
        }
        Ok(flags.exit.clone())
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut flags = self.control.flags();
        flags.terminate_calls += 1;
        if flags.exit_on_terminate {
            flags.exit = Some(ExitInfo {
                signal: Some(SIGTERM),
                ..ExitInfo::unknown()
            });
        }
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut flags = self.control.flags();
        flags.kill_calls += 1;
        flags.exit = Some(ExitInfo {
            signal: Some(SIGKILL),
            ..ExitInfo::unknown()
        });
        Ok(())
    }

    fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }
}

/// How [`FakeLauncher::launch`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Spawn a fake process that exits when terminated.
    Cooperative,
    /// Spawn a fake process that ignores termination.
    Stubborn,
    /// Fail as if the binary were missing.
    MissingBinary,
    /// Fail with a generic spawn error.
    SpawnError,
    /// Never return.
    Hang,
}

pub struct FakeLauncher {
    mode: Mutex<LaunchMode>,
    launches: AtomicUsize,
    next_pid: AtomicU32,
    processes: Mutex<Vec<Arc<ProcessControl>>>,
    specs: Mutex<Vec<LaunchSpec>>,
    adoptable: Mutex<Vec<u32>>,
    adoption_requests: Mutex<Vec<(u32, Option<PathBuf>)>>,
    gated: AtomicBool,
    /// Signalled when a gated launch is entered.
    pub entered: Notify,
    /// Releases a gated launch.
    pub gate: Notify,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            mode: Mutex::new(LaunchMode::Cooperative),
            launches: AtomicUsize::new(0),
            next_pid: AtomicU32::new(1000),
            processes: Mutex::new(Vec::new()),
            specs: Mutex::new(Vec::new()),
            adoptable: Mutex::new(Vec::new()),
            adoption_requests: Mutex::new(Vec::new()),
            gated: AtomicBool::new(false),
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub fn set_mode(&self, mode: LaunchMode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Block launches until `gate` is notified.
    pub fn hold_launches(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn allow_adoption(&self, pid: u32) {
        self.adoptable.lock().unwrap().push(pid);
    }

    /// `(pid, recorded binary)` of every `adopt` call.
    pub fn adoption_requests(&self) -> Vec<(u32, Option<PathBuf>)> {
        self.adoption_requests.lock().unwrap().clone()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Control handle of the most recently launched or adopted process.
    pub fn last_process(&self) -> Arc<ProcessControl> {
        self.processes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no process launched")
    }

    pub fn last_spec(&self) -> LaunchSpec {
        self.specs
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no process launched")
    }

    fn register(
        &self,
        pid: u32,
        executable: Option<PathBuf>,
        exit_on_terminate: bool,
    ) -> Box<dyn ManagedProcess> {
        let control = Arc::new(ProcessControl::default());
        control.flags().exit_on_terminate = exit_on_terminate;
        self.processes.lock().unwrap().push(control.clone());
        Box::new(FakeProcess {
            pid,
            executable,
            control,
        })
    }
}

#[async_trait]
impl ProcessLauncher for FakeLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> io::Result<Box<dyn ManagedProcess>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.gate.notified().await;
        }

        let mode = *self.mode.lock().unwrap();
        match mode {
            LaunchMode::MissingBinary => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "llama-server binary not found",
            )),
            LaunchMode::SpawnError => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            LaunchMode::Hang => std::future::pending().await,
            LaunchMode::Cooperative | LaunchMode::Stubborn => {
                self.specs.lock().unwrap().push(spec.clone());
                let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
                Ok(self.register(
                    pid,
                    Some(PathBuf::from(FAKE_BINARY)),
                    mode == LaunchMode::Cooperative,
                ))
            }
        }
    }

    fn adopt(&self, pid: u32, executable: Option<&Path>) -> Option<Box<dyn ManagedProcess>> {
        self.adoption_requests
            .lock()
            .unwrap()
            .push((pid, executable.map(Path::to_path_buf)));
        let adoptable = self.adoptable.lock().unwrap().contains(&pid);
        adoptable.then(|| self.register(pid, None, true))
    }
}

pub struct FakeProbe {
    ready: AtomicBool,
    calls: AtomicUsize,
    addresses: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            addresses: Mutex::new(Vec::new()),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadinessProbe for FakeProbe {
    async fn probe(&self, address: &str, _timeout: Duration) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.addresses.lock().unwrap().push(address.to_string());
        if self.ready.load(Ordering::SeqCst) {
            ProbeOutcome::Ready
        } else {
            ProbeOutcome::not_ready("loading model")
        }
    }
}

pub struct FakeCatalog {
    models: Mutex<Vec<ModelDescriptor>>,
    unreadable: AtomicBool,
    location: PathBuf,
}

impl FakeCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self {
            models: Mutex::new(models),
            unreadable: AtomicBool::new(false),
            location: PathBuf::from("/models"),
        }
    }

    pub fn set_models(&self, models: Vec<ModelDescriptor>) {
        *self.models.lock().unwrap() = models;
    }

    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelCatalogPort for FakeCatalog {
    async fn scan(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Unreadable {
                path: self.location.clone(),
                reason: "permission denied".to_string(),
            });
        }
        Ok(self.models.lock().unwrap().clone())
    }

    fn location(&self) -> &Path {
        &self.location
    }
}
