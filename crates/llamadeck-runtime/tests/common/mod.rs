//! Common test utilities.
//!
//! In-memory implementations of the controller ports and a harness wiring
//! them into a [`ServerController`].

#![allow(dead_code)]

pub mod fakes;

use std::sync::Arc;
use std::time::Duration;

use llamadeck_core::{ControllerSettings, ModelDescriptor, ServerRecord};
use llamadeck_runtime::{ServerController, StateFile};

use fakes::{FakeCatalog, FakeLauncher, FakeProbe};

/// Upper bound for waiting on a state under the paused test clock.
pub const WAIT_LIMIT: Duration = Duration::from_secs(600);

pub struct Harness {
    pub controller: ServerController,
    pub launcher: Arc<FakeLauncher>,
    pub probe: Arc<FakeProbe>,
    pub catalog: Arc<FakeCatalog>,
}

pub fn models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new("llama-3.2-3b.gguf", 2_019_000_000, "/models/llama-3.2-3b.gguf"),
        ModelDescriptor::new("qwen2.5-7b.gguf", 4_680_000_000, "/models/qwen2.5-7b.gguf"),
    ]
}

pub fn harness() -> Harness {
    harness_with(ControllerSettings::default(), None)
}

pub fn harness_with(settings: ControllerSettings, state_file: Option<StateFile>) -> Harness {
    let launcher = Arc::new(FakeLauncher::new());
    let probe = Arc::new(FakeProbe::new());
    let catalog = Arc::new(FakeCatalog::new(models()));
    let controller = ServerController::new(
        settings,
        launcher.clone(),
        probe.clone(),
        catalog.clone(),
        state_file,
    );
    Harness {
        controller,
        launcher,
        probe,
        catalog,
    }
}

/// Wait until the published record satisfies `pred`.
pub async fn wait_for(
    controller: &ServerController,
    pred: impl FnMut(&ServerRecord) -> bool,
) -> ServerRecord {
    let mut rx = controller.subscribe();
    tokio::time::timeout(WAIT_LIMIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for server state")
        .expect("controller dropped")
        .clone()
}

/// Start the first catalog model and wait for it to be running.
pub async fn start_running(harness: &Harness) -> ServerRecord {
    harness.controller.list_models().await.unwrap();
    harness.probe.set_ready(true);
    harness.controller.start("qwen2.5-7b.gguf").await.unwrap();
    wait_for(&harness.controller, ServerRecord::is_running).await
}
