//! CLI bootstrap - the composition root.
//!
//! The only place where concrete adapters are instantiated:
//! - `LlamaServerLauncher` (tokio process spawning)
//! - `HttpReadinessProbe` (reqwest)
//! - `DirectoryModelCatalog` over the resolved models directory
//! - `StateFile` under the data directory

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use llamadeck_core::paths::resolve_models_dir;
use llamadeck_core::{ControllerSettings, validate_settings};
use llamadeck_runtime::{
    DirectoryModelCatalog, HttpReadinessProbe, LlamaServerLauncher, ServerController, StateFile,
};
use tracing::{debug, warn};

use crate::commands::Commands;
use crate::parser::Cli;

/// Fully composed context for commands that talk to the server.
pub struct CliContext {
    pub controller: ServerController,
    pub models_dir: PathBuf,
}

/// Build validated controller settings from global flags and the `serve`
/// options, if that is the command being run.
pub fn controller_settings(cli: &Cli) -> Result<ControllerSettings> {
    let mut settings = ControllerSettings {
        llama_server_path: cli.llama_server.as_ref().map(PathBuf::from),
        host: cli.host.clone(),
        port: cli.port,
        persist_state: !cli.no_state_file,
        ..ControllerSettings::default()
    };

    if let Some(Commands::Serve {
        ctx_size,
        jinja,
        extra_args,
        ..
    }) = &cli.command
    {
        settings.context_size = *ctx_size;
        settings.extra_args.clone_from(extra_args);
        if *jinja {
            settings.extra_args.push("--jinja".to_string());
        }
    }

    let models_dir = resolve_models_dir(cli.models_dir.as_deref())?;
    settings.models_dir = Some(models_dir.path);

    validate_settings(&settings)?;
    Ok(settings)
}

/// Wire the runtime adapters into a controller.
///
/// Must run inside the Tokio runtime.
pub fn bootstrap(settings: ControllerSettings) -> Result<CliContext> {
    let models_dir = match &settings.models_dir {
        Some(path) => path.clone(),
        None => resolve_models_dir(None)?.path,
    };
    debug!(models_dir = %models_dir.display(), "Using models directory");

    let state_file = if settings.persist_state {
        match StateFile::default_location() {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(error = %e, "State file unavailable, running without persistence");
                None
            }
        }
    } else {
        None
    };

    let launcher = Arc::new(LlamaServerLauncher::new(settings.llama_server_path.clone()));
    let probe = Arc::new(HttpReadinessProbe::new());
    let catalog = Arc::new(DirectoryModelCatalog::new(models_dir.clone()));

    let controller = ServerController::new(settings, launcher, probe, catalog, state_file);
    Ok(CliContext {
        controller,
        models_dir,
    })
}
