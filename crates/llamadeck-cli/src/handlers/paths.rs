//! Paths command handler.

use anyhow::Result;
use llamadeck_core::paths::{ModelsDirSource, data_root, resolve_models_dir, state_file_path};
use llamadeck_runtime::resolve_llama_server;

use crate::parser::Cli;

/// Print every path llamadeck resolves, without starting anything.
pub fn execute(cli: &Cli) -> Result<()> {
    let models = resolve_models_dir(cli.models_dir.as_deref())?;
    let source = match models.source {
        ModelsDirSource::Explicit => "--models-dir",
        ModelsDirSource::EnvVar => "LLAMA_CACHE_DIR",
        ModelsDirSource::Default => "default",
    };

    println!("Data directory:   {}", data_root()?.display());
    println!("State file:       {}", state_file_path()?.display());
    println!("Models directory: {} ({source})", models.path.display());

    let explicit = cli.llama_server.as_deref().map(std::path::Path::new);
    match resolve_llama_server(explicit) {
        Ok(path) => println!("llama-server:     {}", path.display()),
        Err(e) => println!("llama-server:     not found\n\n{e}"),
    }
    Ok(())
}
