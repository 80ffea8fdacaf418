//! Models command handler.

use anyhow::Result;
use llamadeck_core::ModelDescriptor;

use crate::bootstrap::CliContext;
use crate::presentation::{format_size, print_separator, truncate_string};

/// List the models the controller can start.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let models = ctx.controller.list_models().await?;

    if models.is_empty() {
        println!("No models found in {}", ctx.models_dir.display());
        println!("Download one with 'llama-server -hf <repo>' or pass --models-dir.");
        return Ok(());
    }

    println!(
        "Found {} model(s) in {}:\n",
        models.len(),
        ctx.models_dir.display()
    );
    print!("{}", render_table(&models));
    Ok(())
}

fn render_table(models: &[ModelDescriptor]) -> String {
    use std::fmt::Write;

    let mut out = format!("{:<50} {:>10}\n", "Name", "Size");
    out.push_str(&"-".repeat(61));
    out.push('\n');
    for model in models {
        let _ = writeln!(
            out,
            "{:<50} {:>10}",
            truncate_string(&model.name, 50),
            format_size(model.size_bytes)
        );
    }
    out
}

/// Print a short hint listing available models, used when a start fails.
pub fn print_available(models: &[ModelDescriptor]) {
    if models.is_empty() {
        return;
    }
    println!("\nAvailable models:");
    print_separator(40);
    for model in models {
        println!("  {}", model.name);
    }
}
