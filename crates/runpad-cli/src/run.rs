//! Run command implementation for Runpad CLI.
//!
//! Sends one source file to the execution service and prints the result.

use std::path::Path;
use std::sync::Arc;

use runpad_core::{ExecutionController, Language, RunOutcome, SessionPatch};
use runpad_server::{BackendConfig, HttpBackend};
use tokio::io::AsyncReadExt;

use crate::colors;

/// Run a source file headlessly.
pub async fn execute(
    file: &str,
    language: Option<Language>,
    input: Option<String>,
    backend: BackendConfig,
) -> anyhow::Result<()> {
    let path = Path::new(file);
    if !path.exists() {
        anyhow::bail!("File not found: {}", file);
    }

    let language = match language {
        Some(language) => language,
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
            .ok_or_else(|| {
                anyhow::anyhow!("Cannot infer language of {}; pass --language", file)
            })?,
    };
    let code = tokio::fs::read_to_string(path).await?;

    let controller = ExecutionController::new(Arc::new(HttpBackend::new(&backend)?));
    // Language first: switching languages replaces the code with a template
    controller.update_active(SessionPatch::language(language)).await;
    let id = controller.update_active(SessionPatch::code(code)).await;
    let has_input = input.is_some();
    if let Some(input) = input {
        controller.update_active(SessionPatch::input(input)).await;
    }

    println!(
        "\n{}Runpad{} - {} ({})",
        colors::BOLD,
        colors::RESET,
        path.display(),
        language.label()
    );
    println!("{}", "─".repeat(50));

    let handle = match controller.run().await? {
        RunOutcome::Dispatched(handle) => handle,
        RunOutcome::AwaitingInput { prompt_text } => {
            if !has_input {
                if !prompt_text.is_empty() {
                    eprint!("{}", prompt_text);
                }
                let mut buffer = String::new();
                tokio::io::stdin().read_to_string(&mut buffer).await?;
                controller.update_active(SessionPatch::input(buffer)).await;
            }
            controller.submit_input().await?
        }
    };
    handle.wait().await;

    let Some(view) = controller.terminal_view(id).await else {
        anyhow::bail!("Session disappeared before completion");
    };

    if let Some(transcript) = &view.transcript {
        println!("{}{}{}", colors::DIM, transcript, colors::RESET);
    }
    if !view.output.is_empty() {
        print!("{}", view.output);
        if !view.output.ends_with('\n') {
            println!();
        }
    }
    if !view.error.is_empty() {
        eprintln!("{}{}{}", colors::RED, view.error.trim_end(), colors::RESET);
    }

    println!("{}", "─".repeat(50));
    match view.execution_time_label() {
        Some(label) => println!("{}{}{}", colors::GREEN, label, colors::RESET),
        // No timing means the request never completed; its error is printed above
        None => anyhow::bail!("Request did not complete"),
    }

    Ok(())
}
