//! Serve command implementation for Runpad CLI.
//!
//! Starts the WebSocket server for the browser front end.

use runpad_server::ServerConfig;

use crate::colors;

/// Start the interactive server.
pub async fn execute(config: ServerConfig) -> anyhow::Result<()> {
    println!(
        "\n{}Runpad Server{} - Snippet Runner",
        colors::BOLD,
        colors::RESET
    );
    println!("{}", "─".repeat(50));

    println!(
        "{}  ◆ Server:{} http://{}:{}",
        colors::CYAN,
        colors::RESET,
        config.host,
        config.port
    );
    println!(
        "{}  ◆ WebSocket:{} ws://{}:{}/ws",
        colors::CYAN,
        colors::RESET,
        config.host,
        config.port
    );
    println!(
        "{}  ◆ Execution service:{} {}",
        colors::CYAN,
        colors::RESET,
        config.backend.url
    );
    println!("{}", "─".repeat(50));
    println!("{}Press Ctrl+C to stop{}", colors::GREEN, colors::RESET);
    println!();

    runpad_server::serve(config).await?;

    Ok(())
}
