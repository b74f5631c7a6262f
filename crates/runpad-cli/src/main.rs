//! Runpad CLI - Run code snippets against a remote execution service.

mod colors;
mod run;
mod serve;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use runpad_core::Language;
use runpad_server::backend::DEFAULT_BACKEND_URL;
use runpad_server::{BackendConfig, ServerConfig};

#[derive(Parser)]
#[command(name = "runpad")]
#[command(about = "Run code snippets against a remote execution service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Execution service options shared by all commands.
#[derive(Args)]
struct BackendArgs {
    /// Execution service endpoint
    #[arg(long, default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl From<BackendArgs> for BackendConfig {
    fn from(args: BackendArgs) -> Self {
        Self {
            url: args.backend_url,
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive server
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Directory for saved and exported code
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Run a source file once and print its output
    Run {
        /// Path to the source file (.py or .js)
        file: String,

        /// Language (inferred from the file extension by default)
        #[arg(long)]
        language: Option<Language>,

        /// Standard input for the program (read from stdin when the code asks for input)
        #[arg(long)]
        input: Option<String>,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            backend,
        } => {
            let config = ServerConfig {
                host,
                port,
                backend: backend.into(),
                data_dir,
            };
            serve::execute(config).await?;
        }

        Commands::Run {
            file,
            language,
            input,
            backend,
        } => {
            run::execute(&file, language, input, backend.into()).await?;
        }
    }

    Ok(())
}
