//! Radar - single-target tracker with simulation, log replay and web viewer

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Constant-velocity radar tracker with simulation and track viewer")]
#[command(version)]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CLI simulation / replay / sweep mode
    Cli {
        /// Pass remaining arguments to radar-cli
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Launch web track viewer
    Gui {
        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Cli { args }) => {
            let cli_args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
            run_cli(&cli_args)
        }
        Some(Commands::Gui { port, host }) => run_gui(port, &host),
        None => run_gui(8080, "0.0.0.0"),
    }
}

fn run_cli(args: &[&str]) -> anyhow::Result<()> {
    let mut full_args = vec!["radar-cli"];
    full_args.extend(args);
    radar_cli::run_cli_main(&full_args)
}

fn run_gui(port: u16, host: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio::runtime::Runtime;

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        let app = radar_gui::create_router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("track viewer listening on http://{}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    })
}
