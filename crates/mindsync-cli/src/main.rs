use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("msync error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    // Needs no configuration; answer before touching the environment.
    if matches!(cli.command, cli::Commands::Tables) {
        commands::tables::handle();
        return Ok(());
    }

    let config = mindsync_config::MindsyncConfig::load_with_dotenv()
        .context("failed to load configuration")?;
    config
        .require_endpoints()
        .context("both source and target endpoints must be configured")?;

    match cli.command {
        cli::Commands::Relay => commands::relay::handle(&config).await,
        cli::Commands::Migrate => commands::migrate::handle(&config).await,
        cli::Commands::Verify(args) => commands::verify::handle(&config, &args).await,
        cli::Commands::Tables => unreachable!("handled above"),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MSYNC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Diagnostics go to stderr; stdout is reserved for command output
    // (the verifier's `verified` line is machine-checked).
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
