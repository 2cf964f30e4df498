use clap::Parser;
use tenet_auth::AuthError;
use tenet_config::TenetConfig;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tnt error: {}", describe(&error));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = TenetConfig::load_with_dotenv()?;

    if let cli::Commands::Init(args) = &cli.command {
        return commands::init::handle(args, &config, &flags).await;
    }

    let ctx = context::AppContext::init(config, &flags).await?;
    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TENET_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Prefix policy failures with their stable code.
fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<AuthError>().and_then(AuthError::code) {
        Some(code) => format!("[{code}] {error:#}"),
        None => format!("{error:#}"),
    }
}
