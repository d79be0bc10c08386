//! fscheck CLI — file system integrity checker.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fscheck",
    version,
    about = "File system integrity checker — content + metadata fingerprints, HMAC-sealed database"
)]
struct Cli {
    #[command(flatten)]
    global: fscheck::cli::GlobalArgs,

    #[command(subcommand)]
    command: fscheck::cli::Commands,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global.log_level);
    if let Err(e) = fscheck::cli::dispatch(cli.command, &cli.global) {
        e.log_if_security_critical();
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
