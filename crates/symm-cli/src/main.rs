use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    accuracy::{self, AccuracyArgs},
    kernel::{self, KernelArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "symm-order", about = "Symmetry-order error kernel CLI")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate mistake rates, build the transition kernel and solve its steady state.
    Kernel(KernelArgs),
    /// Report the exact order accuracy of a benchmark.
    Accuracy(AccuracyArgs),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("symm_kernel={level},symm_order={level}")));
    fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.command {
        Command::Kernel(args) => kernel::run(&args),
        Command::Accuracy(args) => accuracy::run(&args),
    }
}
