use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use symm_core::ScoreThreshold;
use symm_kernel::{read_cases, OrderAccuracy};

#[derive(Args, Debug)]
pub struct AccuracyArgs {
    /// JSON array of benchmark cases.
    #[arg(long)]
    pub cases: PathBuf,
    /// Minimum detector score for a case to count.
    #[arg(long, default_value_t = 0.4)]
    pub min_score: f64,
}

pub fn run(args: &AccuracyArgs) -> Result<(), Box<dyn Error>> {
    let cases = read_cases(&args.cases)?;
    let policy = ScoreThreshold {
        min_score: args.min_score,
    };
    let accuracy = OrderAccuracy::measure(&cases, &policy);
    tracing::info!(
        correct = accuracy.correct,
        total = accuracy.total,
        "measured order accuracy"
    );
    println!("{accuracy}");
    Ok(())
}
