use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use symm_kernel::render::{vector_to_string, write_matrix_tsv, write_vector_tsv};
use symm_kernel::{analyze, read_cases, report_to_json, write_json, AnalysisConfig};

#[derive(Args, Debug)]
pub struct KernelArgs {
    /// JSON array of benchmark cases.
    #[arg(long)]
    pub cases: PathBuf,
    /// Optional YAML analysis configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Smoothing constant added to every off-diagonal cell.
    #[arg(long)]
    pub epsilon: Option<f64>,
    /// Convergence tolerance for power iteration.
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Power iteration cap.
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Also report the first row of the kernel raised to this power.
    #[arg(long)]
    pub power: Option<u32>,
    /// Minimum detector score for a case to count.
    #[arg(long)]
    pub min_score: Option<f64>,
    /// Write the kernel as TSV to this path.
    #[arg(long)]
    pub matrix_out: Option<PathBuf>,
    /// Write the forward rate vector as TSV to this path.
    #[arg(long)]
    pub vector_out: Option<PathBuf>,
    /// Write the dominant eigenvector as TSV to this path.
    #[arg(long)]
    pub eigenvector_out: Option<PathBuf>,
    /// Write the full analysis report as JSON to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn load_config(args: &KernelArgs) -> Result<AnalysisConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if args.power.is_some() {
        config.power = args.power;
    }
    if let Some(min_score) = args.min_score {
        config.significance.min_score = min_score;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: &KernelArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args)?;
    let cases = read_cases(&args.cases)?;
    let policy = config.significance.policy();
    let report = analyze(&cases, &policy, &config)?;

    print!("{}", report.kernel);
    print!("{}", report.rates);
    println!("π={}", vector_to_string(&report.power_iteration.distribution));
    if let Some(row) = &report.fixed_power {
        println!("K^{}[1]={}", row.power, vector_to_string(&row.distribution));
    }
    println!("{}", report.eigenpair);
    println!(
        "eigen π={} (max |Δ|={:e}, {})",
        vector_to_string(&report.comparison.eigen),
        report.comparison.max_abs_diff,
        if report.comparison.agrees {
            "agrees"
        } else {
            "DISAGREES"
        }
    );

    if let Some(path) = &args.matrix_out {
        write_matrix_tsv(path, report.kernel.matrix(), config.matrix_fraction_digits)?;
    }
    if let Some(path) = &args.vector_out {
        write_vector_tsv(
            path,
            report.rates.forward.as_slice(),
            config.vector_fraction_digits,
        )?;
    }
    if let Some(path) = &args.eigenvector_out {
        write_vector_tsv(
            path,
            &report.eigenpair.eigenvector,
            config.vector_fraction_digits,
        )?;
    }
    if let Some(path) = &args.report {
        write_json(path, &report_to_json(&report)?)?;
    }
    Ok(())
}
