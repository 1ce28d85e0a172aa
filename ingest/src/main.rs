use anyhow::bail;
use clap::Parser;
use report::write_report;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod format;
mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Photovoltaic parameters from solar-simulator JV exports")]
struct Args {
    /// LabVIEW or Python JV exports to analyze
    files: Vec<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Samples on each side of the fitted point for Rs/Rsh
    #[arg(long)]
    fit_window: Option<usize>,
    /// Multiplier that widens the fit window around short circuit
    #[arg(long)]
    shunt_factor: Option<usize>,
    /// Active area in cm², replacing the value in each export header
    #[arg(long)]
    cell_area: Option<f64>,
    /// Write the batch report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also analyze a curve from the configured single-diode model
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    }
    .with_overrides(args.fit_window, args.shunt_factor, args.cell_area)?;

    let runner = Runner::new(workflow_config.clone())?;
    let mut batch = runner.run_batch(&args.files);

    if args.synthetic {
        let measurement = runner.execute_synthetic(&workflow_config.synthetic)?;
        batch.measurements.push(measurement);
        batch.metrics = runner.metrics();
    }

    for measurement in &batch.measurements {
        println!("{}", measurement.summary_line());
    }
    for skipped in &batch.skipped {
        println!("skipped {}", skipped);
    }
    for failure in &batch.failures {
        eprintln!("failed {}: {}", failure.path, failure.error);
    }

    if let Some(path) = &args.output {
        write_report(path, &batch)?;
        println!("report written to {}", path.display());
    }

    if !batch.failures.is_empty() && batch.measurements.is_empty() {
        bail!("none of the {} inputs could be analyzed", args.files.len());
    }

    Ok(())
}
