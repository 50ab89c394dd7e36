use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, Level};

use oxidesignal::data::loader;
use oxidesignal::{AnalysisConfig, AnalysisReport, Dataset, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "oxidesignal")]
#[command(version, about = "Spike, stall and oscillation analysis of logged signals", long_about = None)]
struct Cli {
    /// CSV or Excel file; column 0 is the time axis
    file: PathBuf,

    /// Columns to analyze, by label or index (default: every column but time)
    #[arg(short, long)]
    column: Vec<String>,

    /// JSON file overriding detector settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Median-filter each column first, window 1 + 2*N (N from the config when omitted)
    #[arg(long, value_name = "N", num_args = 0..=1)]
    filter: Option<Option<usize>>,

    /// Re-insert detected spikes after filtering
    #[arg(long, requires = "filter")]
    keep_spikes: bool,

    /// Analyze the cumulative integral instead of the raw samples
    #[arg(long)]
    integrate: bool,

    /// Include amplitude, phase and PSD spectra in the report
    #[arg(long)]
    spectrum: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let dataset = loader::load_file(&cli.file)
        .and_then(|loaded| loaded.into_dataset())
        .with_context(|| format!("loading {}", cli.file.display()))?;
    info!(columns = dataset.series.len(), time_step = dataset.time_step, "dataset ready");

    let selected = select_columns(&dataset, &cli.column)?;
    if selected.is_empty() {
        bail!("no signal columns to analyze besides the time column");
    }

    let mut reports = Vec::with_capacity(selected.len());
    for idx in selected {
        let mut series = dataset.series[idx].clone();
        let label = series.display_label(&format!("column {idx}"));
        prepare(&mut series, cli, &config, dataset.time_step).with_context(|| format!("transforming {label}"))?;

        let mut report = AnalysisReport::build(&series, &label, dataset.time_step, &config)
            .with_context(|| format!("analyzing {label}"))?;
        if cli.spectrum {
            report = report
                .with_spectrum(&series)
                .with_context(|| format!("computing spectrum of {label}"))?;
        }
        info!(
            column = %label,
            spikes = report.spikes.len(),
            stalls = report.stalls.len(),
            oscillations = report.oscillations.len(),
            "column analyzed"
        );
        reports.push(report);
    }

    match cli.format {
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.to_text());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn select_columns(dataset: &Dataset, keys: &[String]) -> Result<Vec<usize>> {
    if keys.is_empty() {
        return Ok((1..dataset.series.len()).collect());
    }
    keys.iter()
        .map(|key| match dataset.find(key) {
            Some((idx, _)) => Ok(idx),
            None => bail!("no column named {key:?}"),
        })
        .collect()
}

fn prepare(series: &mut Series, cli: &Cli, config: &AnalysisConfig, time_step: f64) -> Result<()> {
    if let Some(requested) = cli.filter {
        let count_param = requested.unwrap_or(config.filter.count_param);
        if cli.keep_spikes {
            let spikes = series.filter_keeping_spikes(count_param, &config.spikes)?;
            info!(count_param, kept = spikes.len(), "median filter applied, spikes kept");
        } else {
            series.apply_filter(count_param)?;
            info!(count_param, "median filter applied");
        }
    }
    if cli.integrate {
        series.integrate(time_step)?;
    }
    Ok(())
}
