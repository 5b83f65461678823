use std::path::PathBuf;
use std::process::ExitCode;

use chronoseries::data::loader;
use chronoseries::{PipelineConfig, SeriesContainer};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: chronoseries <input.csv|input.xlsx> [config.json]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(input) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let config = args.next();

    match run(input, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: PathBuf, config: Option<PathBuf>) -> chronoseries::Result<()> {
    let config = match config {
        Some(path) => PipelineConfig::from_path(&path)?,
        None => PipelineConfig::default(),
    };

    let mut series = loader::load_series(&input)?;
    series.refresh_stats();
    tracing::info!(input = %input.display(), records = series.len(), "loaded series");
    eprint!("{}", series.stats.report(&series.name));

    let output = config.run(&series)?;
    eprint!("{}", output.kept.stats.report(&output.kept.name));

    let mut container = SeriesContainer::new(series.name.clone());
    container.comment = format!("cleaned with {:?}", config.outliers);
    container.insert(output.kept);
    container.insert(output.rejected);
    if let Some(regular) = output.regular {
        container.insert(regular);
    }
    println!("{}", container.to_json()?);
    Ok(())
}
