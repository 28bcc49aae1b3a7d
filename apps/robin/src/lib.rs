pub mod bundle;

use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use robin_config::Config;
use robin_service::RobinService;

use crate::bundle::SearchBundle;

#[derive(Debug, Parser)]
#[command(
	version = robin_cli::VERSION,
	rename_all = "kebab",
	styles = robin_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Investigation query.
	#[arg(long, short = 'q', value_name = "TEXT")]
	pub query: String,
	/// Recorded search results and page text to analyse.
	#[arg(long, short = 'b', value_name = "FILE")]
	pub bundle: PathBuf,
	/// Report file name without extension. Defaults to a timestamped name.
	#[arg(long, short = 'o', value_name = "NAME")]
	pub output: Option<String>,
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub output_dir: PathBuf,
	/// Overrides `provider.model`.
	#[arg(long, short = 'm', value_name = "MODEL")]
	pub model: Option<String>,
	/// Overrides `pipeline.chunk_workers`.
	#[arg(long, short = 't', value_name = "N")]
	pub threads: Option<usize>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut config = robin_config::load_with_env(&args.config)?;

	apply_args(&mut config, &args)?;
	init_tracing(&config)?;

	let query = args.query.trim();

	if query.is_empty() {
		return Err(eyre::eyre!("--query must not be empty."));
	}

	let bundle = SearchBundle::load(&args.bundle)?;
	let service = RobinService::new(config);
	let started = robin_cli::now();
	let run = service.run(query, &bundle, &bundle).await?;
	let path = args
		.output_dir
		.join(robin_cli::report_file_name(args.output.as_deref(), started));

	write_report(&path, &run.report.render())?;

	tracing::info!(
		run_id = %run.run_id,
		refined_query = %run.refined_query,
		selected = run.selected.len(),
		artifacts = run.report.artifacts.len(),
		observations = run.report.observations.len(),
		exclusions = run.exclusions,
		path = %path.display(),
		"Report written."
	);

	println!("{}", path.display());

	Ok(())
}

fn apply_args(config: &mut Config, args: &Args) -> color_eyre::Result<()> {
	if let Some(model) = &args.model {
		config.provider.model = model.clone();
	}
	if let Some(threads) = args.threads {
		if threads == 0 {
			return Err(eyre::eyre!("--threads must be greater than zero."));
		}

		config.pipeline.chunk_workers = threads;
	}

	robin_config::validate(config)?;

	Ok(())
}

fn write_report(path: &Path, rendered: &str) -> color_eyre::Result<()> {
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}

	fs::write(path, rendered)?;

	Ok(())
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	Ok(())
}
