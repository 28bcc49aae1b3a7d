mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Filtering, LlmProviderConfig, Pipeline, Service};

use std::{env, fs, path::Path};

pub const ENV_FILTER_NSFW: &str = "FILTER_NSFW";
pub const ENV_FILTER_IRRELEVANT: &str = "FILTER_IRRELEVANT";
pub const ENV_CONTENT_ALLOWLIST: &str = "CONTENT_ALLOWLIST";
pub const ENV_CONTENT_BLOCKLIST: &str = "CONTENT_BLOCKLIST";
pub const ENV_MAX_RESULTS: &str = "MAX_RESULTS";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Loads the file, then lets the process environment override the filtering settings.
pub fn load_with_env(path: &Path) -> Result<Config> {
	let mut cfg = load(path)?;

	apply_overrides(&mut cfg, |key| env::var(key).ok())?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn apply_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(raw) = lookup(ENV_FILTER_NSFW) {
		cfg.filtering.nsfw = parse_flag(&raw);
	}
	if let Some(raw) = lookup(ENV_FILTER_IRRELEVANT) {
		cfg.filtering.irrelevant = parse_flag(&raw);
	}
	if let Some(raw) = lookup(ENV_CONTENT_ALLOWLIST) {
		cfg.filtering.allowlist = parse_list(&raw);
	}
	if let Some(raw) = lookup(ENV_CONTENT_BLOCKLIST) {
		cfg.filtering.blocklist = parse_list(&raw);
	}
	if let Some(raw) = lookup(ENV_MAX_RESULTS) {
		cfg.pipeline.max_results = raw.trim().parse().map_err(|_| Error::Validation {
			message: format!("{ENV_MAX_RESULTS} must be a non-negative integer."),
		})?;
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("provider.provider_id", &cfg.provider.provider_id),
		("provider.api_base", &cfg.provider.api_base),
		("provider.model", &cfg.provider.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "provider.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.provider.temperature.is_finite() || cfg.provider.temperature < 0.0 {
		return Err(Error::Validation {
			message: "provider.temperature must be a finite number, zero or greater.".to_string(),
		});
	}
	if cfg.provider.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "provider.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.pipeline.max_chunk_size == 0 {
		return Err(Error::Validation {
			message: "pipeline.max_chunk_size must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.chunk_workers == 0 {
		return Err(Error::Validation {
			message: "pipeline.chunk_workers must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

/// Splits a comma-separated keyword list into trimmed, lowercase, non-empty terms.
pub fn parse_list(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(|item| item.trim().to_lowercase())
		.filter(|item| !item.is_empty())
		.collect()
}

fn parse_flag(raw: &str) -> bool {
	raw.trim().eq_ignore_ascii_case("true")
}

fn normalize(cfg: &mut Config) {
	cfg.filtering.allowlist = normalize_terms(&cfg.filtering.allowlist);
	cfg.filtering.blocklist = normalize_terms(&cfg.filtering.blocklist);
	cfg.provider.api_key = cfg.provider.api_key.trim().to_string();
}

fn normalize_terms(terms: &[String]) -> Vec<String> {
	terms
		.iter()
		.map(|term| term.trim().to_lowercase())
		.filter(|term| !term.is_empty())
		.collect()
}
