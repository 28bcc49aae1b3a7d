use std::{
	collections::HashMap,
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use robin_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &str, key: &str, replacement: Value) -> String {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");
	let table = root
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the requested section.");

	table.insert(key.to_string(), replacement);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("robin_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> robin_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = robin_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.")
}

#[test]
fn sample_config_loads_and_normalizes_keyword_lists() {
	let cfg = base_config();

	assert_eq!(cfg.pipeline.max_results, 20);
	assert_eq!(cfg.pipeline.max_chunk_size, 50_000);
	assert_eq!(cfg.filtering.blocklist, vec!["carding".to_string(), "cvv".to_string()]);
	assert!(cfg.filtering.allowlist.is_empty());
}

#[test]
fn missing_sections_use_defaults() {
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	root.remove("pipeline");
	root.remove("filtering");

	let cfg = load_payload(toml::to_string(&value).expect("Failed to render config."))
		.expect("Config without optional sections must load.");

	assert_eq!(cfg.pipeline.max_results, 20);
	assert_eq!(cfg.pipeline.chunk_workers, 4);
	assert!(cfg.filtering.nsfw);
	assert!(cfg.filtering.irrelevant);
}

#[test]
fn zero_chunk_size_is_rejected() {
	let err = load_payload(sample_with("pipeline", "max_chunk_size", Value::Integer(0)))
		.expect_err("Expected max_chunk_size validation error.");
	let message = err.to_string();

	assert!(
		message.contains("pipeline.max_chunk_size must be greater than zero."),
		"Unexpected error message: {message}"
	);
}

#[test]
fn zero_chunk_workers_is_rejected() {
	let err = load_payload(sample_with("pipeline", "chunk_workers", Value::Integer(0)))
		.expect_err("Expected chunk_workers validation error.");

	assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn zero_max_results_is_accepted() {
	let cfg = load_payload(sample_with("pipeline", "max_results", Value::Integer(0)))
		.expect("Zero max_results disables filtering and must load.");

	assert_eq!(cfg.pipeline.max_results, 0);
}

#[test]
fn empty_model_is_rejected() {
	let err = load_payload(sample_with("provider", "model", Value::String("  ".to_string())))
		.expect_err("Expected provider.model validation error.");

	assert!(err.to_string().contains("provider.model must be non-empty."));
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut headers = toml::map::Map::new();

	headers.insert("X-Trace".to_string(), Value::Integer(1));

	let err = load_payload(sample_with("provider", "default_headers", Value::Table(headers)))
		.expect_err("Expected default header validation error.");

	assert!(err.to_string().contains("provider.default_headers values must be strings."));
}

#[test]
fn unreadable_path_reports_read_error() {
	let err = robin_config::load(&PathBuf::from("/nonexistent/robin.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}

#[test]
fn env_overrides_replace_filtering_settings() {
	let mut cfg = base_config();
	let env = HashMap::from([
		("FILTER_NSFW", "false"),
		("FILTER_IRRELEVANT", "True"),
		("CONTENT_ALLOWLIST", "Leak, dump"),
		("CONTENT_BLOCKLIST", ""),
		("MAX_RESULTS", "0"),
	]);

	robin_config::apply_overrides(&mut cfg, |key| env.get(key).map(|value| value.to_string()))
		.expect("Overrides must apply.");

	assert!(!cfg.filtering.nsfw);
	assert!(cfg.filtering.irrelevant);
	assert_eq!(cfg.filtering.allowlist, vec!["leak".to_string(), "dump".to_string()]);
	assert!(cfg.filtering.blocklist.is_empty());
	assert_eq!(cfg.pipeline.max_results, 0);
}

#[test]
fn invalid_max_results_override_is_rejected() {
	let mut cfg = base_config();
	let err = robin_config::apply_overrides(&mut cfg, |key| {
		(key == "MAX_RESULTS").then(|| "-3".to_string())
	})
	.expect_err("Expected MAX_RESULTS validation error.");

	assert!(err.to_string().contains("MAX_RESULTS must be a non-negative integer."));
	assert_eq!(cfg.pipeline.max_results, 20);
}

#[test]
fn absent_env_keeps_file_values() {
	let mut cfg = base_config();

	robin_config::apply_overrides(&mut cfg, |_| None).expect("No overrides must apply cleanly.");

	assert_eq!(cfg.filtering.blocklist, vec!["carding".to_string(), "cvv".to_string()]);
	assert!(cfg.filtering.nsfw);
}
