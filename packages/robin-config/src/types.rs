use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub provider: LlmProviderConfig,
	#[serde(default)]
	pub pipeline: Pipeline,
	#[serde(default)]
	pub filtering: Filtering,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Optional for local servers that do not check credentials.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Pipeline {
	/// Upper bound on results kept by relevance filtering. Zero disables filtering.
	pub max_results: u32,
	/// Corpus size, in characters, above which summarization switches to map-reduce.
	pub max_chunk_size: usize,
	/// Concurrent chunk summarization calls.
	pub chunk_workers: usize,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self { max_results: 20, max_chunk_size: 50_000, chunk_workers: 4 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Filtering {
	pub nsfw: bool,
	pub irrelevant: bool,
	pub allowlist: Vec<String>,
	pub blocklist: Vec<String>,
}
impl Default for Filtering {
	fn default() -> Self {
		Self { nsfw: true, irrelevant: true, allowlist: Vec::new(), blocklist: Vec::new() }
	}
}
