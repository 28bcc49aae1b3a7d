pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider rate limited {stage}: {message}")]
	RateLimited { stage: &'static str, message: String },
	#[error("Provider error in {stage}: {message}")]
	Provider { stage: &'static str, message: String },
	#[error("Chunk {sequence_number}/{total_chunks} analysis failed: {message}")]
	ChunkFailed { sequence_number: usize, total_chunks: usize, message: String },
	#[error("Search failed: {message}")]
	Search { message: String },
	#[error("Content fetch failed: {message}")]
	Content { message: String },
	#[error("Task failed: {message}")]
	Task { message: String },
}
impl Error {
	pub(crate) fn from_provider(stage: &'static str, err: robin_providers::Error) -> Self {
		if err.is_rate_limited() {
			return Self::RateLimited { stage, message: err.to_string() };
		}

		Self::Provider { stage, message: err.to_string() }
	}
}
