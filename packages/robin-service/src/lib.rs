pub mod pipeline;
pub mod refine;
pub mod relevance;
pub mod report;
pub mod summarize;

mod error;

pub use error::{Error, Result};
pub use pipeline::{
	ContentSource, ExcludedContent, ExcludedService, PipelineRun, SearchOutcome, SearchSource,
};
pub use report::{IntelligenceReport, SummaryMode};

use std::{future::Future, pin::Pin, sync::Arc};

use robin_config::{Config, LlmProviderConfig};
use robin_providers::completion;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The only outward call the engine makes: system instructions plus user content in, free text
/// out. Rate limiting must surface as [`robin_providers::Error::RateLimited`].
pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_instructions: &'a str,
		user_content: &'a str,
	) -> BoxFuture<'a, robin_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub completion: Arc<dyn CompletionProvider>,
}

pub struct RobinService {
	pub cfg: Config,
	pub providers: Providers,
}

struct DefaultProviders;

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_instructions: &'a str,
		user_content: &'a str,
	) -> BoxFuture<'a, robin_providers::Result<String>> {
		Box::pin(completion::complete(cfg, system_instructions, user_content))
	}
}

impl Providers {
	pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
		Self { completion }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { completion: Arc::new(DefaultProviders) }
	}
}

impl RobinService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	pub(crate) async fn complete(
		&self,
		stage: &'static str,
		system_instructions: &str,
		user_content: &str,
	) -> Result<String> {
		self.providers
			.completion
			.complete(&self.cfg.provider, system_instructions, user_content)
			.await
			.map_err(|err| Error::from_provider(stage, err))
	}
}
