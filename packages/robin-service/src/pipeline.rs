use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use robin_domain::{CandidateResult, ExclusionTracker};

use crate::{BoxFuture, IntelligenceReport, Result, RobinService};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedService {
	pub url: String,
	pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedContent {
	pub link: String,
	#[serde(default)]
	pub title: String,
	pub reason: String,
}

/// Aggregated output of the search fan-out. Partial failures arrive as exclusions, not errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
	pub results: Vec<CandidateResult>,
	#[serde(default)]
	pub excluded_services: Vec<ExcludedService>,
	#[serde(default)]
	pub excluded_content: Vec<ExcludedContent>,
}
impl SearchOutcome {
	/// Feeds both exclusion side channels into `tracker`, services first.
	pub fn record_exclusions(&self, tracker: &mut ExclusionTracker) {
		for service in &self.excluded_services {
			tracker.record_service_error(service.url.as_str(), service.reason.as_str());
		}
		for item in &self.excluded_content {
			tracker.record_filtered(&item.link, &item.title, item.reason.as_str());
		}
	}
}

pub trait SearchSource
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<SearchOutcome>>;
}

/// Fetches page text for the selected results, rendered as one corpus with a `--- URL:<link>`
/// marker before each source.
pub trait ContentSource
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, results: &'a [CandidateResult]) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone, Debug)]
pub struct PipelineRun {
	pub run_id: Uuid,
	pub refined_query: String,
	pub candidates: usize,
	pub selected: Vec<CandidateResult>,
	pub exclusions: usize,
	pub report: IntelligenceReport,
}

impl RobinService {
	/// Runs one investigation end to end. Any fatal stage error aborts the run without a report.
	pub async fn run(
		&self,
		query: &str,
		search: &dyn SearchSource,
		content: &dyn ContentSource,
	) -> Result<PipelineRun> {
		let run_id = Uuid::new_v4();
		let span = tracing::info_span!("pipeline", %run_id);

		self.run_inner(run_id, query, search, content).instrument(span).await
	}

	async fn run_inner(
		&self,
		run_id: Uuid,
		query: &str,
		search: &dyn SearchSource,
		content: &dyn ContentSource,
	) -> Result<PipelineRun> {
		let refined_query = self.refine_query(query).await?;
		let outcome = search.search(&refined_query).await?;
		let mut tracker = ExclusionTracker::new();

		outcome.record_exclusions(&mut tracker);

		let selected = self.filter_results(&refined_query, &outcome.results).await?;
		let scraped = content.fetch(&selected).await?;
		let excluded = tracker.render();

		tracing::info!(
			candidates = outcome.results.len(),
			selected = selected.len(),
			exclusions = tracker.len(),
			corpus_chars = robin_chunking::char_len(&scraped) + robin_chunking::char_len(&excluded),
			"Corpus assembled."
		);

		// Reports use the user's wording, not the refined query. Exclusions never join the
		// scraped text.
		let report = self.summarize_sources(query, &scraped, &excluded).await?;

		Ok(PipelineRun {
			run_id,
			refined_query,
			candidates: outcome.results.len(),
			selected,
			exclusions: tracker.len(),
			report,
		})
	}
}
