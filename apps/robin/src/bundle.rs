//! Recorded search-and-scrape run standing in for live search engines and page fetching.

use std::{collections::BTreeMap, fs, path::Path};

use color_eyre::eyre;
use serde::Deserialize;

use robin_chunking::URL_MARKER;
use robin_domain::CandidateResult;
use robin_service::{BoxFuture, ContentSource, Result, SearchOutcome, SearchSource};

#[derive(Debug, Deserialize)]
pub struct SearchBundle {
	#[serde(flatten)]
	pub outcome: SearchOutcome,
	/// Scraped page text keyed by result link.
	#[serde(default)]
	pub pages: BTreeMap<String, String>,
}
impl SearchBundle {
	pub fn load(path: &Path) -> color_eyre::Result<Self> {
		let raw = fs::read_to_string(path)?;
		let bundle: SearchBundle = serde_json::from_str(&raw)?;

		if bundle.outcome.results.iter().any(|result| result.link.trim().is_empty()) {
			return Err(eyre::eyre!("Bundle results must all carry a link."));
		}

		Ok(bundle)
	}

	/// Corpus for `results`: one `--- URL:` section per result with recorded page text, in
	/// result order. Results without page text are skipped.
	pub fn corpus(&self, results: &[CandidateResult]) -> String {
		let mut corpus = String::new();

		for result in results {
			let Some(text) = self.pages.get(&result.link) else {
				tracing::warn!(link = %result.link, "No page text recorded; skipping source.");

				continue;
			};

			corpus.push_str(URL_MARKER);
			corpus.push_str(&result.link);
			corpus.push('\n');
			corpus.push_str(text.trim());
			corpus.push_str("\n\n");
		}

		corpus
	}
}

impl SearchSource for SearchBundle {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<SearchOutcome>> {
		tracing::info!(
			query,
			results = self.outcome.results.len(),
			excluded_services = self.outcome.excluded_services.len(),
			"Replaying recorded search."
		);

		Box::pin(async move { Ok(self.outcome.clone()) })
	}
}

impl ContentSource for SearchBundle {
	fn fetch<'a>(&'a self, results: &'a [CandidateResult]) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(self.corpus(results)) })
	}
}
