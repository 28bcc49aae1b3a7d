use serde::Serialize;

use robin_domain::Artifact;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryMode {
	SinglePass,
	MapReduce { chunks: usize },
}

#[derive(Clone, Debug)]
pub struct IntelligenceReport {
	pub query: String,
	pub mode: SummaryMode,
	/// Report text written by the model.
	pub body: String,
	/// Links of every source in the analysed corpus, followed by any further links the chunk
	/// analyses named.
	pub source_links: Vec<String>,
	/// Artifacts recovered from chunk analyses, deduplicated. Empty for single-pass reports.
	pub artifacts: Vec<Artifact>,
	/// Key observations of every chunk analysis in chunk order. Empty for single-pass reports.
	pub observations: Vec<String>,
	pub filtering_note: String,
	/// Disclaimer plus exclusion records, or `None` when nothing was excluded.
	pub excluded_section: Option<String>,
}
impl IntelligenceReport {
	/// The persisted document: model text followed by the filtering disclosure and the exclusion
	/// list.
	pub fn render(&self) -> String {
		let excluded = self.excluded_section.as_deref().unwrap_or("None");

		format!(
			"{}\n\n---\n\n## Filtering Applied\n\n{}\n\n## Excluded Content\n\n{}\n",
			self.body.trim_end(),
			self.filtering_note,
			excluded
		)
	}
}
