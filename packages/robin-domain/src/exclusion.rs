use serde::{Deserialize, Serialize};

pub const EXCLUSION_DISCLAIMER: &str = "⚠️ DISCLAIMER: The following items were excluded from analysis. Exercise extreme caution if investigating these sources independently, as they may contain harmful, illegal, or disturbing content.";

const SERVICE_HEADER: &str = "--- EXCLUDED SEARCH ENGINES ---";
const SERVICE_INTRO: &str = "The following search engines were excluded from results due to errors:";
const CONTENT_HEADER: &str = "--- EXCLUDED CONTENT (FILTERED) ---";
const CONTENT_INTRO: &str = "The following content was filtered based on your blocklist settings:";
const FILTERED_TITLE_CHARS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionCategory {
	SearchEngineError,
	ContentFiltered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRecord {
	pub category: ExclusionCategory,
	/// URL or service identifier the record is about.
	pub subject: String,
	pub reason: String,
}
impl ExclusionRecord {
	pub fn line(&self) -> String {
		format!("- {}: {}", self.subject, self.reason)
	}
}

/// Append-only log of everything dropped during one run.
#[derive(Clone, Debug, Default)]
pub struct ExclusionTracker {
	records: Vec<ExclusionRecord>,
}
impl ExclusionTracker {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, record: ExclusionRecord) {
		tracing::debug!(
			category = ?record.category,
			subject = %record.subject,
			reason = %record.reason,
			"Exclusion recorded."
		);

		self.records.push(record);
	}

	pub fn record_service_error(&mut self, url: impl Into<String>, reason: impl Into<String>) {
		self.record(ExclusionRecord {
			category: ExclusionCategory::SearchEngineError,
			subject: url.into(),
			reason: reason.into(),
		});
	}

	/// Records a result dropped by keyword filtering. The subject carries the link and the start
	/// of its title.
	pub fn record_filtered(&mut self, link: &str, title: &str, reason: impl Into<String>) {
		let title: String = title.chars().take(FILTERED_TITLE_CHARS).collect();

		self.record(ExclusionRecord {
			category: ExclusionCategory::ContentFiltered,
			subject: format!("{link} ({title}...)"),
			reason: reason.into(),
		});
	}

	pub fn records(&self) -> &[ExclusionRecord] {
		&self.records
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Renders the records grouped by category, in the form appended after the scraped corpus.
	///
	/// Every group starts with a `--- EXCLUDED` header. An empty tracker renders nothing.
	pub fn render(&self) -> String {
		let mut out = String::new();

		for (category, header, intro) in [
			(ExclusionCategory::SearchEngineError, SERVICE_HEADER, SERVICE_INTRO),
			(ExclusionCategory::ContentFiltered, CONTENT_HEADER, CONTENT_INTRO),
		] {
			let mut group =
				self.records.iter().filter(|record| record.category == category).peekable();

			if group.peek().is_none() {
				continue;
			}

			out.push_str("\n\n");
			out.push_str(header);
			out.push('\n');
			out.push_str(intro);
			out.push('\n');

			for record in group {
				out.push_str(&record.line());
				out.push('\n');
			}
		}

		out
	}

	/// The excluded-content section of a report, or `None` when nothing was excluded.
	pub fn render_section(&self) -> Option<String> {
		excluded_section(&self.render())
	}
}

/// Prefixes pre-rendered exclusion text with the disclaimer. Blank text yields `None`.
pub fn excluded_section(rendered: &str) -> Option<String> {
	let trimmed = rendered.trim();

	if trimmed.is_empty() {
		return None;
	}

	Some(format!("{EXCLUSION_DISCLAIMER}\n\n{trimmed}"))
}
