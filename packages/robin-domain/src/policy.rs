pub const NO_FILTERING_NOTE: &str = "No content filtering applied";

/// Content-filtering rules active for one run, taken from configuration at call time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteringPolicy {
	pub nsfw: bool,
	pub irrelevant: bool,
	pub allowlist: Vec<String>,
	pub blocklist: Vec<String>,
}
impl FilteringPolicy {
	pub fn is_unfiltered(&self) -> bool {
		!self.nsfw && !self.irrelevant && self.allowlist.is_empty() && self.blocklist.is_empty()
	}

	/// Disclosure note listing the active rules, one `- ` bullet each.
	pub fn note(&self) -> String {
		let mut rules = Vec::new();

		if self.nsfw {
			rules.push("- NSFW content was filtered from analysis".to_string());
		}
		if self.irrelevant {
			rules.push("- Irrelevant/off-topic content was excluded".to_string());
		}
		if !self.blocklist.is_empty() {
			rules.push(format!("- Blocked keywords: {}", self.blocklist.join(", ")));
		}
		if !self.allowlist.is_empty() {
			rules.push(format!("- Allowlisted keywords: {}", self.allowlist.join(", ")));
		}

		if rules.is_empty() {
			return NO_FILTERING_NOTE.to_string();
		}

		rules.join("\n")
	}

	/// Imperative rules for a model analysing raw content, numbered from `first`.
	pub fn instructions(&self, first: usize) -> Vec<String> {
		let mut rules = Vec::new();

		if self.nsfw {
			rules.push("Filter out not safe for work (NSFW) content from the analysis".to_string());
		}
		if self.irrelevant {
			rules.push(
				"Exclude irrelevant or off-topic content that doesn't match the query".to_string(),
			);
		}
		if !self.blocklist.is_empty() {
			rules.push(format!(
				"ALWAYS exclude content containing these keywords: {}",
				self.blocklist.join(", ")
			));
		}
		if !self.allowlist.is_empty() {
			rules.push(format!(
				"ALWAYS include content containing these keywords even if flagged: {}",
				self.allowlist.join(", ")
			));
		}

		rules.push(
			"Identify any content, links, or data that was explicitly excluded from analysis due to safety, relevance, or technical constraints."
				.to_string(),
		);

		rules.into_iter().enumerate().map(|(idx, rule)| format!("{}. {rule}", first + idx)).collect()
	}
}
impl From<&robin_config::Filtering> for FilteringPolicy {
	fn from(cfg: &robin_config::Filtering) -> Self {
		Self {
			nsfw: cfg.nsfw,
			irrelevant: cfg.irrelevant,
			allowlist: cfg.allowlist.clone(),
			blocklist: cfg.blocklist.clone(),
		}
	}
}
