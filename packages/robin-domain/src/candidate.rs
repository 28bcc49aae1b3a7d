use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Everything after this marker is dropped from links shown to the model.
pub const LINK_MARKER: &str = ".onion";

const TRUNCATED_TITLE_CHARS: usize = 30;
const TRUNCATED_LINK_CHARS: usize = 0;
const ELLIPSIS: &str = "...";

static TITLE_NOISE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^0-9A-Za-z.\-]").expect("Title pattern must compile."));

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
	pub link: String,
	#[serde(default)]
	pub title: String,
}
impl CandidateResult {
	pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
		Self { link: link.into(), title: title.into() }
	}
}

/// Renders results as `"{index}. {link} - {title}"` lines, index being the 1-based list position.
///
/// `truncate` shrinks every line for a retry after the provider rate-limited the full listing.
pub fn format_results(results: &[CandidateResult], truncate: bool) -> String {
	let mut lines = Vec::with_capacity(results.len());

	for (idx, result) in results.iter().enumerate() {
		let mut link = display_link(&result.link).to_string();
		let mut title = normalize_title(&result.title);

		if link.is_empty() && title.is_empty() {
			continue;
		}
		if truncate {
			title = cap(&title, TRUNCATED_TITLE_CHARS);
			link = cap(&link, TRUNCATED_LINK_CHARS);
		}

		lines.push(format!("{}. {link} - {title}", idx + 1));
	}

	lines.join("\n")
}

pub fn normalize_title(title: &str) -> String {
	TITLE_NOISE.replace_all(title, " ").into_owned()
}

pub fn display_link(link: &str) -> &str {
	match link.find(LINK_MARKER) {
		Some(at) => &link[..at + LINK_MARKER.len()],
		None => link,
	}
}

fn cap(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let mut capped: String = text.chars().take(max_chars).collect();

	capped.push_str(ELLIPSIS);

	capped
}
