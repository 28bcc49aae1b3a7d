//! Best-effort recovery of structure from a chunk analysis written by the model.
//!
//! The analysis prompt asks for three labelled parts (`Source URLs`, `Artifacts Found`,
//! `Key Observations`). Labels may carry markdown decoration, and items may follow inline or
//! as bullets on later lines.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

pub const SOURCE_URLS_HEADING: &str = "Source URLs";
pub const ARTIFACTS_HEADING: &str = "Artifacts Found";
pub const OBSERVATIONS_HEADING: &str = "Key Observations";

static URL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)\b(?:https?://[^\s,;<>"'\)\]]+|[a-z2-7]{16,56}\.onion\b[^\s,;<>"'\)\]]*)"#)
		.expect("URL pattern must compile.")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
	pub value: String,
	pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSummary {
	pub sequence_number: usize,
	/// Model output the structured fields were parsed from.
	pub text: String,
	pub source_urls: Vec<String>,
	pub artifacts: Vec<Artifact>,
	pub observations: Vec<String>,
}
impl ChunkSummary {
	pub fn parse(sequence_number: usize, text: impl Into<String>) -> Self {
		let text = text.into();
		let mut section = None;
		let mut urls = Vec::new();
		let mut artifacts = Vec::new();
		let mut observations = Vec::new();
		let mut seen_urls = HashSet::new();

		for line in text.lines() {
			let (heading, rest) = match split_heading(line) {
				Some((heading, rest)) => (Some(heading), rest),
				None => (None, line),
			};

			if let Some(heading) = heading {
				section = Some(heading);
			}

			let Some(current) = section else {
				continue;
			};
			let Some(item) = clean_item(rest) else {
				continue;
			};

			match current {
				Section::Sources => {
					for found in URL.find_iter(item) {
						let url = found.as_str().trim_end_matches(['.', ':']).to_string();

						if seen_urls.insert(url.clone()) {
							urls.push(url);
						}
					}
				},
				Section::Artifacts => artifacts.push(split_artifact(item)),
				Section::Observations => observations.push(item.to_string()),
			}
		}

		Self { sequence_number, text, source_urls: urls, artifacts, observations }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
	Sources,
	Artifacts,
	Observations,
}

fn split_heading(line: &str) -> Option<(Section, &str)> {
	let stripped = line.trim_start().trim_start_matches(['-', '*', '#', ' ', '\t']);
	let (label, rest) = stripped.split_once(':')?;
	let label = label.trim_matches(['*', '_', ' ']).to_ascii_lowercase();
	let section = match label.as_str() {
		l if l == SOURCE_URLS_HEADING.to_ascii_lowercase() => Section::Sources,
		l if l == ARTIFACTS_HEADING.to_ascii_lowercase() => Section::Artifacts,
		l if l == OBSERVATIONS_HEADING.to_ascii_lowercase() => Section::Observations,
		_ => return None,
	};

	Some((section, rest.trim_start_matches(['*', '_'])))
}

fn clean_item(raw: &str) -> Option<&str> {
	let mut item = raw.trim();

	for bullet in ["- ", "* ", "• "] {
		if let Some(rest) = item.strip_prefix(bullet) {
			item = rest.trim();
		}
	}

	if let Some((number, rest)) = item.split_once(". ")
		&& !number.is_empty()
		&& number.chars().all(|c| c.is_ascii_digit())
	{
		item = rest.trim();
	}

	let item = item.trim_start_matches('[').trim_end_matches(']').trim();

	let lowered = item.to_ascii_lowercase();

	if item.is_empty() || matches!(lowered.as_str(), "none" | "n/a" | "none found") {
		return None;
	}

	Some(item)
}

fn split_artifact(item: &str) -> Artifact {
	for separator in [" - ", " — ", ": "] {
		if let Some((value, context)) = item.split_once(separator) {
			return Artifact {
				value: value.trim().to_string(),
				context: context.trim().to_string(),
			};
		}
	}

	Artifact { value: item.to_string(), context: String::new() }
}
