//! Single-pass and map-reduce report generation.
//!
//! A corpus that fits in `pipeline.max_chunk_size` characters goes to the model in one call.
//! Larger corpora are chunked on source boundaries, every chunk is analysed independently (map),
//! and the analyses are merged by one final call (reduce).

use std::{collections::HashSet, sync::Arc};

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::info;

use robin_chunking::ContentChunk;
use robin_config::LlmProviderConfig;
use robin_domain::{Artifact, ChunkSummary, FilteringPolicy, excluded_section};

use crate::{CompletionProvider, Error, IntelligenceReport, Result, RobinService, SummaryMode};

const DIRECT_STAGE: &str = "single-pass summarization";
const REDUCE_STAGE: &str = "report synthesis";

impl RobinService {
	/// Produces the report for a scraped corpus whose exclusion section, if any, trails the last
	/// source.
	pub async fn summarize(&self, query: &str, corpus: &str) -> Result<IntelligenceReport> {
		let (scraped, excluded) = robin_chunking::split_excluded(corpus);

		self.summarize_sources(query, scraped, excluded.unwrap_or_default()).await
	}

	/// Produces the report for `scraped` source text plus pre-rendered exclusion text, choosing
	/// single-pass or map-reduce by their combined length. `excluded` is never chunked.
	pub async fn summarize_sources(
		&self,
		query: &str,
		scraped: &str,
		excluded: &str,
	) -> Result<IntelligenceReport> {
		let policy = FilteringPolicy::from(&self.cfg.filtering);
		let max_chunk_size = self.cfg.pipeline.max_chunk_size;
		let corpus_chars = robin_chunking::char_len(scraped) + robin_chunking::char_len(excluded);
		let mut source_links = robin_chunking::source_links(scraped);

		if corpus_chars <= max_chunk_size {
			let corpus = format!("{scraped}{excluded}");
			let body = self.synthesize_direct(query, &corpus, &policy).await?;

			return Ok(IntelligenceReport {
				query: query.to_string(),
				mode: SummaryMode::SinglePass,
				body,
				source_links,
				artifacts: Vec::new(),
				observations: Vec::new(),
				filtering_note: policy.note(),
				excluded_section: excluded_section(excluded),
			});
		}

		info!(
			corpus_chars,
			max_chunk_size,
			"Corpus exceeds the chunk size; summarizing in chunks."
		);

		let chunks = robin_chunking::chunk(scraped, max_chunk_size);
		let total_chunks = chunks.len();

		info!(total_chunks, "Corpus split into chunks.");

		let summaries = self.summarize_chunks(query, chunks).await?;

		info!(total_chunks, "Synthesizing final report.");

		let body = self.synthesize(query, &summaries, excluded, &policy).await?;

		merge_source_urls(&mut source_links, &summaries);

		Ok(IntelligenceReport {
			query: query.to_string(),
			mode: SummaryMode::MapReduce { chunks: total_chunks },
			body,
			source_links,
			artifacts: merge_artifacts(&summaries),
			observations: summaries
				.iter()
				.flat_map(|summary| summary.observations.iter().cloned())
				.collect(),
			filtering_note: policy.note(),
			excluded_section: excluded_section(excluded),
		})
	}

	/// Map stage for one chunk.
	pub async fn summarize_chunk(&self, query: &str, chunk: ContentChunk) -> Result<ChunkSummary> {
		summarize_chunk(self.providers.completion.as_ref(), &self.cfg.provider, query, chunk).await
	}

	/// Runs the map stage over every chunk with at most `pipeline.chunk_workers` calls in
	/// flight. Summaries come back in chunk order; the first failure aborts the rest.
	pub async fn summarize_chunks(
		&self,
		query: &str,
		chunks: Vec<ContentChunk>,
	) -> Result<Vec<ChunkSummary>> {
		let permits = Arc::new(Semaphore::new(self.cfg.pipeline.chunk_workers.max(1)));
		let mut tasks = JoinSet::new();
		let mut summaries = Vec::with_capacity(chunks.len());

		for chunk in chunks {
			let permits = permits.clone();
			let provider = self.providers.completion.clone();
			let cfg = self.cfg.provider.clone();
			let query = query.to_string();

			tasks.spawn(async move {
				let _permit = permits
					.acquire_owned()
					.await
					.map_err(|err| Error::Task { message: err.to_string() })?;

				summarize_chunk(provider.as_ref(), &cfg, &query, chunk).await
			});
		}

		while let Some(joined) = tasks.join_next().await {
			let summary = joined.map_err(|err| Error::Task { message: err.to_string() })??;

			summaries.push(summary);
		}

		summaries.sort_by_key(|summary| summary.sequence_number);

		Ok(summaries)
	}

	/// Reduce stage: merges chunk analyses, in sequence order, into the final report text.
	pub async fn synthesize(
		&self,
		query: &str,
		summaries: &[ChunkSummary],
		excluded_info: &str,
		policy: &FilteringPolicy,
	) -> Result<String> {
		let combined =
			summaries.iter().map(|summary| summary.text.as_str()).collect::<Vec<_>>().join("\n\n");
		let instructions = build_reduce_instructions(query, excluded_info, policy);

		self.complete(REDUCE_STAGE, &instructions, &combined).await
	}

	/// Single-pass report over the whole corpus.
	pub async fn synthesize_direct(
		&self,
		query: &str,
		corpus: &str,
		policy: &FilteringPolicy,
	) -> Result<String> {
		let instructions = build_direct_instructions(query, policy);

		self.complete(DIRECT_STAGE, &instructions, corpus).await
	}
}

async fn summarize_chunk(
	provider: &dyn CompletionProvider,
	cfg: &LlmProviderConfig,
	query: &str,
	chunk: ContentChunk,
) -> Result<ChunkSummary> {
	let ContentChunk { sequence_number, total_chunks, text, approx_size } = chunk;

	info!(sequence_number, total_chunks, approx_size, "Analysing chunk.");

	let instructions = build_chunk_instructions(query, sequence_number, total_chunks);
	let raw = provider.complete(cfg, &instructions, &text).await.map_err(|err| {
		Error::ChunkFailed { sequence_number, total_chunks, message: err.to_string() }
	})?;

	Ok(ChunkSummary::parse(sequence_number, raw))
}

/// Appends links named by chunk analyses that the source markers did not already list.
fn merge_source_urls(links: &mut Vec<String>, summaries: &[ChunkSummary]) {
	for url in summaries.iter().flat_map(|summary| summary.source_urls.iter()) {
		if !links.iter().any(|known| known == url) {
			links.push(url.clone());
		}
	}
}

fn merge_artifacts(summaries: &[ChunkSummary]) -> Vec<Artifact> {
	let mut seen = HashSet::new();
	let mut merged = Vec::new();

	for artifact in summaries.iter().flat_map(|summary| summary.artifacts.iter()) {
		if seen.insert(artifact.value.to_lowercase()) {
			merged.push(artifact.clone());
		}
	}

	merged
}

fn build_chunk_instructions(query: &str, chunk_num: usize, total_chunks: usize) -> String {
	format!(
		"You are a Cybercrime Threat Intelligence Expert analyzing dark web OSINT data.

This is CHUNK {chunk_num} of {total_chunks} for query: \"{query}\"

Rules:
1. Extract and list all source URLs from this chunk
2. Identify all intelligence artifacts (emails, domains, cryptocurrency addresses, threat actors, malware, etc.)
3. Note any patterns or connections
4. Keep your analysis concise and focused on facts
5. Do NOT generate final conclusions - this is a partial analysis

Output Format:
**Chunk {chunk_num}/{total_chunks} Analysis:**
- Source URLs: [list all URLs]
- Artifacts Found: [list all artifacts with context, one per line as value - context]
- Key Observations: [2-3 bullet points]"
	)
}

fn build_reduce_instructions(query: &str, excluded_info: &str, policy: &FilteringPolicy) -> String {
	let excluded = if excluded_info.trim().is_empty() {
		"None".to_string()
	} else {
		format!(
			"include the following verbatim, preceded by this disclaimer: \"{}\"\n{}",
			robin_domain::EXCLUSION_DISCLAIMER,
			excluded_info.trim()
		)
	};

	format!(
		"You are a Cybercrime Threat Intelligence Expert creating a final comprehensive report.

You have been provided with analysis from multiple data chunks. Synthesize them into a complete intelligence report.

Filtering Applied:
{note}

Output Format:
1. Input Query: {query}
2. Source Links Referenced for Analysis - comprehensive list from all chunks
3. Investigation Artifacts - all artifacts identified across all chunks (deduplicated)
4. Key Insights - 3-7 high-level insights synthesized from all chunks
5. Excluded Content - {excluded}
6. Next Steps - actionable investigation steps and suggested queries

Format your response in a structured way with clear section headings.",
		note = policy.note(),
	)
}

fn build_direct_instructions(query: &str, policy: &FilteringPolicy) -> String {
	let filtering = policy.instructions(10).join("\n");

	format!(
		"You are a Cybercrime Threat Intelligence Expert tasked with generating context-based technical investigative insights from dark web osint search engine results.

Rules:
1. Analyze the Darkweb OSINT data provided using links and their raw text.
2. Output the Source Links referenced for the analysis.
3. Provide a detailed, contextual, evidence-based technical analysis of the data.
4. Provide intelligence artifacts along with their context visible in the data.
5. The artifacts can include indicators like name, email, phone, cryptocurrency addresses, domains, darkweb markets, forum names, threat actor information, malware names, TTPs, etc.
6. Generate 3-7 key insights based on the data.
7. Each insight should be specific, actionable, context-based, and data-driven.
8. Include suggested next steps and queries for investigating more on the topic.
9. Be objective and analytical in your assessment.
{filtering}

Filtering Applied:
{note}

Output Format:
1. Input Query: {query}
2. Source Links Referenced for Analysis - this heading will include all source links used for the analysis
3. Investigation Artifacts - this heading will include all technical artifacts identified including name, email, phone, cryptocurrency addresses, domains, darkweb markets, forum names, threat actor information, malware names, etc.
4. Key Insights
5. Excluded Content - this section lists any content, links, or data that was explicitly excluded from the analysis with reasons why they were excluded (e.g., not safe for work content, irrelevant results, inaccessible links, malformed data, blocked keywords, etc.). Include a disclaimer: \"{disclaimer}\"
6. Next Steps - this includes next investigative steps including search queries to search more on a specific artifacts for example or any other topic.

Format your response in a structured way with clear section headings.

INPUT:",
		note = policy.note(),
		disclaimer = robin_domain::EXCLUSION_DISCLAIMER,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn chunk_instructions_name_position_and_forbid_conclusions() {
		let instructions = build_chunk_instructions("carding forums", 2, 5);

		assert!(instructions.contains("CHUNK 2 of 5 for query: \"carding forums\""));
		assert!(instructions.contains("Do NOT generate final conclusions"));
		assert!(instructions.contains("**Chunk 2/5 Analysis:**"));
	}

	#[test]
	fn reduce_instructions_state_none_without_exclusions() {
		let instructions = build_reduce_instructions("q", "  ", &FilteringPolicy::default());

		assert!(instructions.contains("5. Excluded Content - None"));
		assert!(instructions.contains("No content filtering applied"));
	}

	#[test]
	fn reduce_instructions_carry_exclusions_and_disclaimer() {
		let instructions = build_reduce_instructions(
			"q",
			"--- EXCLUDED SEARCH ENGINES ---\n- svc: down\n",
			&FilteringPolicy { nsfw: true, ..Default::default() },
		);

		assert!(instructions.contains(robin_domain::EXCLUSION_DISCLAIMER));
		assert!(instructions.contains("- svc: down"));
		assert!(instructions.contains("- NSFW content was filtered from analysis"));
	}

	#[test]
	fn direct_instructions_number_filtering_rules_after_base_rules() {
		let policy = FilteringPolicy { blocklist: vec!["cvv".to_string()], ..Default::default() };
		let instructions = build_direct_instructions("q", &policy);

		assert!(instructions.contains("10. ALWAYS exclude content containing these keywords: cvv"));
		assert!(instructions.contains("11. Identify any content"));
	}

	#[test]
	fn merges_artifacts_case_insensitively() {
		let summaries = vec![
			ChunkSummary::parse(1, "Artifacts Found:\n- Vendor@Mail.onion - seller contact"),
			ChunkSummary::parse(2, "Artifacts Found:\n- vendor@mail.onion - repeated\n- bc1qabc"),
		];
		let merged = merge_artifacts(&summaries);

		assert_eq!(merged.len(), 2);
		assert_eq!(merged[0].context, "seller contact");
		assert_eq!(merged[1].value, "bc1qabc");
	}

	#[test]
	fn appends_only_unknown_summary_urls() {
		let summaries = vec![ChunkSummary::parse(
			1,
			"Source URLs: http://a.onion/x, http://b.onion/y\nKey Observations:\n- none",
		)];
		let mut links = vec!["http://a.onion/x".to_string()];

		merge_source_urls(&mut links, &summaries);

		assert_eq!(links, vec!["http://a.onion/x", "http://b.onion/y"]);
	}
}
