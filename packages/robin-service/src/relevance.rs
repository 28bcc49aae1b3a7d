use tracing::{info, warn};

use robin_domain::{CandidateResult, SelectionOutcome, format_results, select_indices};

use crate::{Error, Result, RobinService};

const STAGE: &str = "relevance filtering";

impl RobinService {
	/// Filters `results` down to at most `pipeline.max_results` entries.
	pub async fn filter_results(
		&self,
		query: &str,
		results: &[CandidateResult],
	) -> Result<Vec<CandidateResult>> {
		self.filter_with_limit(query, results, self.cfg.pipeline.max_results as usize).await
	}

	/// Asks the model for the `max_results` candidates that best match `query`.
	///
	/// A `max_results` of zero disables filtering. A rate-limited request is retried once with a
	/// truncated listing; an unparsable answer falls back to the leading candidates.
	pub async fn filter_with_limit(
		&self,
		query: &str,
		results: &[CandidateResult],
		max_results: usize,
	) -> Result<Vec<CandidateResult>> {
		if results.is_empty() {
			return Ok(Vec::new());
		}
		if max_results == 0 {
			info!(
				candidates = results.len(),
				"Result limit is zero; keeping every candidate without filtering."
			);

			return Ok(results.to_vec());
		}

		let instructions = build_filter_instructions(query, max_results);
		let listing = format_results(results, false);
		let first =
			self.providers.completion.complete(&self.cfg.provider, &instructions, &listing).await;
		let raw = match first {
			Ok(raw) => raw,
			Err(err) if err.is_rate_limited() => {
				warn!(
					error = %err,
					"Relevance filtering was rate limited; retrying with a truncated listing."
				);

				let listing = format_results(results, true);

				self.complete(STAGE, &instructions, &listing).await?
			},
			Err(err) => return Err(Error::from_provider(STAGE, err)),
		};
		let outcome = select_indices(&raw, results.len(), max_results);

		if outcome.used_fallback {
			warn!(
				raw = %raw,
				kept = outcome.selected_indices.len(),
				"Unable to interpret the result selection; keeping the leading results."
			);
		}

		let selected = pick(results, &outcome);

		info!(candidates = results.len(), selected = selected.len(), "Results filtered.");

		Ok(selected)
	}
}

fn pick(results: &[CandidateResult], outcome: &SelectionOutcome) -> Vec<CandidateResult> {
	outcome.selected_indices.iter().filter_map(|idx| results.get(idx - 1)).cloned().collect()
}

fn build_filter_instructions(query: &str, max_results: usize) -> String {
	format!(
		"You are a Cybercrime Threat Intelligence Expert. You are given a dark web search query and a list of search results in the form of index, link and title.
Your task is select the Top {max_results} relevant results that best match the search query for user to investigate more.
Rule:
1. Output ONLY atmost top {max_results} indices (comma-separated list) no more than that that best match the input query

Search Query: {query}
Search Results:"
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn instructions_carry_query_and_limit() {
		let instructions = build_filter_instructions("ransomware wallets", 7);

		assert!(instructions.contains("Search Query: ransomware wallets"));
		assert!(instructions.contains("Top 7 relevant results"));
	}

	#[test]
	fn picks_in_selection_order() {
		let results: Vec<_> =
			(1..=4).map(|idx| CandidateResult::new(format!("l{idx}"), format!("t{idx}"))).collect();
		let outcome = SelectionOutcome { selected_indices: vec![4, 1], used_fallback: false };

		assert_eq!(pick(&results, &outcome), vec![results[3].clone(), results[0].clone()]);
	}
}
