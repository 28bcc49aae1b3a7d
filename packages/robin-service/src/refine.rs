use tracing::warn;

use crate::{Result, RobinService};

const STAGE: &str = "query refinement";

impl RobinService {
	/// Rewrites the user's query into a form suited to dark web search engines.
	///
	/// A blank answer keeps the original query.
	pub async fn refine_query(&self, query: &str) -> Result<String> {
		let raw = self.complete(STAGE, &build_refine_instructions(), query).await?;
		let refined = clean_refined(&raw);

		if refined.is_empty() {
			warn!(query, "Query refinement returned nothing; keeping the original query.");

			return Ok(query.to_string());
		}

		tracing::info!(query, refined = %refined, "Query refined.");

		Ok(refined)
	}
}

fn build_refine_instructions() -> String {
	"You are a Cybercrime Threat Intelligence Expert. Your task is to refine the provided user query \
that needs to be sent to darkweb search engines.

Rules:
1. Analyze the user query and think about how it can be improved to use as search engine query
2. Refine the user query by adding or removing words so that it returns the best result from dark web search engines
3. Don't use any logical operators (AND, OR, etc.)
4. Output just the user query and nothing else

INPUT:"
		.to_string()
}

fn clean_refined(raw: &str) -> String {
	let first_line = raw.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or_default();

	first_line.trim_matches(['"', '\'', '`']).trim().to_string()
}
