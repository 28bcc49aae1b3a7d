use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[0-9]+").expect("Digit pattern must compile."));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionOutcome {
	/// 1-based positions into the candidate list, in selection order.
	pub selected_indices: Vec<usize>,
	pub used_fallback: bool,
}

/// Recovers up to `max_results` distinct 1-based indices from a free-text model answer.
///
/// Every digit run is considered in order of appearance; values outside `1..=candidate_count`
/// are ignored. When nothing valid remains the first `min(candidate_count, max_results)`
/// positions are selected instead.
pub fn select_indices(raw: &str, candidate_count: usize, max_results: usize) -> SelectionOutcome {
	let mut seen = HashSet::new();
	let mut selected = Vec::new();

	for run in DIGIT_RUN.find_iter(raw) {
		// Runs too long for usize cannot be in range anyway.
		let Ok(index) = run.as_str().parse::<usize>() else {
			continue;
		};

		if (1..=candidate_count).contains(&index) && seen.insert(index) {
			selected.push(index);
		}
	}

	if selected.is_empty() {
		let limit = candidate_count.min(max_results);

		return SelectionOutcome { selected_indices: (1..=limit).collect(), used_fallback: true };
	}

	selected.truncate(max_results);

	SelectionOutcome { selected_indices: selected, used_fallback: false }
}
