//! Marker-aware splitting of scraped corpora into size-bounded chunks.
//!
//! The scraper prefixes every source with [`URL_MARKER`]. Chunk boundaries only fall on those
//! markers, so one source's text stays in one chunk unless it alone is larger than the limit.
//! Sizes are counted in Unicode scalar values.

/// Prefix the scraper writes before each source's text, followed by the source link.
pub const URL_MARKER: &str = "--- URL:";
/// Prefix of the trailing, pre-rendered exclusion section appended after all sources.
pub const EXCLUDED_MARKER: &str = "--- EXCLUDED";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentChunk {
	/// 1-based position of this chunk.
	pub sequence_number: usize,
	pub total_chunks: usize,
	pub text: String,
	pub approx_size: usize,
}

/// Separates the trailing exclusion section from the scraped text.
///
/// Only a marker at the start of a line after the last source marker counts, so page text that
/// quotes the marker inside an earlier source stays with that source. The returned exclusion part
/// keeps its leading marker.
pub fn split_excluded(corpus: &str) -> (&str, Option<&str>) {
	let tail = corpus.rfind(URL_MARKER).unwrap_or(0);
	let found = corpus[tail..]
		.match_indices(EXCLUDED_MARKER)
		.map(|(offset, _)| tail + offset)
		.find(|&at| at == 0 || corpus[..at].ends_with('\n'));

	match found {
		Some(at) => (&corpus[..at], Some(&corpus[at..])),
		None => (corpus, None),
	}
}

pub fn char_len(text: &str) -> usize {
	text.chars().count()
}

/// Links named by the source markers in `corpus`, deduplicated in order of appearance.
pub fn source_links(corpus: &str) -> Vec<String> {
	let mut links: Vec<String> = Vec::new();

	for section in corpus.split(URL_MARKER).skip(1) {
		let Some(link) = section.split_whitespace().next() else {
			continue;
		};

		if !links.iter().any(|known| known == link) {
			links.push(link.to_string());
		}
	}

	links
}

/// Splits `corpus` on [`URL_MARKER`] and packs the sections into chunks of at most
/// `max_chunk_size` characters.
///
/// Text before the first marker starts chunk 1. Concatenating the returned chunks in order
/// yields `corpus` exactly, and an empty corpus yields a single empty chunk.
pub fn chunk(corpus: &str, max_chunk_size: usize) -> Vec<ContentChunk> {
	let marker_len = char_len(URL_MARKER);
	let mut segments = corpus.split(URL_MARKER);
	let mut current = segments.next().unwrap_or_default().to_string();
	let mut current_len = char_len(&current);
	let mut sealed: Vec<(String, usize)> = Vec::new();

	for section in segments {
		let section_len = marker_len + char_len(section);

		if !current.is_empty() && current_len + section_len > max_chunk_size {
			sealed.push((std::mem::take(&mut current), current_len));

			current_len = 0;
		}
		if section_len > max_chunk_size {
			tracing::warn!(
				section_chars = section_len,
				max_chunk_size,
				"Single source exceeds the chunk size; keeping it whole."
			);
		}

		current.push_str(URL_MARKER);
		current.push_str(section);

		current_len += section_len;
	}

	sealed.push((current, current_len));

	let total_chunks = sealed.len();

	tracing::debug!(
		total_chunks,
		corpus_chars = char_len(corpus),
		max_chunk_size,
		"Corpus chunked."
	);

	sealed
		.into_iter()
		.enumerate()
		.map(|(idx, (text, approx_size))| ContentChunk {
			sequence_number: idx + 1,
			total_chunks,
			text,
			approx_size,
		})
		.collect()
}
