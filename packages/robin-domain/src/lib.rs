pub mod candidate;
pub mod exclusion;
pub mod policy;
pub mod selection;
pub mod summary;

pub use candidate::{CandidateResult, format_results};
pub use exclusion::{
	EXCLUSION_DISCLAIMER, ExclusionCategory, ExclusionRecord, ExclusionTracker, excluded_section,
};
pub use policy::{FilteringPolicy, NO_FILTERING_NOTE};
pub use selection::{SelectionOutcome, select_indices};
pub use summary::{Artifact, ChunkSummary};
