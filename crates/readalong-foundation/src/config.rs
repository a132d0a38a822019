//! Explicit configuration for the fuzzy-match thresholds and window sizes
//! C3-C6 use (§4.3/§4.4/§4.5; Design Notes §9: "Configuration ... is
//! passed explicitly, never read from globals mid-algorithm").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max-edit-distance fraction for chapter anchoring (§4.4).
    pub chapter_anchor_k: f64,
    /// Max-edit-distance fraction for sentence matching (§4.5).
    pub sentence_match_k: f64,
    /// Number of leading sentences used to form a chapter-anchor query (§4.4).
    pub anchor_query_sentences: usize,
    /// Character width of a chapter-anchor search window (§4.4).
    pub anchor_window_chars: usize,
    /// Number of transcript segments in a sentence-aligner window (§4.5).
    pub aligner_window_segments: usize,
    /// How far `start_sentence` advances when a chapter-anchor window misses (§4.4).
    pub anchor_skip_stride: usize,
    /// Consecutive misses before the aligner shifts its window (§4.5).
    pub aligner_not_found_threshold: u32,
    /// Windows the aligner will shift through before giving up on a sentence (§4.5).
    pub aligner_window_advance_ceiling: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chapter_anchor_k: 0.10,
            sentence_match_k: 0.25,
            anchor_query_sentences: 6,
            anchor_window_chars: 5000,
            aligner_window_segments: 10,
            anchor_skip_stride: 3,
            aligner_not_found_threshold: 3,
            aligner_window_advance_ceiling: 30,
        }
    }
}
