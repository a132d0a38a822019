//! Per-track transcript data types (§3, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Word {
    pub word: String,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub words: Vec<Word>,
}

impl Segment {
    /// Start offset of each word within `join(words, " ")`, mirroring the
    /// `segment_offsets` construction in §4.2 one level down.
    fn word_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.words.len());
        let mut offset = 0usize;
        for w in &self.words {
            offsets.push(offset);
            offset += w.word.chars().count() + 1;
        }
        offsets
    }

    /// `join(words.word, " ")`, whitespace-normalized the same way
    /// validation compares it against `text`.
    pub fn reconstructed_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The word (and its timing) whose span covers intra-segment character
    /// offset `at`, per §4.2 step 2. Falls back to the segment's own
    /// timing when a single-word segment has no word-level timing.
    pub fn word_at(&self, at: usize) -> (f64, f64) {
        if self.words.is_empty() {
            return (self.start, self.end);
        }
        let offsets = self.word_offsets();
        let idx = match offsets.binary_search(&at) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        };
        let w = &self.words[idx];
        (w.start.unwrap_or(self.start), w.end.unwrap_or(self.end))
    }
}

/// Track metadata supplied externally (§6: "Input: track metadata"), not
/// embedded in the transcript document itself.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: String,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct AlignedTranscript {
    pub track: String,
    pub segments: Vec<Segment>,
}
