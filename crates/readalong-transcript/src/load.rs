//! Reading and validating per-track transcript documents (§4.2).

use std::fs;
use std::path::Path;

use readalong_foundation::error::TranscriptError;
use serde::Deserialize;

use crate::types::{AlignedTranscript, Segment};

#[derive(Deserialize)]
struct TranscriptDoc {
    segments: Vec<Segment>,
    // word_segments[] is an optional flat listing the core does not need
    // (§6): accepted and ignored rather than rejected as unknown input.
    #[serde(default, rename = "word_segments")]
    _word_segments: serde_json::Value,
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a track's transcript JSON and validate that every segment's words
/// reconstruct its text modulo single spaces.
pub fn load_transcript(track: &str, path: &Path) -> Result<AlignedTranscript, TranscriptError> {
    let raw = fs::read_to_string(path).map_err(|source| TranscriptError::Io {
        track: track.to_string(),
        source,
    })?;
    let doc: TranscriptDoc =
        serde_json::from_str(&raw).map_err(|source| TranscriptError::Parse {
            track: track.to_string(),
            source,
        })?;

    for (index, segment) in doc.segments.iter().enumerate() {
        if segment.words.is_empty() {
            continue;
        }
        let expected = normalize(&segment.text);
        let actual = normalize(&segment.reconstructed_text());
        if expected != actual {
            return Err(TranscriptError::WordTextMismatch {
                track: track.to_string(),
                segment_index: index,
                expected,
                actual,
            });
        }
    }

    Ok(AlignedTranscript {
        track: track.to_string(),
        segments: doc.segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn accepts_words_that_reconstruct_the_segment_text() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"segments":[{{"text":"Hello world.","start":0.0,"end":1.0,
               "words":[{{"word":"Hello","start":0.0,"end":0.5}},
                        {{"word":"world.","start":0.5,"end":1.0}}]}}]}}"#
        )
        .unwrap();
        let transcript = load_transcript("track-1", file.path()).unwrap();
        assert_eq!(transcript.segments.len(), 1);
    }

    #[test]
    fn rejects_words_that_do_not_reconstruct_the_segment_text() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"segments":[{{"text":"Hello world.","start":0.0,"end":1.0,
               "words":[{{"word":"Goodbye","start":0.0,"end":0.5}}]}}]}}"#
        )
        .unwrap();
        let err = load_transcript("track-1", file.path()).unwrap_err();
        assert!(matches!(err, TranscriptError::WordTextMismatch { .. }));
    }

    #[test]
    fn single_word_segment_without_word_timings_is_accepted() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"segments":[{{"text":"Yes.","start":2.0,"end":2.4,"words":[]}}]}}"#
        )
        .unwrap();
        let transcript = load_transcript("track-1", file.path()).unwrap();
        assert_eq!(transcript.segments[0].word_at(0), (2.0, 2.4));
    }
}
