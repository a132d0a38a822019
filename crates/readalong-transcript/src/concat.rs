//! The concatenated transcript projection and its index (§4.2).

use readalong_foundation::error::TranscriptError;

use crate::types::{AlignedTranscript, Track};

/// Points at one segment within the flattened, track-ordered segment list.
#[derive(Debug, Clone, Copy)]
struct GlobalSegmentRef {
    track_index: usize,
    segment_index: usize,
}

/// The virtual concatenation of every track's segments, in track order
/// (§3). Read-only once built (§5).
pub struct ConcatTranscript {
    tracks: Vec<Track>,
    transcripts: Vec<AlignedTranscript>,
    projection: String,
    /// `segment_offsets[i]` = character offset in `projection` where the
    /// i-th global segment begins.
    segment_offsets: Vec<usize>,
    segment_refs: Vec<GlobalSegmentRef>,
}

impl ConcatTranscript {
    /// Build from tracks already ordered by filename sort (§6), each
    /// paired with its validated transcript.
    pub fn build(pairs: Vec<(Track, AlignedTranscript)>) -> Result<Self, TranscriptError> {
        let mut tracks = Vec::with_capacity(pairs.len());
        let mut transcripts = Vec::with_capacity(pairs.len());
        for (track, transcript) in pairs {
            tracks.push(track);
            transcripts.push(transcript);
        }

        let mut projection = String::new();
        let mut segment_offsets = Vec::new();
        let mut segment_refs = Vec::new();
        let mut running = 0usize;

        for (track_index, transcript) in transcripts.iter().enumerate() {
            for (segment_index, segment) in transcript.segments.iter().enumerate() {
                if !projection.is_empty() {
                    projection.push(' ');
                    running += 1;
                }
                segment_offsets.push(running);
                segment_refs.push(GlobalSegmentRef {
                    track_index,
                    segment_index,
                });
                projection.push_str(&segment.text);
                running += segment.text.chars().count();
            }
        }

        Ok(Self {
            tracks,
            transcripts,
            projection,
            segment_offsets,
            segment_refs,
        })
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn num_segments(&self) -> usize {
        self.segment_refs.len()
    }

    pub fn segment_offset(&self, global_index: usize) -> usize {
        self.segment_offsets[global_index]
    }

    pub fn segment_text(&self, global_index: usize) -> &str {
        let r = self.segment_refs[global_index];
        &self.transcripts[r.track_index].segments[r.segment_index].text
    }

    pub fn segment_track(&self, global_index: usize) -> &str {
        let r = self.segment_refs[global_index];
        &self.tracks[r.track_index].id
    }

    pub fn track_duration(&self, track_id: &str) -> Option<f64> {
        self.tracks.iter().find(|t| t.id == track_id).map(|t| t.duration)
    }

    /// The global segment index whose span covers character `position`
    /// (ties resolve to the earlier segment, §4.2).
    pub fn segment_index_at(&self, position: usize) -> usize {
        if self.segment_offsets.is_empty() {
            return 0;
        }
        self.segment_offsets
            .partition_point(|&offset| offset <= position)
            .saturating_sub(1)
    }

    /// §4.2's projection index: map a character position in `projection`
    /// back to `(time, track)`.
    pub fn resolve(&self, position: usize) -> (f64, String) {
        let s = self.segment_index_at(position);
        let segment_start = self.segment_offsets[s];
        let intra = position.saturating_sub(segment_start);
        let r = self.segment_refs[s];
        let segment = &self.transcripts[r.track_index].segments[r.segment_index];
        let (time, _end) = segment.word_at(intra);
        (time, self.tracks[r.track_index].id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    fn segment(text: &str, start: f64, end: f64) -> Segment {
        serde_json::from_value(serde_json::json!({
            "text": text, "start": start, "end": end, "words": []
        }))
        .unwrap()
    }

    #[test]
    fn projection_joins_segments_with_single_spaces() {
        let t1 = Track { id: "a.mp3".into(), duration: 10.0 };
        let tr1 = AlignedTranscript {
            track: "a.mp3".into(),
            segments: vec![segment("Hello there.", 0.0, 1.0), segment("Goodbye now.", 1.0, 2.0)],
        };
        let concat = ConcatTranscript::build(vec![(t1, tr1)]).unwrap();
        assert_eq!(concat.projection(), "Hello there. Goodbye now.");
    }

    #[test]
    fn resolve_maps_a_position_back_to_its_segment_time_and_track() {
        let t1 = Track { id: "a.mp3".into(), duration: 10.0 };
        let tr1 = AlignedTranscript {
            track: "a.mp3".into(),
            segments: vec![segment("Hello there.", 0.0, 1.0), segment("Goodbye now.", 1.0, 2.0)],
        };
        let concat = ConcatTranscript::build(vec![(t1, tr1)]).unwrap();
        let (time, track) = concat.resolve(13); // start of "Goodbye now."
        assert_eq!(track, "a.mp3");
        assert_eq!(time, 1.0);
    }
}
