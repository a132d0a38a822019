//! `SentenceRange` (§3) and the bookkeeping the aligner and interpolator
//! share to close and chain ranges across sentences, chapters, and tracks.

#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRange {
    pub sentence_id: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub track: String,
}

impl SentenceRange {
    pub fn new_point(sentence_id: u32, time: f64, track: String) -> Self {
        Self {
            sentence_id,
            start_time: time,
            end_time: time,
            track,
        }
    }
}
