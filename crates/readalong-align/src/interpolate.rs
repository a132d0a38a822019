//! Interpolator (C6, §4.6): fill gaps between matched sentences with
//! linearly spaced ranges, and compute per-chapter duration as the sum of
//! maximal same-track runs.

use crate::range::SentenceRange;

/// Sentence ids `i+1..j` bounded by matched ids `i` and `j` on the same
/// track get linearly interpolated ranges; a track-crossing gap is left
/// unmapped (§4.6).
///
/// `matched` must already be sorted by `sentence_id` and contain every
/// sentence id in the chapter that the aligner (or a previous
/// interpolation pass) assigned a range to. `all_ids` lists every
/// addressable sentence id in the chapter, in order, including the
/// unmatched ones.
pub fn interpolate_chapter(matched: &[SentenceRange], all_ids: &[u32]) -> Vec<SentenceRange> {
    let mut by_id: std::collections::BTreeMap<u32, SentenceRange> =
        matched.iter().cloned().map(|r| (r.sentence_id, r)).collect();

    let matched_ids: Vec<u32> = by_id.keys().copied().collect();
    for pair in matched_ids.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        let gap = all_ids.iter().filter(|id| **id > i && **id < j).count();
        if gap == 0 {
            continue;
        }
        let range_i = by_id.get(&i).unwrap().clone();
        let range_j = by_id.get(&j).unwrap().clone();
        if range_i.track != range_j.track {
            // Track-crossing gap: leave the intervening sentences unmapped.
            continue;
        }
        let span = range_j.start_time - range_i.end_time;
        let steps = (j - i - 1) as f64;
        let per_step = span / steps;

        let mut cursor = range_i.end_time;
        for id in (i + 1)..j {
            let start = cursor;
            let end = range_i.end_time + per_step * ((id - i) as f64);
            by_id.insert(
                id,
                SentenceRange {
                    sentence_id: id,
                    start_time: start,
                    end_time: end,
                    track: range_i.track.clone(),
                },
            );
            cursor = end;
        }
    }

    by_id.into_values().collect()
}

/// Per-chapter duration: sum over maximal same-track runs of
/// `run.last.end - run.first.start` (§4.6).
pub fn chapter_duration(ranges: &[SentenceRange]) -> f64 {
    let mut total = 0.0;
    let mut run_start: Option<f64> = None;
    let mut run_end = 0.0;
    let mut run_track: Option<&str> = None;

    for r in ranges {
        match run_track {
            Some(t) if t == r.track => {
                run_end = r.end_time;
            }
            _ => {
                if let Some(start) = run_start {
                    total += run_end - start;
                }
                run_start = Some(r.start_time);
                run_end = r.end_time;
                run_track = Some(&r.track);
            }
        }
    }
    if let Some(start) = run_start {
        total += run_end - start;
    }
    total
}
