//! Chapter locator (C4, §4.4): anchor each chapter to a position in the
//! concatenated transcript projection.

use readalong_foundation::config::EngineConfig;
use readalong_transcript::ConcatTranscript;
use readalong_text::Chapter;
use tracing::{debug, info};

use crate::cache::{ChapterAnchor, SyncCache};
use crate::fuzzy::find_near;

pub struct ChapterLocator<'a> {
    projection: Vec<char>,
    cursor: usize,
    cache: &'a mut SyncCache,
    config: &'a EngineConfig,
}

impl<'a> ChapterLocator<'a> {
    pub fn new(concat: &ConcatTranscript, cache: &'a mut SyncCache, config: &'a EngineConfig) -> Self {
        Self {
            projection: concat.projection().chars().collect(),
            cursor: 0,
            cache,
            config,
        }
    }

    /// Anchor one chapter, consulting and then updating the cache.
    /// Returns the resolved anchor (which may be the "skipped" sentinel).
    pub fn anchor_chapter(
        &mut self,
        chapter_index: usize,
        chapter: &Chapter,
    ) -> ChapterAnchor {
        if let Some(anchor) = self.cache.get(chapter_index) {
            if let Some(offset) = anchor.transcript_offset {
                self.cursor = offset;
            }
            info!(chapter_index, "chapter anchor served from cache");
            return anchor;
        }

        let sentences: Vec<String> = chapter
            .addressable_sentences()
            .iter()
            .map(|s| s.text.clone())
            .collect();

        let anchor = match self.search(&sentences) {
            Some((start_sentence, offset)) => {
                self.cursor = offset;
                debug!(chapter_index, start_sentence, offset, "chapter anchored");
                ChapterAnchor {
                    start_sentence,
                    transcript_offset: Some(offset),
                }
            }
            None => {
                info!(chapter_index, "no transcript match found; chapter skipped");
                ChapterAnchor {
                    start_sentence: 0,
                    transcript_offset: None,
                }
            }
        };

        let _ = self.cache.record(chapter_index, anchor);
        anchor
    }

    fn search(&self, sentences: &[String]) -> Option<(u32, usize)> {
        let total = self.projection.len();
        if total == 0 || sentences.is_empty() {
            return None;
        }

        let mut window_start = self.cursor % total;
        let mut scanned = 0usize;

        loop {
            let window_len = self.config.anchor_window_chars.min(total);
            let window: String = (0..window_len)
                .map(|i| self.projection[(window_start + i) % total])
                .collect();

            let mut start_sentence = 0usize;
            while start_sentence < sentences.len() {
                let end = (start_sentence + self.config.anchor_query_sentences).min(sentences.len());
                let query = sentences[start_sentence..end].join(" ");
                let max_dist = (self.config.chapter_anchor_k * query.chars().count() as f64).floor() as usize;
                if let Some(m) = find_near(&query, &window, max_dist) {
                    let absolute = (window_start + m.start) % total;
                    return Some((start_sentence as u32, absolute));
                }
                start_sentence += self.config.anchor_skip_stride;
            }

            let advance = (self.config.anchor_window_chars / 2).max(1);
            scanned += advance;
            window_start = (window_start + advance) % total;
            if scanned >= total {
                return None;
            }
        }
    }
}
