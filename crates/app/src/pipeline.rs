//! Per-book orchestration: load inputs, anchor and align every chapter,
//! interpolate gaps, and emit the augmented package.
//!
//! Grounded on `examples/original_source/storyteller/synchronize/
//! sync.py::sync_book`'s top-level loop (iterate chapters, anchor, align,
//! repair, emit) and on spec.md §5's single-threaded-per-book scheduling
//! model: one book is processed sequentially here; the caller fans out
//! multiple books onto separate `tokio` tasks (see `main.rs`).

use std::path::Path;

use readalong_align::{align_chapter, interpolate_chapter, AlignState, ChapterLocator, SyncCache};
use readalong_foundation::config::EngineConfig;
use readalong_foundation::error::Diagnostic;
use readalong_foundation::progress::{ProgressEvent, ProgressSink};
use readalong_package::{assemble_package, ChapterOutput};
use readalong_text::TextBook;
use readalong_transcript::{load_transcript, ConcatTranscript, Track};
use tracing::info;

use crate::layout::BookLayout;

pub fn run_book(
    layout: &BookLayout,
    config: &EngineConfig,
    force_rescan: bool,
    progress: &mut dyn ProgressSink,
) -> anyhow::Result<()> {
    let mut book = TextBook::load(&layout.text_dir())?;
    let mut diagnostics = Vec::new();
    book.tag_all(&mut diagnostics);
    for d in diagnostics.drain(..) {
        progress.report(ProgressEvent::Diagnostic(d));
    }

    let durations = layout.track_durations()?;
    let mut pairs = Vec::new();
    for (stem, transcript_path, audio_path) in layout.tracks()? {
        let audio_file_name = audio_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&stem)
            .to_string();
        let duration = *durations.get(&stem).ok_or_else(|| {
            anyhow::anyhow!("track `{stem}` has no known duration in audio/tracks.json")
        })?;
        let transcript = load_transcript(&audio_file_name, &transcript_path)?;
        pairs.push((
            Track {
                id: audio_file_name.clone(),
                duration,
            },
            transcript,
        ));
    }
    let concat = ConcatTranscript::build(pairs)?;

    let cache_path = layout.cache_path();
    let mut cache = if force_rescan {
        SyncCache::default()
    } else {
        SyncCache::load(&cache_path)
    };
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut locator = ChapterLocator::new(&concat, &mut cache, config);

    let mut state = AlignState::default();
    let total = book.chapters.len();

    for (chapter_index, chapter) in book.chapters.iter().enumerate() {
        let anchor = locator.anchor_chapter(chapter_index, chapter);
        match anchor.transcript_offset {
            Some(offset) => {
                info!(
                    chapter_index,
                    path = %chapter.path.display(),
                    "Syncing chapter #{chapter_index} ({})",
                    chapter.path.display()
                );
                let sentences = chapter.addressable_sentences();
                let slice: Vec<_> = sentences
                    .into_iter()
                    .skip(anchor.start_sentence as usize)
                    .cloned()
                    .collect();
                align_chapter(&concat, config, &slice, offset, &mut state);
            }
            None => {
                info!(
                    chapter_index,
                    "Couldn't find matching transcription for chapter #{chapter_index}"
                );
                state.diagnostics.push(Diagnostic::ChapterSkipped { chapter_index });
            }
        }

        progress.report(ProgressEvent::Chapter {
            index: chapter_index,
            total,
            fraction: (chapter_index + 1) as f64 / total.max(1) as f64,
        });
    }

    for d in state.diagnostics.drain(..) {
        progress.report(ProgressEvent::Diagnostic(d));
    }

    let mut outputs = Vec::new();
    let mut total_duration = 0.0;
    for chapter in &book.chapters {
        let all_ids: Vec<u32> = chapter
            .addressable_sentences()
            .into_iter()
            .filter_map(|s| s.id)
            .collect();
        if all_ids.is_empty() {
            continue;
        }
        let id_set: std::collections::BTreeSet<u32> = all_ids.iter().copied().collect();
        let mut matched: Vec<_> = state
            .ranges
            .iter()
            .filter(|r| id_set.contains(&r.sentence_id))
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.sentence_id);
        if matched.is_empty() {
            continue;
        }

        let mut ranges = interpolate_chapter(&matched, &all_ids);
        ranges.sort_by_key(|r| r.sentence_id);
        total_duration += readalong_align::chapter_duration(&ranges);

        outputs.push(ChapterOutput {
            chapter_path: chapter.path.clone(),
            ranges,
        });
    }

    info!(total_duration = %readalong_package::format_duration(total_duration), "book synchronized");

    assemble_package(&book, &outputs, &layout.audio_dir(), &layout.output_path())?;

    Ok(())
}

pub fn book_dir_exists(layout: &BookLayout) -> bool {
    Path::new(&layout.book_dir).exists()
}
