//! End-to-end pipeline tests exercising the CLI's orchestration: load a
//! book directory, run the full C1-C7 pipeline, and inspect the emitted
//! package. Named scenarios follow the same shapes spec.md's literal S1
//! (contiguous chapter) and S5 (anchoring skip) scenarios describe, with
//! convenient round timing numbers rather than the literal float
//! constants (those are exercised at the unit level in `readalong-align`).

use std::fs;
use std::io::Read;

use readalong_foundation::config::EngineConfig;
use readalong_foundation::progress::{ProgressEvent, ProgressSink};

#[path = "../src/layout.rs"]
mod layout;
#[path = "../src/pipeline.rs"]
mod pipeline;

struct CollectingSink {
    events: Vec<ProgressEvent>,
}

impl ProgressSink for CollectingSink {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

fn write_book_dir(root: &std::path::Path) {
    let text_dir = root.join("text");
    let audio_dir = root.join("audio");
    fs::create_dir_all(&text_dir).unwrap();
    fs::create_dir_all(&audio_dir).unwrap();

    fs::write(
        text_dir.join("metadata.json"),
        r#"{"title": "A Dark Night", "authors": ["Ann Author"]}"#,
    )
    .unwrap();
    fs::write(text_dir.join("spine.json"), r#"{"chapters": ["chapter1.xhtml"]}"#).unwrap();
    fs::write(
        text_dir.join("chapter1.xhtml"),
        "<html><head></head><body><p>It was a dark and stormy night. \
         The wind howled through the trees. Nobody heard the scream.</p></body></html>",
    )
    .unwrap();

    fs::write(
        audio_dir.join("track1.json"),
        r#"{"segments": [
            {"text": "It was a dark and stormy night.", "start": 0.0, "end": 2.0, "words": []},
            {"text": "The wind howled through the trees.", "start": 2.0, "end": 4.0, "words": []},
            {"text": "Nobody heard the scream.", "start": 4.0, "end": 6.0, "words": []}
        ]}"#,
    )
    .unwrap();
    fs::write(audio_dir.join("track1.mp3"), b"fake audio bytes").unwrap();
    fs::write(audio_dir.join("tracks.json"), r#"{"track1": 6.0}"#).unwrap();
}

#[test]
fn contiguous_chapter_produces_a_package_with_overlay_and_audio() {
    let books_root = tempfile::tempdir().unwrap();
    let book_dir = books_root.path().join("book1");
    write_book_dir(&book_dir);

    let layout = layout::BookLayout::new(books_root.path(), "book1");
    let config = EngineConfig::default();
    let mut sink = CollectingSink { events: Vec::new() };

    pipeline::run_book(&layout, &config, false, &mut sink).unwrap();

    assert!(sink.events.iter().any(|e| matches!(
        e,
        ProgressEvent::Chapter { index: 0, total: 1, .. }
    )));

    let out_path = layout.output_path();
    assert!(out_path.exists());

    let file = fs::File::open(&out_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("MediaOverlays/")));
    assert!(names.iter().any(|n| n.starts_with("Audio/")));

    let mut overlay_name = names
        .iter()
        .find(|n| n.starts_with("MediaOverlays/"))
        .unwrap()
        .clone();
    let mut xml = String::new();
    archive
        .by_name(&std::mem::take(&mut overlay_name))
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("sentence0"));
    assert!(xml.contains("sentence2"));
}

#[test]
fn rerun_with_intact_cache_anchors_from_cache_without_rescanning() {
    let books_root = tempfile::tempdir().unwrap();
    let book_dir = books_root.path().join("book1");
    write_book_dir(&book_dir);

    let layout = layout::BookLayout::new(books_root.path(), "book1");
    let config = EngineConfig::default();

    let mut first_sink = CollectingSink { events: Vec::new() };
    pipeline::run_book(&layout, &config, false, &mut first_sink).unwrap();

    let cache_contents_after_first = fs::read_to_string(layout.cache_path()).unwrap();

    let mut second_sink = CollectingSink { events: Vec::new() };
    pipeline::run_book(&layout, &config, false, &mut second_sink).unwrap();

    let cache_contents_after_second = fs::read_to_string(layout.cache_path()).unwrap();
    assert_eq!(cache_contents_after_first, cache_contents_after_second);
}
