use std::fs;
use std::io::Read;

use readalong_align::SentenceRange;
use readalong_package::{assemble_package, ChapterOutput};
use readalong_text::TextBook;

fn write_book(dir: &std::path::Path) {
    fs::write(
        dir.join("metadata.json"),
        r#"{"title": "Test Book", "authors": ["Ann Author"]}"#,
    )
    .unwrap();
    fs::write(dir.join("spine.json"), r#"{"chapters": ["chapter1.xhtml"]}"#).unwrap();
    fs::write(
        dir.join("chapter1.xhtml"),
        "<html><head></head><body><p>Hello world.</p></body></html>",
    )
    .unwrap();
}

#[test]
fn assembled_package_contains_stylesheet_overlay_and_audio() {
    let dir = tempfile::tempdir().unwrap();
    write_book(dir.path());
    let mut book = TextBook::load(dir.path()).unwrap();
    let mut diagnostics = Vec::new();
    book.tag_all(&mut diagnostics);

    let audio_dir = tempfile::tempdir().unwrap();
    fs::write(audio_dir.path().join("ch1.mp3"), b"fake audio bytes").unwrap();

    let outputs = vec![ChapterOutput {
        chapter_path: std::path::PathBuf::from("chapter1.xhtml"),
        ranges: vec![SentenceRange { sentence_id: 0, start_time: 0.0, end_time: 1.0, track: "ch1.mp3".into() }],
    }];

    let out_path = dir.path().join("out.zip");
    assemble_package(&book, &outputs, audio_dir.path(), &out_path).unwrap();

    let file = fs::File::open(&out_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();

    assert!(names.contains(&"Styles/media-overlay.css".to_string()));
    assert!(names.contains(&"Text/chapter1.xhtml".to_string()));
    assert!(names.contains(&"MediaOverlays/chapter1.smil".to_string()));
    assert!(names.contains(&"Audio/ch1.mp3".to_string()));

    let mut text = String::new();
    archive
        .by_name("Text/chapter1.xhtml")
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert!(text.contains("media-overlay.css"));
    assert!(text.contains("sentence0"));
}

#[test]
fn a_chapter_spanning_two_tracks_writes_and_references_both_audio_files() {
    let dir = tempfile::tempdir().unwrap();
    write_book(dir.path());
    let mut book = TextBook::load(dir.path()).unwrap();
    let mut diagnostics = Vec::new();
    book.tag_all(&mut diagnostics);

    let audio_dir = tempfile::tempdir().unwrap();
    fs::write(audio_dir.path().join("a.mp3"), b"track a bytes").unwrap();
    fs::write(audio_dir.path().join("b.mp3"), b"track b bytes").unwrap();

    let outputs = vec![ChapterOutput {
        chapter_path: std::path::PathBuf::from("chapter1.xhtml"),
        ranges: vec![
            SentenceRange { sentence_id: 0, start_time: 25.0, end_time: 30.0, track: "a.mp3".into() },
            SentenceRange { sentence_id: 1, start_time: 0.0, end_time: 2.0, track: "b.mp3".into() },
        ],
    }];

    let out_path = dir.path().join("out.zip");
    assemble_package(&book, &outputs, audio_dir.path(), &out_path).unwrap();

    let file = fs::File::open(&out_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"Audio/a.mp3".to_string()));
    assert!(names.contains(&"Audio/b.mp3".to_string()));

    let mut overlay = String::new();
    archive
        .by_name("MediaOverlays/chapter1.smil")
        .unwrap()
        .read_to_string(&mut overlay)
        .unwrap();
    assert!(overlay.contains(r#"src="../Audio/a.mp3""#));
    assert!(overlay.contains(r#"src="../Audio/b.mp3""#));
}
