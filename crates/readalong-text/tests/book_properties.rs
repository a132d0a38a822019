//! §8 testable properties #1 (round-trip) and #2 (sentence-id monotonicity)
//! exercised against a whole book, not just a single block.

use std::fs;

use readalong_text::TextBook;
use tempfile::TempDir;

fn write_book(dir: &std::path::Path, chapters: &[&str]) {
    fs::write(
        dir.join("metadata.json"),
        r#"{"title":"A Sample Book","authors":["Jane Writer"],"cover":null}"#,
    )
    .unwrap();

    let spine: Vec<String> = (0..chapters.len())
        .map(|i| format!("chapter{i}.xhtml"))
        .collect();
    let spine_json = serde_json::json!({ "chapters": spine }).to_string();
    fs::write(dir.join("spine.json"), spine_json).unwrap();

    for (i, body) in chapters.iter().enumerate() {
        fs::write(dir.join(format!("chapter{i}.xhtml")), body).unwrap();
    }
}

#[test]
fn sentence_ids_are_monotone_and_contiguous_across_chapters() {
    let tmp = TempDir::new().unwrap();
    write_book(
        tmp.path(),
        &[
            "<html><body><p>First sentence. Second sentence.</p></body></html>",
            "<html><body><p>Third sentence.</p><p>Fourth one here.</p></body></html>",
        ],
    );

    let mut book = TextBook::load(tmp.path()).unwrap();
    let mut diagnostics = Vec::new();
    book.tag_all(&mut diagnostics);
    assert!(diagnostics.is_empty());

    let mut ids = Vec::new();
    for chapter in &book.chapters {
        for s in chapter.addressable_sentences() {
            ids.push(s.id.unwrap());
        }
    }
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn serializing_a_tagged_chapter_preserves_its_text_content() {
    let tmp = TempDir::new().unwrap();
    write_book(
        tmp.path(),
        &["<html><body><p>Hello <em>world</em>, how are you?</p></body></html>"],
    );

    let mut book = TextBook::load(tmp.path()).unwrap();
    let original_text = book.chapters[0].tree.text_content(book.chapters[0].tree.root());

    let mut diagnostics = Vec::new();
    book.tag_all(&mut diagnostics);
    assert!(diagnostics.is_empty());

    let serialized = book.chapters[0].tree.serialize();
    let reparsed = readalong_text::MarkupTree::parse(&serialized).unwrap();
    assert_eq!(reparsed.text_content(reparsed.root()), original_text);
    assert!(serialized.contains(r#"id="sentence0""#));
}
