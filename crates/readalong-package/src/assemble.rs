//! Package assembly (C7, §4.7, §6): rewrite each chapter with a
//! stylesheet link, build a media overlay document per chapter that
//! anchored one, and zip the result together with the original audio
//! tracks.
//!
//! Grounded on `examples/original_source/storyteller/synchronize/
//! epub.py::sync_epub` (the top-level "stamp the book" driver) for the
//! overall shape: rewrite text, write overlays, repackage. Zip writing
//! itself follows the standard `zip::write::ZipWriter` builder pattern
//! (start_file/write_all/finish); the pack's only zip usage
//! (`examples/Trissilein-Trispr_Flow/src-tauri/src/ollama_runtime.rs`)
//! only reads archives, so the write side is the crate's documented API
//! used directly rather than adapted from another example.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use readalong_align::SentenceRange;
use readalong_foundation::error::PackageError;
use readalong_text::TextBook;
use tracing::info;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::duration::format_duration;
use crate::media_overlay::build_media_overlay;

/// The CSS rule that highlights the sentence the overlay is currently
/// playing (SPEC_FULL.md's supplemented stylesheet requirement).
pub const MEDIA_OVERLAY_STYLESHEET: &str =
    ".-epub-media-overlay-active { background-color: #ffb; }\n";

pub const MEDIA_OVERLAY_ACTIVE_CLASS: &str = "-epub-media-overlay-active";

/// One chapter's worth of aligned output, keyed by the chapter's path
/// (matching `Chapter::path`) so the assembler can find its text and
/// ranges. A chapter's backing audio files are derived from its ranges'
/// own `track` fields (a chapter may reference more than one, per §6's
/// cross-track-boundary scenario).
pub struct ChapterOutput {
    pub chapter_path: std::path::PathBuf,
    pub ranges: Vec<SentenceRange>,
}

/// Assemble the augmented package at `out_path`: every chapter's markup
/// (stylesheet link added), a media overlay per chapter that has ranges,
/// a shared stylesheet, and the audio files themselves read from
/// `audio_dir`.
pub fn assemble_package(
    book: &TextBook,
    outputs: &[ChapterOutput],
    audio_dir: &Path,
    out_path: &Path,
) -> Result<(), PackageError> {
    let file = File::create(out_path)?;
    let mut zip = ZipWriter::new(file);
    fn options() -> FileOptions {
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated)
    }

    let by_path: BTreeMap<&Path, &ChapterOutput> =
        outputs.iter().map(|o| (o.chapter_path.as_path(), o)).collect();

    zip.start_file("Styles/media-overlay.css", options())?;
    zip.write_all(MEDIA_OVERLAY_STYLESHEET.as_bytes())?;

    let mut total_duration = 0.0;
    let mut audio_written = std::collections::BTreeSet::new();

    for chapter in &book.chapters {
        let mut tree = chapter.tree.clone();
        tree.add_stylesheet_link("../Styles/media-overlay.css");
        let xml = tree.serialize();
        let text_entry = format!("Text/{}", chapter.path.display());
        zip.start_file(&text_entry, options())?;
        zip.write_all(xml.as_bytes())?;

        if let Some(output) = by_path.get(chapter.path.as_path()) {
            if output.ranges.is_empty() {
                continue;
            }
            let overlay_id = chapter
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("chapter")
                .to_string();
            let chapter_href = format!("../{text_entry}");
            let overlay_xml = build_media_overlay(&overlay_id, &chapter_href, "../Audio", &output.ranges);

            let overlay_entry = format!("MediaOverlays/{overlay_id}.smil");
            zip.start_file(&overlay_entry, options())?;
            zip.write_all(overlay_xml.as_bytes())?;

            total_duration += readalong_align::chapter_duration(&output.ranges);

            for track in output.ranges.iter().map(|r| &r.track) {
                if audio_written.insert(track.clone()) {
                    let audio_src = audio_dir.join(track);
                    let bytes = std::fs::read(&audio_src)?;
                    zip.start_file(format!("Audio/{track}"), options())?;
                    zip.write_all(&bytes)?;
                }
            }
        }
    }

    info!(total = %format_duration(total_duration), "package assembled");
    zip.finish()?;
    Ok(())
}
