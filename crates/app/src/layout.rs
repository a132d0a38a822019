//! Book directory conventions (SPEC_FULL.md "Supplemented features").
//!
//! The original lays audio and text out under separate `assets/audio/<book>`
//! and `assets/text/<book>` trees (`storyteller/synchronize/audio.py`).
//! This CLI collapses that into one directory per book:
//!
//! ```text
//! <books-dir>/<book-id>/
//!   text/       text-book package (metadata.json, spine.json, chapters)
//!   audio/      one transcript JSON + one audio file per track, same stem
//!   cache/      sync_cache.json
//! ```
//!
//! Tracks are ordered by filename sort within `audio/`, per §6.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct BookLayout {
    pub book_dir: PathBuf,
}

impl BookLayout {
    pub fn new(books_dir: &Path, book_id: &str) -> Self {
        Self {
            book_dir: books_dir.join(book_id),
        }
    }

    pub fn text_dir(&self) -> PathBuf {
        self.book_dir.join("text")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.book_dir.join("audio")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.book_dir.join("cache").join("sync_cache.json")
    }

    pub fn output_path(&self) -> PathBuf {
        self.book_dir.join("synced.epub")
    }

    /// List tracks in the audio directory: `(track_id, transcript_path,
    /// audio_path)` triples, ordered by filename.
    pub fn tracks(&self) -> std::io::Result<Vec<(String, PathBuf, PathBuf)>> {
        let dir = self.audio_dir();
        let mut stems: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        stems.sort();

        let mut tracks = Vec::with_capacity(stems.len());
        for stem in stems {
            let transcript_path = dir.join(format!("{stem}.json"));
            let audio_path = find_audio_file(&dir, &stem)?;
            tracks.push((stem, transcript_path, audio_path));
        }
        Ok(tracks)
    }

    /// Per-track total duration in seconds, read from `audio/tracks.json`
    /// (`{ "<track-id>": duration_seconds }`), the track-metadata input
    /// §6 requires alongside each track's transcript.
    pub fn track_durations(&self) -> std::io::Result<BTreeMap<String, f64>> {
        let path = self.audio_dir().join("tracks.json");
        let raw = std::fs::read_to_string(path)?;
        let map: BTreeMap<String, f64> = serde_json::from_str(&raw)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        Ok(map)
    }
}

fn find_audio_file(dir: &Path, stem: &str) -> std::io::Result<PathBuf> {
    for ext in ["mp3", "m4b", "m4a", "wav", "ogg"] {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Ok(dir.join(format!("{stem}.mp3")))
}
