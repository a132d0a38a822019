//! Text-book package model (§3, §6): a `TextBook` owns its `Chapter`s in
//! spine order; each `Chapter` owns a `MarkupTree` and, once tagged, a
//! `SentenceStream`.
//!
//! On-disk layout is intentionally minimal (the full package format is out
//! of scope, §1): a book directory holds `metadata.json` (title, authors,
//! optional cover path) and `spine.json` (an ordered list of chapter file
//! paths, relative to the directory), each referencing a well-formed XHTML
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use readalong_foundation::error::{Diagnostic, TextError};
use serde::Deserialize;
use tracing::warn;

use crate::markup::MarkupTree;
use crate::sentence::{Sentence, SentenceStream};
use crate::tag::tag_block;

#[derive(Debug, Clone, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Spine {
    chapters: Vec<PathBuf>,
}

pub struct Chapter {
    /// Path relative to the book directory; the stable identifier callers
    /// use to cross-reference media overlays and the sync cache.
    pub path: PathBuf,
    pub tree: MarkupTree,
    pub sentences: SentenceStream,
}

pub struct TextBook {
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
}

impl TextBook {
    /// Parse every chapter document named by the book directory's spine.
    /// Chapters are not yet tagged; call [`TextBook::tag_all`] for that.
    pub fn load(dir: &Path) -> Result<Self, TextError> {
        let metadata_path = dir.join("metadata.json");
        let metadata_json =
            fs::read_to_string(&metadata_path).map_err(|source| TextError::Io {
                path: metadata_path.clone(),
                source,
            })?;
        let metadata: BookMetadata = serde_json::from_str(&metadata_json).map_err(|err| {
            TextError::MalformedMarkup {
                path: metadata_path,
                reason: err.to_string(),
            }
        })?;

        let spine_path = dir.join("spine.json");
        let spine_json = fs::read_to_string(&spine_path).map_err(|source| TextError::Io {
            path: spine_path.clone(),
            source,
        })?;
        let spine: Spine = serde_json::from_str(&spine_json).map_err(|err| {
            TextError::MalformedMarkup {
                path: spine_path,
                reason: err.to_string(),
            }
        })?;

        let mut chapters = Vec::with_capacity(spine.chapters.len());
        for rel in spine.chapters {
            let path = dir.join(&rel);
            let xml = fs::read_to_string(&path).map_err(|source| TextError::Io {
                path: path.clone(),
                source,
            })?;
            let tree = MarkupTree::parse(&xml).map_err(|err| match err {
                TextError::MalformedMarkup { reason, .. } => TextError::MalformedMarkup {
                    path: path.clone(),
                    reason,
                },
                other => other,
            })?;
            chapters.push(Chapter {
                path: rel,
                tree,
                sentences: SentenceStream::new(),
            });
        }

        if chapters.is_empty() {
            return Err(TextError::MissingSpineEntry {
                path: spine_path_placeholder(dir),
            });
        }

        Ok(Self { metadata, chapters })
    }

    /// Tag every block in every chapter, assigning sentence ids in reading
    /// order across the whole book (a chapter's ids continue where the
    /// previous chapter's left off, per §3's "base" allocator).
    pub fn tag_all(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        let mut next_id = 0u32;
        for (chapter_index, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.tag(&mut next_id, chapter_index, diagnostics);
        }
    }
}

fn spine_path_placeholder(dir: &Path) -> PathBuf {
    dir.join("spine.json")
}

impl Chapter {
    fn tag(&mut self, next_id: &mut u32, chapter_index: usize, diagnostics: &mut Vec<Diagnostic>) {
        let blocks = self.tree.find_blocks();
        let mut sentences = Vec::new();
        for (block_index, block) in blocks.into_iter().enumerate() {
            match tag_block(&mut self.tree, block, next_id) {
                Ok(mut block_sentences) => sentences.append(&mut block_sentences),
                Err(_) => {
                    warn!(
                        chapter = %self.path.display(),
                        block_index,
                        "tagging diverged; leaving block untouched"
                    );
                    diagnostics.push(Diagnostic::TaggingDiverged {
                        path: self.path.clone(),
                        block_index,
                    });
                }
            }
        }
        let _ = chapter_index;
        self.sentences = SentenceStream { sentences };
    }

    pub fn addressable_sentences(&self) -> Vec<&Sentence> {
        self.sentences.addressable().collect()
    }
}
