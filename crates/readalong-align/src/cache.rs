//! Persisted chapter anchors (§3 `SyncCache`, §6 "Persisted state").
//!
//! Consulted first on reruns, rewritten atomically after each chapter is
//! anchored. Legacy entries (a bare integer, from before `start_sentence`
//! existed) are read as `{start_sentence: 0, transcription_offset: N}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use readalong_foundation::error::AlignError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// `{chapter_index, start_sentence_in_chapter, transcript_offset}`.
/// `transcript_offset = None` means the chapter was deliberately skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChapterAnchor {
    pub start_sentence: u32,
    #[serde(rename = "transcription_offset")]
    pub transcript_offset: Option<usize>,
}

impl<'de> Deserialize<'de> for ChapterAnchor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Legacy(i64),
            Full {
                #[serde(default)]
                start_sentence: u32,
                transcription_offset: Option<usize>,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Legacy(offset) => {
                let transcript_offset = if offset < 0 {
                    None
                } else {
                    Some(offset as usize)
                };
                Ok(ChapterAnchor {
                    start_sentence: 0,
                    transcript_offset,
                })
            }
            Repr::Full {
                start_sentence,
                transcription_offset,
            } => Ok(ChapterAnchor {
                start_sentence,
                transcript_offset: transcription_offset,
            }),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDoc {
    #[serde(default, rename = "chapter_index")]
    chapter_index: BTreeMap<String, ChapterAnchor>,
}

/// A book's persisted chapter-anchor cache.
#[derive(Debug, Default)]
pub struct SyncCache {
    path: PathBuf,
    entries: BTreeMap<usize, ChapterAnchor>,
}

impl SyncCache {
    /// Load the cache at `path`. A missing or unparseable file is treated
    /// as empty (§7: "Cache read/parse failure ... processing restarts
    /// from the first chapter"), not a fatal error.
    pub fn load(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<CacheDoc>(&raw).ok())
            .map(|doc| {
                doc.chapter_index
                    .into_iter()
                    .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn get(&self, chapter_index: usize) -> Option<ChapterAnchor> {
        self.entries.get(&chapter_index).copied()
    }

    /// Record a chapter's anchor and persist the whole cache atomically
    /// (write to a temp file, then rename over the real path).
    pub fn record(&mut self, chapter_index: usize, anchor: ChapterAnchor) -> Result<(), AlignError> {
        self.entries.insert(chapter_index, anchor);
        self.persist()
    }

    fn persist(&self) -> Result<(), AlignError> {
        let doc = CacheDoc {
            chapter_index: self
                .entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        };
        let serialized = serde_json::to_string_pretty(&doc).expect("cache doc always serializes");
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).map_err(|source| AlignError::CacheIo {
            path: self.path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| AlignError::CacheIo {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn legacy_bare_integer_entries_are_read_as_start_sentence_zero() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        fs::write(&path, r#"{"chapter_index":{"0": 4821, "1": -1}}"#).unwrap();
        let cache = SyncCache::load(&path);
        assert_eq!(
            cache.get(0),
            Some(ChapterAnchor {
                start_sentence: 0,
                transcript_offset: Some(4821)
            })
        );
        assert_eq!(
            cache.get(1),
            Some(ChapterAnchor {
                start_sentence: 0,
                transcript_offset: None
            })
        );
    }

    #[test]
    fn full_object_entries_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        let mut cache = SyncCache::load(&path);
        cache
            .record(
                2,
                ChapterAnchor {
                    start_sentence: 3,
                    transcript_offset: Some(900),
                },
            )
            .unwrap();

        let reloaded = SyncCache::load(&path);
        assert_eq!(
            reloaded.get(2),
            Some(ChapterAnchor {
                start_sentence: 3,
                transcript_offset: Some(900)
            })
        );
    }

    #[test]
    fn unreadable_cache_is_treated_as_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("does-not-exist.json");
        let cache = SyncCache::load(&path);
        assert_eq!(cache.get(0), None);
    }
}
