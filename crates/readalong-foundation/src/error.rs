use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for the synchronization engine. Each component gets its
/// own focused enum below; this aggregates them for callers that just want
/// "did this book fail, and why".
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cancelled")]
    Cancelled,
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Package(PackageError::Io(err))
    }
}

/// Errors surfaced while parsing or re-serializing a text-book chapter (C1).
#[derive(Error, Debug)]
pub enum TextError {
    #[error("malformed markup in {path}: {reason}")]
    MalformedMarkup { path: PathBuf, reason: String },

    #[error("chapter {path} has no spine entry")]
    MissingSpineEntry { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced while ingesting per-track aligned transcripts (C2).
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("transcript for track {track} is missing required field `{field}`")]
    MissingField { track: String, field: &'static str },

    #[error(
        "segment {segment_index} in track {track} does not reconstruct its words: \
         expected ~{expected:?}, got ~{actual:?}"
    )]
    WordTextMismatch {
        track: String,
        segment_index: usize,
        expected: String,
        actual: String,
    },

    #[error("malformed transcript JSON for track {track}: {source}")]
    Parse {
        track: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading transcript for track {track}: {source}")]
    Io {
        track: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced during chapter anchoring / sentence alignment (C3-C6).
#[derive(Error, Debug)]
pub enum AlignError {
    #[error("track `{track}` has no known duration; required to close a cross-track range")]
    UnknownTrackDuration { track: String },

    #[error("sync cache at {path} could not be parsed, treating as empty: {reason}")]
    CacheUnreadable { path: PathBuf, reason: String },

    #[error("I/O error persisting sync cache at {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced while emitting the augmented package (C7).
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("audio track `{track}` referenced by an overlay was not found in the package")]
    MissingAudioTrack { track: String },
}

/// Non-fatal conditions recorded during processing (§7: "nothing is
/// swallowed silently"). These are reported on the progress channel rather
/// than aborting the book.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// C4 exhausted the transcript without anchoring a chapter.
    ChapterSkipped { chapter_index: usize },
    /// C5 gave up on a sentence; it may still be repaired by C6.
    SentenceUnmatched { sentence_id: u32 },
    /// C1 could not cover a block's sentences against its leaf nodes.
    TaggingDiverged { path: PathBuf, block_index: usize },
}
