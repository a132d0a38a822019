//! Sentence-level data model (§3): `Sentence`, its inline-markup
//! reconstruction nodes, and the `SentenceStream` produced per chapter.

use crate::markup::NodeId;

/// An inline wrapping element active over a text fragment (e.g. `<em>`),
/// recorded as tag + attributes so sentence wrapping can be inserted
/// without flattening the original formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

/// A piece of a sentence's reconstructed inline markup.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconNode {
    TextNode { text: String, marks: Vec<Mark> },
    VoidNode {
        tag: String,
        attrs: Vec<(String, String)>,
        marks: Vec<Mark>,
    },
}

/// One sentence (or inter-sentence whitespace offset) within a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// `None` for offset (whitespace) sentences, which carry no id and are
    /// never aligned.
    pub id: Option<u32>,
    pub text: String,
    pub nodes: Vec<ReconNode>,
    /// The block element this sentence belongs to, for the tagging pass.
    pub block: NodeId,
}

impl Sentence {
    pub fn is_offset(&self) -> bool {
        self.id.is_none()
    }
}

/// Ordered sentences for one chapter, including offset sentences, in
/// reading order across all block elements.
#[derive(Debug, Clone, Default)]
pub struct SentenceStream {
    pub sentences: Vec<Sentence>,
}

impl SentenceStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sentences that carry an id, in order — what C3-C6 align against.
    pub fn addressable(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter().filter(|s| !s.is_offset())
    }

    pub fn by_id(&self, id: u32) -> Option<&Sentence> {
        self.addressable().find(|s| s.id == Some(id))
    }

    pub fn len_addressable(&self) -> usize {
        self.addressable().count()
    }
}
