pub mod book;
pub mod markup;
pub mod sentence;
pub mod tag;
pub mod tokenize;

pub use book::{BookMetadata, Chapter, TextBook};
pub use markup::{Element, MarkupTree, Node, NodeId};
pub use sentence::{Mark, ReconNode, Sentence, SentenceStream};
pub use tokenize::{tokenize_with_offsets, TokenPiece};
