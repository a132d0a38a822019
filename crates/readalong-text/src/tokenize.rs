//! Sentence tokenization with offsets (§4.1).
//!
//! `unicode-segmentation`'s sentence-boundary algorithm already partitions
//! a string into contiguous, gapless pieces — concatenating them
//! reproduces the input exactly. We classify each piece as a regular
//! sentence (non-whitespace content, trimmed) or an offset (the
//! whitespace/punctuation gap around it), which gives the same guarantee
//! spec.md describes via a find()-based algorithm without needing one.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenPiece {
    /// A regular sentence; ids are assigned by the caller in order.
    Sentence(String),
    /// Inter-sentence whitespace/punctuation, carries no id.
    Offset(String),
}

/// Tokenize `text` into sentences and the offset gaps between them.
/// Invariant: concatenating every piece's text reproduces `text` exactly.
pub fn tokenize_with_offsets(text: &str) -> Vec<TokenPiece> {
    let mut pieces = Vec::new();
    for raw in text.split_sentence_bounds() {
        if raw.is_empty() {
            continue;
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            pieces.push(TokenPiece::Offset(raw.to_string()));
            continue;
        }
        let lead_len = raw.len() - raw.trim_start().len();
        let trail_len = raw.len() - raw.trim_end().len();
        if lead_len > 0 {
            pieces.push(TokenPiece::Offset(raw[..lead_len].to_string()));
        }
        pieces.push(TokenPiece::Sentence(trimmed.to_string()));
        if trail_len > 0 {
            pieces.push(TokenPiece::Offset(raw[raw.len() - trail_len..].to_string()));
        }
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(pieces: &[TokenPiece]) -> String {
        pieces
            .iter()
            .map(|p| match p {
                TokenPiece::Sentence(s) => s.as_str(),
                TokenPiece::Offset(s) => s.as_str(),
            })
            .collect()
    }

    #[test]
    fn reproduces_the_input_exactly() {
        let text = "  Hello there. How are you?\n\nFine, thanks.  ";
        let pieces = tokenize_with_offsets(text);
        assert_eq!(reassemble(&pieces), text);
    }

    #[test]
    fn offset_sentences_carry_no_id_candidates() {
        let text = "One. Two.";
        let pieces = tokenize_with_offsets(text);
        let sentences: Vec<&str> = pieces
            .iter()
            .filter_map(|p| match p {
                TokenPiece::Sentence(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sentences, vec!["One.", "Two."]);
    }

    #[test]
    fn pure_whitespace_input_is_a_single_offset() {
        let pieces = tokenize_with_offsets("   ");
        assert!(matches!(pieces.as_slice(), [TokenPiece::Offset(s)] if s == "   "));
    }
}
