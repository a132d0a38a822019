//! The marking pass (§4.1): walk a block element's leaves, partition them
//! sentence-by-sentence, and rewrite the block's children as
//! `<span id="sentence{id}">` wrappers (offset sentences stay raw).
//!
//! The walk is a merge of two partitions of the *same* concatenated text:
//! the block's leaves (in document order, each carrying its active mark
//! stack) and the tokenizer's sentence/offset pieces. Both partitions cover
//! the identical character sequence, so a two-cursor merge either consumes
//! both exactly or reveals a divergence — which aborts tagging for that
//! block only (§4.1 failure mode).

use crate::markup::{Element, MarkupTree, Node, NodeId};
use crate::sentence::{Mark, ReconNode, Sentence};
use crate::tokenize::{tokenize_with_offsets, TokenPiece};

/// The tree could not be covered by the tokenizer's output; the caller
/// leaves the block untouched and records a diagnostic.
#[derive(Debug)]
pub struct TaggingDiverged;

enum FlatLeaf {
    Text { text: String, marks: Vec<Mark> },
    Void {
        tag: String,
        attrs: Vec<(String, String)>,
        marks: Vec<Mark>,
    },
}

fn flatten_block(tree: &MarkupTree, block: NodeId) -> Vec<FlatLeaf> {
    let mut out = Vec::new();
    let mut marks = Vec::new();
    for &child in tree.children(block) {
        flatten_node(tree, child, &mut marks, &mut out);
    }
    out
}

fn flatten_node(tree: &MarkupTree, id: NodeId, marks: &mut Vec<Mark>, out: &mut Vec<FlatLeaf>) {
    match tree.node(id) {
        Node::Text(t) => {
            if !t.is_empty() {
                out.push(FlatLeaf::Text {
                    text: t.clone(),
                    marks: marks.clone(),
                });
            }
        }
        Node::Comment(_) => {}
        Node::Element(e) => {
            if e.children.is_empty() {
                out.push(FlatLeaf::Void {
                    tag: e.tag.clone(),
                    attrs: e.attrs.clone(),
                    marks: marks.clone(),
                });
            } else {
                marks.push(Mark {
                    tag: e.tag.clone(),
                    attrs: e.attrs.clone(),
                });
                for &child in &e.children {
                    flatten_node(tree, child, marks, out);
                }
                marks.pop();
            }
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn char_slice(s: &str, start: usize, len: usize) -> String {
    s.chars().skip(start).take(len).collect()
}

fn piece_text(piece: &TokenPiece) -> &str {
    match piece {
        TokenPiece::Sentence(s) | TokenPiece::Offset(s) => s.as_str(),
    }
}

/// Merge the leaf partition and the tokenizer partition into one
/// `ReconNode` list per piece. Both partitions must cover the same
/// characters in the same order, or this returns `TaggingDiverged`.
fn partition(
    leaves: &[FlatLeaf],
    pieces: &[TokenPiece],
) -> Result<Vec<Vec<ReconNode>>, TaggingDiverged> {
    let mut results: Vec<Vec<ReconNode>> = pieces.iter().map(|_| Vec::new()).collect();
    let mut leaf_idx = 0usize;
    let mut leaf_offset = 0usize;
    let mut piece_idx = 0usize;
    let mut piece_offset = 0usize;

    while leaf_idx < leaves.len() {
        match &leaves[leaf_idx] {
            FlatLeaf::Void { tag, attrs, marks } => {
                if leaf_offset != 0 {
                    return Err(TaggingDiverged);
                }
                if piece_idx >= pieces.len() {
                    return Err(TaggingDiverged);
                }
                results[piece_idx].push(ReconNode::VoidNode {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                    marks: marks.clone(),
                });
                leaf_idx += 1;
            }
            FlatLeaf::Text { text, marks } => {
                let leaf_len = char_len(text);
                if leaf_offset >= leaf_len {
                    leaf_idx += 1;
                    leaf_offset = 0;
                    continue;
                }
                if piece_idx >= pieces.len() {
                    return Err(TaggingDiverged);
                }
                let piece_len = char_len(piece_text(&pieces[piece_idx]));
                if piece_offset >= piece_len {
                    piece_idx += 1;
                    piece_offset = 0;
                    continue;
                }
                let take = (leaf_len - leaf_offset).min(piece_len - piece_offset);
                if take == 0 {
                    return Err(TaggingDiverged);
                }
                let sub = char_slice(text, leaf_offset, take);
                results[piece_idx].push(ReconNode::TextNode {
                    text: sub,
                    marks: marks.clone(),
                });
                leaf_offset += take;
                piece_offset += take;
            }
        }
    }

    while piece_idx < pieces.len() {
        let piece_len = char_len(piece_text(&pieces[piece_idx]));
        if piece_offset < piece_len {
            return Err(TaggingDiverged);
        }
        piece_idx += 1;
        piece_offset = 0;
    }

    Ok(results)
}

/// Rebuild one reconstructed node (with its mark stack) as tree nodes,
/// innermost content wrapped by marks from innermost to outermost.
fn build_node(tree: &mut MarkupTree, recon: &ReconNode) -> NodeId {
    let (mut current, marks) = match recon {
        ReconNode::TextNode { text, marks } => (tree.alloc(Node::Text(text.clone())), marks),
        ReconNode::VoidNode { tag, attrs, marks } => (
            tree.alloc(Node::Element(Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: vec![],
            })),
            marks,
        ),
    };
    for mark in marks.iter().rev() {
        let wrapper = tree.alloc(Node::Element(Element {
            tag: mark.tag.clone(),
            attrs: mark.attrs.clone(),
            children: vec![],
        }));
        tree.set_children(wrapper, vec![current]);
        current = wrapper;
    }
    current
}

/// Tag one block element: tokenize its concatenated text, partition its
/// leaves against the tokenization, and rewrite its children as sentence
/// spans interleaved with raw offset fragments. `next_id` is the running
/// chapter-wide sentence-id counter; it is advanced only on success.
pub fn tag_block(
    tree: &mut MarkupTree,
    block: NodeId,
    next_id: &mut u32,
) -> Result<Vec<Sentence>, TaggingDiverged> {
    let leaves = flatten_block(tree, block);
    let concatenated: String = leaves
        .iter()
        .map(|l| match l {
            FlatLeaf::Text { text, .. } => text.as_str(),
            FlatLeaf::Void { .. } => "",
        })
        .collect();
    let pieces = tokenize_with_offsets(&concatenated);
    let node_lists = partition(&leaves, &pieces)?;

    let mut sentences = Vec::with_capacity(pieces.len());
    let mut new_children = Vec::new();

    for (piece, nodes) in pieces.into_iter().zip(node_lists.into_iter()) {
        let built: Vec<NodeId> = nodes.iter().map(|n| build_node(tree, n)).collect();
        match piece {
            TokenPiece::Sentence(text) => {
                let id = *next_id;
                *next_id += 1;
                let span = tree.alloc(Node::Element(Element {
                    tag: "span".to_string(),
                    attrs: vec![("id".to_string(), format!("sentence{id}"))],
                    children: vec![],
                }));
                tree.set_children(span, built);
                new_children.push(span);
                sentences.push(Sentence {
                    id: Some(id),
                    text,
                    nodes,
                    block,
                });
            }
            TokenPiece::Offset(text) => {
                new_children.extend(built.iter().copied());
                sentences.push(Sentence {
                    id: None,
                    text,
                    nodes,
                    block,
                });
            }
        }
    }

    tree.set_children(block, new_children);
    Ok(sentences)
}
