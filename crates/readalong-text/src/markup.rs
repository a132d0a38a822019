//! Arena-backed markup tree (§9 Design Notes: "represent the tree as
//! arena-allocated nodes with child/next/parent indices rather than owning
//! pointers"). Parsing and serialization both go through `quick-xml`, the
//! way `boko` (an EPUB/Kindle conversion library) does its XHTML handling.

use std::io::Cursor;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use readalong_foundation::error::TextError;

pub type NodeId = usize;

/// The block-level tags whose text feeds the sentence tokenizer (§3).
pub const BLOCK_TAGS: &[&str] = &["p", "li", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// A parsed chapter document. `prolog` holds everything preceding the root
/// element (XML declaration, doctype) verbatim so it round-trips untouched.
#[derive(Clone)]
pub struct MarkupTree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
    prolog: String,
}

impl MarkupTree {
    pub fn parse(xml: &str) -> Result<Self, TextError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<Node> = Vec::new();
        let mut parents: Vec<Option<NodeId>> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut seen_root = false;
        let mut prolog_end = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Decl(_)) | Ok(Event::DocType(_)) | Ok(Event::PI(_)) if !seen_root => {
                    prolog_end = reader.buffer_position() as usize;
                }
                Ok(Event::Start(e)) => {
                    seen_root = true;
                    let id = push_element(&mut nodes, &mut parents, &stack, &e)?;
                    stack.push(id);
                    if root.is_none() {
                        root = Some(id);
                    }
                }
                Ok(Event::Empty(e)) => {
                    seen_root = true;
                    let id = push_element(&mut nodes, &mut parents, &stack, &e)?;
                    if root.is_none() {
                        root = Some(id);
                    }
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) | Ok(Event::CData(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| parse_error(err.to_string()))?
                        .into_owned();
                    if let Some(&parent) = stack.last() {
                        let id = nodes.len();
                        nodes.push(Node::Text(text));
                        parents.push(Some(parent));
                        attach_child(&mut nodes, parent, id);
                    }
                }
                Ok(Event::Comment(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| parse_error(err.to_string()))?
                        .into_owned();
                    if let Some(&parent) = stack.last() {
                        let id = nodes.len();
                        nodes.push(Node::Comment(text));
                        parents.push(Some(parent));
                        attach_child(&mut nodes, parent, id);
                    }
                }
                Ok(_) => {}
                Err(err) => return Err(parse_error(err.to_string())),
            }
        }

        let root = root.ok_or_else(|| parse_error("document has no root element".into()))?;
        let prolog = xml[..prolog_end.min(xml.len())].to_string();
        Ok(Self {
            nodes,
            parents,
            root,
            prolog,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id]
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id] {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id] {
            Node::Element(e) => &e.children,
            _ => &[],
        }
    }

    /// Allocate a new node, returning its id. Used by the tagging pass to
    /// build sentence-span wrapper elements.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    /// Replace an element's children wholesale, fixing up the new
    /// children's parent pointers. Used only by the tagging pass, and only
    /// on block elements (§4.1: "mutates only `children` of block
    /// elements, holding a single mutable borrow at a time").
    pub fn set_children(&mut self, id: NodeId, new_children: Vec<NodeId>) {
        for &child in &new_children {
            self.parents[child] = Some(id);
        }
        if let Node::Element(e) = &mut self.nodes[id] {
            e.children = new_children;
        }
    }

    /// All elements matching `BLOCK_TAGS`, in document order.
    pub fn find_blocks(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(self.root, &mut |id, el| {
            if BLOCK_TAGS.contains(&el.tag.as_str()) {
                out.push(id);
            }
        });
        out
    }

    /// First element with the given tag name, searched in document order.
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk_elements(self.root, &mut |id, el| {
            if found.is_none() && el.tag == tag {
                found = Some(id);
            }
        });
        found
    }

    fn walk_elements(&self, id: NodeId, f: &mut impl FnMut(NodeId, &Element)) {
        if let Node::Element(el) = &self.nodes[id] {
            f(id, el);
            for &child in &el.children {
                self.walk_elements(child, f);
            }
        }
    }

    /// Concatenation of every descendant text leaf's content, in document
    /// order — the "concatenated text" a block element contributes to the
    /// sentence tokenizer (§4.1).
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id] {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                for &child in &e.children {
                    self.collect_text(child, out);
                }
            }
            Node::Comment(_) => {}
        }
    }

    /// Insert a `<link rel="stylesheet">` as the last child of `<head>`, if
    /// present (§4.7).
    pub fn add_stylesheet_link(&mut self, href: &str) {
        let Some(head) = self.find_first("head") else {
            return;
        };
        let link = self.alloc(Node::Element(Element {
            tag: "link".to_string(),
            attrs: vec![
                ("rel".to_string(), "stylesheet".to_string()),
                ("type".to_string(), "text/css".to_string()),
                ("href".to_string(), href.to_string()),
            ],
            children: vec![],
        }));
        let mut children = self.children(head).to_vec();
        children.push(link);
        self.set_children(head, children);
    }

    pub fn serialize(&self) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_node(&mut writer, self.root);
        let body = writer.into_inner().into_inner();
        format!("{}{}", self.prolog, String::from_utf8_lossy(&body))
    }

    fn write_node(&self, writer: &mut Writer<Cursor<Vec<u8>>>, id: NodeId) {
        match &self.nodes[id] {
            Node::Text(t) => {
                let _ = writer.write_event(Event::Text(BytesText::new(t)));
            }
            Node::Comment(c) => {
                let _ = writer.write_event(Event::Comment(quick_xml::events::BytesText::new(c)));
            }
            Node::Element(e) => {
                if e.children.is_empty() {
                    let mut start = BytesStart::new(e.tag.clone());
                    for (k, v) in &e.attrs {
                        start.push_attribute((k.as_str(), v.as_str()));
                    }
                    let _ = writer.write_event(Event::Empty(start));
                } else {
                    let mut start = BytesStart::new(e.tag.clone());
                    for (k, v) in &e.attrs {
                        start.push_attribute((k.as_str(), v.as_str()));
                    }
                    let _ = writer.write_event(Event::Start(start));
                    for &child in &e.children {
                        self.write_node(writer, child);
                    }
                    let _ = writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
                        e.tag.clone(),
                    )));
                }
            }
        }
    }
}

fn attach_child(nodes: &mut [Node], parent: NodeId, child: NodeId) {
    if let Node::Element(e) = &mut nodes[parent] {
        e.children.push(child);
    }
}

fn push_element(
    nodes: &mut Vec<Node>,
    parents: &mut Vec<Option<NodeId>>,
    stack: &[NodeId],
    e: &BytesStart,
) -> Result<NodeId, TextError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| parse_error(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_error(err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    let id = nodes.len();
    nodes.push(Node::Element(Element {
        tag,
        attrs,
        children: vec![],
    }));
    parents.push(stack.last().copied());
    if let Some(&parent) = stack.last() {
        attach_child(nodes, parent, id);
    }
    Ok(id)
}

fn parse_error(reason: String) -> TextError {
    TextError::MalformedMarkup {
        path: std::path::PathBuf::new(),
        reason,
    }
}
