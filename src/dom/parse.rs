//! Markup parsing
//!
//! Parsing is delegated to `scraper` (html5ever underneath), whose tree is then
//! copied node by node into a mutable [`Document`]. html5ever recovers from any
//! malformed input, so parsing itself cannot fail.

use crate::dom::tree::{Document, NodeData, NodeId};
use scraper::{Html, Node};

impl Document {
    /// Parses an HTML document from a string
    ///
    /// # Example
    ///
    /// ```
    /// use page_archiver::dom::{is_tag, Document};
    ///
    /// let doc = Document::parse("<html><head><title>Test</title></head></html>");
    /// let title = doc.find(doc.root(), is_tag("title")).unwrap();
    /// assert_eq!(title.text(), "Test");
    /// ```
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let mut doc = Document::new();
        let root = doc.root();

        for child in html.tree.root().children() {
            copy_subtree(&mut doc, root, child);
        }

        doc
    }

    /// Parses an HTML document from raw bytes, replacing invalid UTF-8 sequences
    pub fn parse_bytes(markup: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(markup))
    }
}

/// Copies `source` and its descendants beneath `parent`
fn copy_subtree(doc: &mut Document, parent: NodeId, source: ego_tree::NodeRef<'_, Node>) {
    let data = match source.value() {
        Node::Doctype(doctype) => NodeData::Doctype {
            name: doctype.name().to_string(),
            public_id: doctype.public_id().to_string(),
            system_id: doctype.system_id().to_string(),
        },
        Node::Element(element) => NodeData::Element {
            name: element.name().to_string(),
            attrs: element
                .attrs
                .iter()
                .map(|(name, value)| {
                    // Keep prefixes such as `xlink:` on foreign content attributes
                    let name = match &name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, name.local),
                        None => name.local.to_string(),
                    };
                    (name, value.to_string())
                })
                .collect(),
        },
        Node::Text(text) => NodeData::Text((**text).to_string()),
        Node::Comment(comment) => NodeData::Comment((**comment).to_string()),
        Node::Document | Node::Fragment => {
            for child in source.children() {
                copy_subtree(doc, parent, child);
            }
            return;
        }
        // Processing instructions have no place in an HTML document
        Node::ProcessingInstruction(_) => return,
    };

    let id = doc.create_node(data);
    doc.append_child(parent, id);

    for child in source.children() {
        copy_subtree(doc, id, child);
    }
}
