//! HTML serialization
//!
//! Emits the tree exactly as it stands: tag, attribute and child order are kept,
//! attribute values are always double-quoted, and text is escaped unless it sits
//! inside a raw text element such as `<style>` or `<script>`.

use crate::dom::tree::{Document, NodeData, NodeRef};
use std::io::{self, Write};

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

impl Document {
    /// Serializes the document to a byte sink
    pub fn render<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        if self.is_void() {
            return Ok(());
        }
        render_node(self.node(self.root()), sink)
    }

    /// Serializes the document to a string
    pub fn to_html(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

fn render_node<W: Write>(node: NodeRef<'_>, sink: &mut W) -> io::Result<()> {
    match node.data() {
        NodeData::Document => render_children(node, sink),
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            write!(sink, "<!DOCTYPE {}", name)?;
            if !public_id.is_empty() {
                write!(sink, " PUBLIC \"{}\"", public_id)?;
                if !system_id.is_empty() {
                    write!(sink, " \"{}\"", system_id)?;
                }
            } else if !system_id.is_empty() {
                write!(sink, " SYSTEM \"{}\"", system_id)?;
            }
            sink.write_all(b">")
        }
        NodeData::Comment(comment) => write!(sink, "<!--{}-->", comment),
        NodeData::Text(text) => {
            let raw = node
                .parent()
                .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.tag()));
            if raw {
                sink.write_all(text.as_bytes())
            } else {
                sink.write_all(escape_text(text).as_bytes())
            }
        }
        NodeData::Element { name, attrs } => {
            write!(sink, "<{}", name)?;
            for (key, value) in attrs {
                write!(sink, " {}=\"{}\"", key, escape_attribute(value))?;
            }
            sink.write_all(b">")?;

            if VOID_ELEMENTS.contains(&name.as_str()) {
                return Ok(());
            }

            render_children(node, sink)?;
            write!(sink, "</{}>", name)
        }
    }
}

fn render_children<W: Write>(node: NodeRef<'_>, sink: &mut W) -> io::Result<()> {
    for child in node.children() {
        render_node(child, sink)?;
    }
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
