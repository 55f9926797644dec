//! Arena-backed document tree
//!
//! Nodes live in a single vector owned by [`Document`] and are addressed by
//! [`NodeId`]. Each node records its parent id and an ordered list of child ids,
//! so detaching a subtree only edits the parent's child list. Detached nodes stay
//! in the arena until the document is dropped.

use crate::dom::filter::Filter;
use std::fmt;

/// Identifier of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload carried by a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root
    Document,

    /// `<!DOCTYPE ...>` declaration
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },

    /// An element with its attributes in source order
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },

    /// Literal text content
    Text(String),

    /// `<!-- ... -->`
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A parsed markup document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    void: bool,
}

impl Document {
    /// Creates an empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
            void: false,
        }
    }

    /// Returns the id of the root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a read handle for the given node
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    /// Returns true once a removal query has matched the root node
    ///
    /// The root cannot be detached from anything, so matching it only marks the
    /// document as void. A void document renders to nothing.
    pub fn is_void(&self) -> bool {
        self.void
    }

    /// Allocates a detached node
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocates a detached element, optionally holding a single text child
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
        let element = self.create_node(NodeData::Element {
            name: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });

        if !text.is_empty() {
            let text = self.create_node(NodeData::Text(text.to_string()));
            self.append_child(element, text);
        }

        element
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "appending a node beneath itself would create a cycle"
        );

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Removes a node (and with it its subtree) from its parent's child list
    ///
    /// Detaching a node without a parent is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    /// Sets an attribute on an element
    ///
    /// Names stay unique: an existing entry is overwritten in place, otherwise the
    /// attribute is appended. Non-element nodes are left untouched.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            match attrs.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Removes every attribute entry with the given name
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(|(key, _)| key != name);
        }
    }

    /// Returns the first node at or below `from` (pre-order) matching the filter
    pub fn find<F: Filter>(&self, from: NodeId, filter: F) -> Option<NodeRef<'_>> {
        self.node(from).descendants().find(|node| filter.eval(*node))
    }

    /// Lazily yields every node at or below `from` matching the filter,
    /// depth-first in pre-order, including `from` itself
    pub fn find_all<'a, F: Filter + 'a>(
        &'a self,
        from: NodeId,
        filter: F,
    ) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.node(from)
            .descendants()
            .filter(move |node| filter.eval(*node))
    }

    /// Detaches the subtree of every node matching the filter
    ///
    /// Returns the number of matched nodes. Matches nested inside an earlier match
    /// are counted but leave the tree unchanged, their ancestor is already gone.
    pub fn remove_all<F: Filter>(&mut self, from: NodeId, filter: F) -> usize {
        let matches: Vec<NodeId> = self
            .node(from)
            .descendants()
            .filter(|node| filter.eval(*node))
            .map(|node| node.id())
            .collect();

        for id in &matches {
            if *id == self.root {
                self.void = true;
            } else {
                self.detach(*id);
            }
        }

        matches.len()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed read handle for a single node
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// Returns the node's id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's payload
    pub fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0].data
    }

    /// Returns the tag name, empty for anything but elements
    pub fn tag(&self) -> &'a str {
        match self.data() {
            NodeData::Element { name, .. } => name,
            _ => "",
        }
    }

    /// Returns the text content of a text leaf, or for an element the content of
    /// its leading text child. Empty otherwise.
    pub fn text(&self) -> &'a str {
        match self.data() {
            NodeData::Text(text) => text,
            NodeData::Element { .. } => match self.children().next().map(|child| child.data()) {
                Some(NodeData::Text(text)) => text,
                _ => "",
            },
            _ => "",
        }
    }

    /// Returns the value of the first attribute with the given name
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns all attributes in order, empty for non-elements
    pub fn attrs(&self) -> &'a [(String, String)] {
        match self.data() {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Returns the parent node, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc.nodes[self.id.0]
            .parent
            .map(|id| self.doc.node(id))
    }

    /// Iterates over direct children in order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.nodes[self.id.0].children.iter().map(move |id| doc.node(*id))
    }

    /// Iterates over this node and all of its descendants in pre-order
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            doc: self.doc,
            stack: vec![self.id],
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("data", self.data())
            .finish()
    }
}

/// Pre-order depth-first iterator over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[id.0].children.iter().rev().copied());
        Some(self.doc.node(id))
    }
}
