//! Document model for archived pages
//!
//! This module contains:
//! - An arena-backed mutable tree of parsed markup
//! - Composable node filters for querying the tree
//! - Parsing through scraper/html5ever
//! - Serialization back to HTML

mod filter;
mod parse;
mod render;
mod tree;

pub use filter::{has_attr, has_attr_matching, has_class, has_id, is_tag, not, And, Filter, Not};
pub use tree::{Descendants, Document, NodeData, NodeId, NodeRef};
