//! Tag pruning
//!
//! Once styles and images are inlined, the elements that would still reach out to
//! the network are removed together with their subtrees.

use crate::dom::{is_tag, Document};

/// Tags removed from archived pages once their content has been inlined
pub const DEFAULT_PRUNED_TAGS: &[&str] = &["style", "link", "script"];

/// Removes every subtree rooted at one of `tags`, whatever its attributes
pub fn prune_tags<S: AsRef<str>>(doc: &mut Document, tags: &[S]) {
    for tag in tags {
        let removed = doc.remove_all(doc.root(), is_tag(tag.as_ref()));
        tracing::debug!("Removed {} <{}> element(s)", removed, tag.as_ref());
    }
}
