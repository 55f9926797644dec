//! Link resolution
//!
//! Rewrites relative references so the archived page no longer depends on its
//! original location. References pointing back into the same page collapse to a
//! bare `#fragment`.

use crate::dom::{is_tag, Document, NodeId};
use crate::transform::resolve;
use crate::Result;
use url::Url;

/// Tag and attribute pairs holding references
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("link", "href"),
    ("a", "href"),
    ("script", "src"),
    ("img", "src"),
];

/// Resolves every reference attribute against `base`
pub fn resolve_links(doc: &mut Document, base: &Url) -> Result<()> {
    let mut page = base.clone();
    page.set_fragment(None);
    let anchor_prefix = format!("{}#", page);

    for (tag, attr) in LINK_ATTRIBUTES {
        let targets: Vec<(NodeId, String)> = doc
            .find_all(doc.root(), is_tag(*tag))
            .filter_map(|node| node.attr(attr).map(|value| (node.id(), value.to_string())))
            .collect();

        for (id, value) in targets {
            let resolved = resolve(base, &value)?.to_string();
            let resolved = match resolved.strip_prefix(&anchor_prefix) {
                Some(fragment) => format!("#{}", fragment),
                None => resolved,
            };
            doc.set_attr(id, attr, &resolved);
        }
    }

    Ok(())
}
