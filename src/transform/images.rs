//! Image inlining
//!
//! Every `<img>`, and every `<source>` that is typed `image/*` or points at an
//! image file, gets its source replaced by a `data:image/...` URI. The `srcset`
//! attribute is dropped so browsers use the inlined source.

use crate::dom::{is_tag, Document, NodeId, NodeRef};
use crate::fetch::{mime, Fetcher};
use crate::transform::resolve;
use crate::{ArchiveError, Result};
use url::Url;

/// Returns the source a node would load: `src`, or else the last `srcset`
/// candidate without its descriptor
fn effective_source(node: NodeRef<'_>) -> Option<String> {
    let source = match node.attr("src").map(str::trim).filter(|src| !src.is_empty()) {
        Some(src) => src,
        None => {
            let srcset = node.attr("srcset")?;
            let candidate = srcset.rsplit(',').next()?.trim();
            candidate.split(' ').next()?.trim()
        }
    };

    if source.is_empty() || source.starts_with("data:") {
        None
    } else {
        Some(source.to_string())
    }
}

/// True for `<source>` elements carrying an image
fn is_image_source(node: NodeRef<'_>, base: &Url, source: &str) -> bool {
    if node
        .attr("type")
        .is_some_and(|kind| kind.starts_with("image/"))
    {
        return true;
    }

    resolve(base, source)
        .ok()
        .and_then(|url| mime::extension(&url))
        .is_some_and(|ext| mime::is_image_extension(&ext))
}

/// Replaces the source of every image with an inline `data:` URI
///
/// Images are processed one at a time in document order, `<img>` elements first.
/// Nodes without a usable source are skipped.
pub async fn inline_images(doc: &mut Document, base: &Url, fetcher: &Fetcher) -> Result<()> {
    let mut targets: Vec<(NodeId, String)> = doc
        .find_all(doc.root(), is_tag("img"))
        .filter_map(|node| effective_source(node).map(|source| (node.id(), source)))
        .collect();

    targets.extend(
        doc.find_all(doc.root(), is_tag("source"))
            .filter_map(|node| effective_source(node).map(|source| (node, source)))
            .filter(|(node, source)| is_image_source(*node, base, source))
            .map(|(node, source)| (node.id(), source)),
    );

    for (id, source) in targets {
        let url = resolve(base, &source)?;
        let ext = mime::extension(&url)
            .ok_or_else(|| ArchiveError::UnknownExtension(url.to_string()))?;
        let bytes = fetcher.download(&url).await?;

        tracing::debug!("Inlined image {} ({} bytes)", url, bytes.len());
        let data = mime::data_uri(&mime::image_type(&ext), &bytes);
        doc.set_attr(id, "src", &data);
        doc.remove_attr(id, "srcset");
    }

    Ok(())
}
