//! Stylesheet inlining and injection
//!
//! The inliner gathers every `<style>` block followed by every linked
//! stylesheet, rewrites their `url(...)` references into `data:` URIs and joins
//! them, each block terminated by a newline. The injector later appends that text
//! to `<head>` as a single `<style>` element.

use crate::dom::{has_attr_matching, is_tag, Document, Filter};
use crate::fetch::Fetcher;
use crate::transform::{css, resolve};
use crate::{ArchiveError, Result};
use url::Url;

/// True when a `rel` value lists `stylesheet` among its tokens
fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
}

/// Collects and rewrites all CSS of the page
///
/// Inline blocks resolve their references against the page URL, linked
/// stylesheets against their own URL. Any failed download aborts the collection.
pub async fn inline_styles(doc: &Document, base: &Url, fetcher: &Fetcher) -> Result<String> {
    let blocks: Vec<String> = doc
        .find_all(doc.root(), is_tag("style"))
        .map(|node| node.text().to_string())
        .collect();

    let stylesheets: Vec<String> = doc
        .find_all(
            doc.root(),
            is_tag("link").and(has_attr_matching("rel", is_stylesheet_rel)),
        )
        .filter_map(|node| node.attr("href").map(str::to_string))
        .collect();

    let mut output = String::new();

    for block in &blocks {
        output.push_str(&css::rewrite(block, base, fetcher).await?);
        output.push('\n');
    }

    for href in &stylesheets {
        let url = resolve(base, href)?;
        let body = fetcher.download(&url).await?;
        tracing::debug!("Fetched stylesheet {}", url);

        output.push_str(&css::rewrite(&String::from_utf8_lossy(&body), &url, fetcher).await?);
        output.push('\n');
    }

    Ok(output)
}

/// Appends one `<style>` element holding `css` to the document's `<head>`
pub fn inject_styles(doc: &mut Document, css: &str) -> Result<()> {
    let head = doc
        .find(doc.root(), is_tag("head"))
        .ok_or_else(|| ArchiveError::MissingElement("head".to_string()))?
        .id();

    let style = doc.create_element("style", &[], css);
    doc.append_child(head, style);
    Ok(())
}
