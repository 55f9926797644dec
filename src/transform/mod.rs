//! Document transformation pipeline
//!
//! This module contains:
//! - The ordered, named stage pipeline and its per-run context
//! - The `url(...)` scanner and rewriter for raw CSS
//! - One module per stage: link resolution, style inlining and injection,
//!   image inlining, and tag pruning

pub mod css;
mod images;
mod links;
mod pipeline;
mod prune;
mod styles;

pub use images::inline_images;
pub use links::resolve_links;
pub use pipeline::{Pipeline, Stage, StageEnv, TransformContext};
pub use prune::prune_tags;
pub use styles::{inject_styles, inline_styles};

use crate::{ArchiveError, Result};
use url::Url;

/// Resolves a possibly relative reference against `base`
pub(crate) fn resolve(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference).map_err(|source| ArchiveError::UrlParse {
        input: reference.to_string(),
        source,
    })
}
