//! Ordered stage pipeline
//!
//! A [`Pipeline`] is a list of named [`Stage`]s run one after another against a
//! single [`Document`]. Stages hand data forward through a [`TransformContext`]
//! that is created fresh for every run. The first failing stage stops the run
//! and its error is wrapped with the stage name.

use crate::dom::Document;
use crate::fetch::Fetcher;
use crate::transform::{images, links, prune, styles};
use crate::{ArchiveError, Result};
use url::Url;

/// State handed from one stage to a later one during a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformContext {
    /// Rewritten CSS gathered by the style inliner, consumed by the injector
    pub inlined_styles: Option<String>,
}

/// Everything a stage may consult besides the document and the context
#[derive(Debug, Clone, Copy)]
pub struct StageEnv<'a> {
    /// Absolute URL of the page being archived
    pub base_url: &'a Url,

    /// Fetcher for stylesheets and images
    pub fetcher: &'a Fetcher,
}

/// A single mutation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Make `href`/`src` references absolute
    ResolveLinks,

    /// Gather and rewrite all CSS into the context
    InlineStyles,

    /// Replace image sources with `data:` URIs
    InlineImages,

    /// Remove every subtree rooted at one of these tags
    PruneTags(Vec<String>),

    /// Append the gathered CSS to `<head>` as one `<style>` element
    InjectStyles,
}

impl Stage {
    async fn apply(
        &self,
        doc: &mut Document,
        ctx: &mut TransformContext,
        env: &StageEnv<'_>,
    ) -> Result<()> {
        match self {
            Stage::ResolveLinks => links::resolve_links(doc, env.base_url),
            Stage::InlineStyles => {
                let css = styles::inline_styles(doc, env.base_url, env.fetcher).await?;
                ctx.inlined_styles = Some(css);
                Ok(())
            }
            Stage::InlineImages => images::inline_images(doc, env.base_url, env.fetcher).await,
            Stage::PruneTags(tags) => {
                prune::prune_tags(doc, tags.as_slice());
                Ok(())
            }
            Stage::InjectStyles => {
                let css = ctx.inlined_styles.take().unwrap_or_default();
                styles::inject_styles(doc, &css)
            }
        }
    }
}

/// An ordered list of named stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<(String, Stage)>,
}

impl Pipeline {
    /// Creates an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The stages that turn a downloaded page into a self-contained one:
    /// resolve links, inline styles, inline images, remove tags, append
    /// inlined styles
    pub fn archival() -> Self {
        Self::new()
            .with_stage("resolve links", Stage::ResolveLinks)
            .with_stage("inline styles", Stage::InlineStyles)
            .with_stage("inline images", Stage::InlineImages)
            .with_stage(
                "remove tags",
                Stage::PruneTags(prune::DEFAULT_PRUNED_TAGS.iter().map(|t| t.to_string()).collect()),
            )
            .with_stage("append inlined styles", Stage::InjectStyles)
    }

    /// Appends a stage
    pub fn with_stage(mut self, name: impl Into<String>, stage: Stage) -> Self {
        self.stages.push((name.into(), stage));
        self
    }

    /// Returns the stage names in execution order
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|(name, _)| name.as_str())
    }

    /// Runs every stage in order against `doc`
    ///
    /// Stops at the first failure; mutations made before it are kept. On success
    /// returns the context as the last stage left it.
    pub async fn run(&self, doc: &mut Document, env: &StageEnv<'_>) -> Result<TransformContext> {
        let mut ctx = TransformContext::default();

        for (name, stage) in &self.stages {
            tracing::debug!("Running stage: {}", name);
            stage
                .apply(doc, &mut ctx, env)
                .await
                .map_err(|source| ArchiveError::Stage {
                    stage: name.clone(),
                    source: Box::new(source),
                })?;
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::is_tag;
    use crate::fetch::RetryPolicy;

    fn offline_fetcher() -> Fetcher {
        Fetcher::new(reqwest::Client::new(), RetryPolicy::default())
    }

    #[test]
    fn test_archival_stage_order() {
        let pipeline = Pipeline::archival();
        let names: Vec<&str> = pipeline.stage_names().collect();
        assert_eq!(
            names,
            vec![
                "resolve links",
                "inline styles",
                "inline images",
                "remove tags",
                "append inlined styles"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_without_network_assets() {
        let mut doc = Document::parse(
            r#"<html><head><title>T</title><style>p{color:red}</style><script src="a.js"></script></head><body><a href="/about">x</a></body></html>"#,
        );
        let base = Url::parse("https://example.com/index.html").unwrap();
        let fetcher = offline_fetcher();
        let env = StageEnv {
            base_url: &base,
            fetcher: &fetcher,
        };

        let ctx = Pipeline::archival().run(&mut doc, &env).await.unwrap();

        assert_eq!(ctx.inlined_styles, None);
        assert_eq!(
            doc.to_html(),
            "<html><head><title>T</title><style>p{color:red}\n</style></head><body><a href=\"https://example.com/about\">x</a></body></html>"
        );
    }

    #[tokio::test]
    async fn test_failure_is_attributed_to_stage() {
        let mut doc = Document::parse("<html><body><p>no head here</p></body></html>");
        // html5ever always synthesizes a head; drop it to exercise the failure
        doc.remove_all(doc.root(), is_tag("head"));

        let base = Url::parse("https://example.com/").unwrap();
        let fetcher = offline_fetcher();
        let env = StageEnv {
            base_url: &base,
            fetcher: &fetcher,
        };

        let err = Pipeline::archival().run(&mut doc, &env).await.unwrap_err();
        assert_eq!(err.stage(), Some("append inlined styles"));
        assert!(matches!(err.root_cause(), ArchiveError::MissingElement(tag) if tag == "head"));
        assert_eq!(err.to_string(), "append inlined styles: Missing <head> element");
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let mut doc = Document::parse(r#"<html><head></head><body><img src="logo"><script></script></body></html>"#);
        let base = Url::parse("https://example.com/").unwrap();
        let fetcher = offline_fetcher();
        let env = StageEnv {
            base_url: &base,
            fetcher: &fetcher,
        };

        let err = Pipeline::archival().run(&mut doc, &env).await.unwrap_err();
        assert_eq!(err.stage(), Some("inline images"));
        // Pruning never ran
        assert!(doc.find(doc.root(), is_tag("script")).is_some());
    }

    #[tokio::test]
    async fn test_custom_pipeline_context_is_fresh_per_run() {
        let pipeline = Pipeline::new()
            .with_stage("prune", Stage::PruneTags(vec!["p".to_string()]))
            .with_stage("inject", Stage::InjectStyles);
        let base = Url::parse("https://example.com/").unwrap();
        let fetcher = offline_fetcher();
        let env = StageEnv {
            base_url: &base,
            fetcher: &fetcher,
        };

        for _ in 0..2 {
            let mut doc = Document::parse("<html><head></head><body><p>x</p></body></html>");
            let ctx = pipeline.run(&mut doc, &env).await.unwrap();
            assert_eq!(ctx, TransformContext::default());
            assert_eq!(doc.to_html(), "<html><head><style></style></head><body></body></html>");
        }
    }
}
