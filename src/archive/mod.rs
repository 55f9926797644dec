//! Page archiving
//!
//! This module ties the pieces together:
//! - Downloading and parsing the page
//! - Running the transform pipeline against it
//! - Naming the output after the page title and writing it
//! - Archiving a batch of URLs and reporting per-URL outcomes

mod report;

pub use report::{ArchiveOutcome, ArchiveReport};

use crate::config::{validate, Config};
use crate::dom::{is_tag, Document};
use crate::fetch::Fetcher;
use crate::transform::{Pipeline, StageEnv};
use crate::{ArchiveError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Turns web pages into self-contained HTML files
#[derive(Debug, Clone)]
pub struct Archiver {
    fetcher: Fetcher,
    pipeline: Pipeline,
    sanitize_titles: bool,
}

impl Archiver {
    /// Creates an archiver running the standard archival pipeline
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            pipeline: Pipeline::archival(),
            sanitize_titles: false,
        }
    }

    /// Creates an archiver from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;
        let fetcher = Fetcher::from_config(&config.fetch, &config.retry)?;
        Ok(Self::new(fetcher).with_sanitized_titles(config.output.sanitize_titles))
    }

    /// Replaces the pipeline run against each page
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Strips characters that are unsafe in file names from titles when set
    pub fn with_sanitized_titles(mut self, sanitize: bool) -> Self {
        self.sanitize_titles = sanitize;
        self
    }

    /// Archives a single page into `output_dir`
    ///
    /// The file is named after the page's `<title>` with an `.html` suffix. The
    /// page is rendered in full before the file is created, so a failure never
    /// leaves a partial file behind.
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Existing directory the archive is written into
    /// * `page_url` - Absolute URL of the page
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written archive
    /// * `Err(ArchiveError)` - Download, transformation or write failure
    pub async fn archive(&self, output_dir: &Path, page_url: &str) -> Result<PathBuf> {
        tracing::info!("Processing link: {}", page_url);

        let base_url = Url::parse(page_url).map_err(|source| ArchiveError::UrlParse {
            input: page_url.to_string(),
            source,
        })?;

        let markup = self.fetcher.download(&base_url).await?;
        let mut doc = Document::parse_bytes(&markup);

        let env = StageEnv {
            base_url: &base_url,
            fetcher: &self.fetcher,
        };
        self.pipeline.run(&mut doc, &env).await?;

        let title = page_title(&doc)?;
        let path = output_dir.join(file_name(&title, self.sanitize_titles));

        let mut rendered = Vec::new();
        doc.render(&mut rendered)
            .map_err(|source| ArchiveError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Writing file: {}", path.display());
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|source| ArchiveError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Archives each URL in turn, carrying on past failures
    ///
    /// Failures are logged as they happen and collected, in input order, in the
    /// returned report.
    pub async fn archive_all<I, S>(&self, output_dir: &Path, urls: I) -> ArchiveReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ArchiveReport::default();

        for url in urls {
            let url = url.as_ref();
            let result = self.archive(output_dir, url).await;

            if let Err(e) = &result {
                tracing::warn!("Failed to archive {}: {}", url, e);
            }

            report.push(url, result);
        }

        report
    }
}

/// Returns the text of the first `<title>` element
fn page_title(doc: &Document) -> Result<String> {
    doc.find(doc.root(), is_tag("title"))
        .map(|title| title.text().to_string())
        .ok_or_else(|| ArchiveError::MissingElement("title".to_string()))
}

fn file_name(title: &str, sanitize: bool) -> String {
    if sanitize {
        format!("{}.html", sanitize_filename::sanitize(title))
    } else {
        format!("{}.html", title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title() {
        let doc = Document::parse("<html><head><title>Release Notes</title></head></html>");
        assert_eq!(page_title(&doc).unwrap(), "Release Notes");
    }

    #[test]
    fn test_page_title_missing() {
        let doc = Document::parse("<html><head></head><body>untitled</body></html>");
        let err = page_title(&doc).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingElement(tag) if tag == "title"));
    }

    #[test]
    fn test_file_name_is_verbatim_by_default() {
        assert_eq!(file_name("Q&A: what?", false), "Q&A: what?.html");
    }

    #[test]
    fn test_file_name_sanitized() {
        let name = file_name("../etc/passwd", true);
        assert!(!name.contains('/'));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = Config::default();
        config.retry.backoff_ms = 0;
        let err = Archiver::from_config(&config).unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }

    #[tokio::test]
    async fn test_archive_rejects_relative_url() {
        let archiver = Archiver::from_config(&Config::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = archiver.archive(dir.path(), "index.html").await.unwrap_err();
        assert!(matches!(err, ArchiveError::UrlParse { input, .. } if input == "index.html"));
    }
}
