//! `url(...)` rewriting for raw CSS
//!
//! This is not a CSS parser. A character scanner tracks how much of the literal
//! `url(` it has seen; once the whole opener matches it captures up to the next
//! unescaped `)`. A partial match that diverges is kept as literal text and
//! scanning resumes with the next character, without re-examining the partial
//! match.
//!
//! Every captured argument that is not already a `data:` URI is resolved against
//! a base URL, downloaded, and replaced by a base64 `data:` URI. Everything else
//! is copied through untouched, so rewriting already rewritten CSS is a no-op.

use crate::fetch::{mime, Fetcher};
use crate::transform::resolve;
use crate::{ArchiveError, Result};
use url::Url;

const OPENER: [char; 4] = ['u', 'r', 'l', '('];

/// A lexical piece of CSS text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssToken {
    /// Text copied through as is
    Literal(String),

    /// A complete `url(...)` reference
    Url {
        /// The reference exactly as written, from `url(` to `)`
        raw: String,

        /// The argument with escapes resolved, whitespace trimmed and one
        /// surrounding quote removed from each end
        arg: String,
    },
}

/// Splits CSS text into literal runs and `url(...)` references
///
/// An unterminated `url(` at the end of the input is returned as literal text.
pub fn scan(css: &str) -> Vec<CssToken> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut matched = 0;

    let mut capturing = false;
    let mut escaped = false;
    let mut raw = String::new();
    let mut arg = String::new();

    for ch in css.chars() {
        if capturing {
            raw.push(ch);
            if escaped {
                arg.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == ')' {
                tokens.push(CssToken::Url {
                    raw: std::mem::take(&mut raw),
                    arg: clean_argument(&arg),
                });
                arg.clear();
                capturing = false;
            } else {
                arg.push(ch);
            }
            continue;
        }

        if ch == OPENER[matched] {
            literal.push(ch);
            matched += 1;

            if matched == OPENER.len() {
                literal.truncate(literal.len() - OPENER.len());
                if !literal.is_empty() {
                    tokens.push(CssToken::Literal(std::mem::take(&mut literal)));
                }
                raw.push_str("url(");
                matched = 0;
                capturing = true;
            }
        } else {
            matched = 0;
            literal.push(ch);
        }
    }

    if capturing {
        // The opener flushed the text before it; rejoin the two
        match tokens.last_mut() {
            Some(CssToken::Literal(previous)) => previous.push_str(&raw),
            _ => literal.push_str(&raw),
        }
    }
    if !literal.is_empty() {
        tokens.push(CssToken::Literal(literal));
    }

    tokens
}

fn clean_argument(arg: &str) -> String {
    let is_quote = |c: char| c == '\'' || c == '"';
    let arg = arg.trim();
    let arg = arg.strip_prefix(is_quote).unwrap_or(arg);
    let arg = arg.strip_suffix(is_quote).unwrap_or(arg);
    arg.to_string()
}

/// Rewrites every `url(...)` reference in `css` into an inline `data:` URI
///
/// # Arguments
///
/// * `css` - Raw stylesheet text
/// * `base` - URL relative references are resolved against
/// * `fetcher` - Used to download each referenced asset
///
/// # Returns
///
/// * `Ok(String)` - The rewritten stylesheet
/// * `Err(ArchiveError)` - A reference failed to resolve, had no extension, or
///   could not be downloaded
pub async fn rewrite(css: &str, base: &Url, fetcher: &Fetcher) -> Result<String> {
    let mut output = String::with_capacity(css.len());

    for token in scan(css) {
        match token {
            CssToken::Literal(text) => output.push_str(&text),
            CssToken::Url { raw, arg } => {
                if arg.is_empty() || arg.starts_with('#') || arg.starts_with("data:") {
                    output.push_str(&raw);
                } else {
                    let asset = resolve(base, &arg)?;
                    output.push_str("url(");
                    output.push_str(&inline_asset(&asset, fetcher).await?);
                    output.push(')');
                }
            }
        }
    }

    Ok(output)
}

/// Downloads an asset and encodes it as a `data:` URI typed by its extension
async fn inline_asset(url: &Url, fetcher: &Fetcher) -> Result<String> {
    let ext =
        mime::extension(url).ok_or_else(|| ArchiveError::UnknownExtension(url.to_string()))?;
    let bytes = fetcher.download(url).await?;

    tracing::debug!("Inlined {} ({} bytes)", url, bytes.len());
    Ok(mime::data_uri(&mime::classify(&ext), &bytes))
}
