//! Media type inference from file extensions
//!
//! Inlined assets are labelled purely by the extension of their URL path, mapped
//! onto a coarse data type (`image`, `font`, `text`) and a subtype.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use url::Url;

/// Extensions treated as images
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "svg"];

/// Extensions treated as fonts
const FONT_EXTENSIONS: &[&str] = &["otf", "ttf", "woff", "woff2"];

/// Coarse data type of an inlined asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Image,
    Font,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Font => "font",
            DataType::Text => "text",
        }
    }
}

/// A `type/subtype` pair used in `data:` URIs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    pub data_type: DataType,
    pub subtype: String,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_type.as_str(), self.subtype)
    }
}

/// Returns the lowercased extension of the last path segment of `url`
///
/// Query and fragment never take part. Returns `None` when the last segment has
/// no dot, or nothing after it.
///
/// # Examples
///
/// ```
/// use page_archiver::fetch::mime::extension;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/fonts/Inter.WOFF2?v=3").unwrap();
/// assert_eq!(extension(&url).as_deref(), Some("woff2"));
///
/// let url = Url::parse("https://example.com/logo").unwrap();
/// assert_eq!(extension(&url), None);
/// ```
pub fn extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns true for the extensions an image source may carry
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Maps an extension to its `data:` URI subtype (`jpg` → `jpeg`, `svg` → `svg+xml`)
pub fn subtype(ext: &str) -> String {
    match ext {
        "jpg" => "jpeg".to_string(),
        "svg" => "svg+xml".to_string(),
        other => other.to_string(),
    }
}

/// Classifies an asset referenced from a stylesheet
pub fn classify(ext: &str) -> MediaType {
    let data_type = if IMAGE_EXTENSIONS.contains(&ext) {
        DataType::Image
    } else if FONT_EXTENSIONS.contains(&ext) {
        DataType::Font
    } else {
        DataType::Text
    };

    MediaType {
        data_type,
        subtype: subtype(ext),
    }
}

/// Media type for an image source; always `image/*` whatever the extension
pub fn image_type(ext: &str) -> MediaType {
    MediaType {
        data_type: DataType::Image,
        subtype: subtype(ext),
    }
}

/// Builds a `data:<type>/<subtype>;base64,<payload>` URI
pub fn data_uri(media_type: &MediaType, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}
