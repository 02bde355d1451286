//! Raster formats and the extension to content-type table.

/// Content type used for any extension outside the raster table.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Raster formats the server can decode, resize and re-encode.
///
/// # Examples
///
/// ```
/// use thumbra_core::RasterFormat;
///
/// assert_eq!(RasterFormat::from_filename("Foo.JPG"), Some(RasterFormat::Jpeg));
/// assert_eq!(RasterFormat::from_filename("diagram.svg"), None);
/// assert_eq!(RasterFormat::Webp.content_type(), "image/webp");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum RasterFormat {
    /// JPEG (`.jpg`, `.jpeg`)
    #[display("jpeg")]
    Jpeg,
    /// PNG (`.png`)
    #[display("png")]
    Png,
    /// GIF (`.gif`)
    #[display("gif")]
    Gif,
    /// WebP (`.webp`)
    #[display("webp")]
    Webp,
}

impl RasterFormat {
    /// Look up a format by extension, ignoring case and a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(RasterFormat::Jpeg),
            "png" => Some(RasterFormat::Png),
            "gif" => Some(RasterFormat::Gif),
            "webp" => Some(RasterFormat::Webp),
            _ => None,
        }
    }

    /// Look up a format by the extension of `filename`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        extension_of(filename).and_then(|ext| Self::from_extension(&ext))
    }

    /// MIME type written alongside encoded objects of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Png => "image/png",
            RasterFormat::Gif => "image/gif",
            RasterFormat::Webp => "image/webp",
        }
    }

    /// Whether encoding takes a quality target.
    pub fn is_lossy(&self) -> bool {
        matches!(self, RasterFormat::Jpeg)
    }
}

/// Lowercased extension of `filename`, without the dot.
///
/// Returns `None` when there is no extension or the name ends in a dot.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type for an object named `filename`.
///
/// Unknown extensions fall back to [`OCTET_STREAM`].
pub fn content_type_for(filename: &str) -> &'static str {
    RasterFormat::from_filename(filename)
        .map(|format| format.content_type())
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(RasterFormat::from_extension("JPEG"), Some(RasterFormat::Jpeg));
        assert_eq!(RasterFormat::from_extension(".Png"), Some(RasterFormat::Png));
        assert_eq!(RasterFormat::from_extension("tiff"), None);
    }

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.pdf"), OCTET_STREAM);
        assert_eq!(content_type_for("no_extension"), OCTET_STREAM);
    }

    #[test]
    fn test_extension_of_edge_cases() {
        assert_eq!(extension_of("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("plain"), None);
    }

    #[test]
    fn test_only_jpeg_is_lossy() {
        let lossy: Vec<_> = RasterFormat::iter().filter(|f| f.is_lossy()).collect();
        assert_eq!(lossy, vec![RasterFormat::Jpeg]);
    }
}
