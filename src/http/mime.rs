//! Extension to content-type table for served files.

use std::path::Path;

/// How the client should treat a served file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Render in place.
    Inline,
    /// Offer as a download (`Content-Disposition: attachment`).
    Attachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaType {
    pub content_type: &'static str,
    pub disposition: Disposition,
}

const HTML: MediaType = MediaType {
    content_type: "text/html; charset=utf-8",
    disposition: Disposition::Inline,
};

const DOWNLOAD: MediaType = MediaType {
    content_type: "application/octet-stream",
    disposition: Disposition::Attachment,
};

/// Looks up the media type for a file by extension (case-insensitive).
///
/// Returns `None` for extensions the server refuses to serve.
pub fn lookup(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    match ext.as_str() {
        "html" => Some(HTML),
        "txt" | "png" | "jpg" | "jpeg" => Some(DOWNLOAD),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_inline() {
        let media = lookup(Path::new("/srv/index.html")).unwrap();
        assert_eq!(media.content_type, "text/html; charset=utf-8");
        assert_eq!(media.disposition, Disposition::Inline);
    }

    #[test]
    fn binary_types_download() {
        for name in ["a.txt", "b.png", "c.JPG", "d.jpeg"] {
            let media = lookup(Path::new(name)).unwrap();
            assert_eq!(media.content_type, "application/octet-stream");
            assert_eq!(media.disposition, Disposition::Attachment);
        }
    }

    #[test]
    fn unknown_and_missing_extensions_are_refused() {
        assert!(lookup(Path::new("style.css")).is_none());
        assert!(lookup(Path::new("upload.json")).is_none());
        assert!(lookup(Path::new("Makefile")).is_none());
    }
}
