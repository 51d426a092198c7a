use mime::Mime;
use std::path::Path;

/// Content type for a served file, chosen by its suffix
///
/// Unknown or missing suffixes fall back to `text/plain`.
pub fn content_type_for(path: &Path) -> Mime {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return mime::TEXT_PLAIN;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => mime::TEXT_HTML,
        "txt" => mime::TEXT_PLAIN,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "ico" => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "css" => mime::TEXT_CSS,
        "js" => mime::APPLICATION_JAVASCRIPT,
        _ => mime::TEXT_PLAIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essence(name: &str) -> String {
        content_type_for(Path::new(name)).essence_str().to_string()
    }

    #[test]
    fn test_known_suffixes() {
        assert_eq!(essence("www/index.html"), "text/html");
        assert_eq!(essence("notes.txt"), "text/plain");
        assert_eq!(essence("logo.png"), "image/png");
        assert_eq!(essence("spin.gif"), "image/gif");
        assert_eq!(essence("photo.jpg"), "image/jpeg");
        assert_eq!(essence("favicon.ico"), "image/x-icon");
        assert_eq!(essence("site.css"), "text/css");
        assert_eq!(essence("app.js"), "application/javascript");
    }

    #[test]
    fn test_suffix_is_case_insensitive() {
        assert_eq!(essence("INDEX.HTML"), "text/html");
        assert_eq!(essence("Photo.JPEG"), "image/jpeg");
    }

    #[test]
    fn test_fallback_is_plain_text() {
        assert_eq!(essence("Makefile"), "text/plain");
        assert_eq!(essence("archive.tar.gz"), "text/plain");
        assert_eq!(essence(".hidden"), "text/plain");
        // a prefix of a known suffix is not a match
        assert_eq!(essence("page.h"), "text/plain");
    }
}
