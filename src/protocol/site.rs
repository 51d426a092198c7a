use mime::Mime;
use std::path::PathBuf;
use tokio::fs::File;
use tracing::debug;

use super::content_type::content_type_for;
use super::error::RequestError;

/// A file ready to be streamed back to the client
#[derive(Debug)]
pub struct StaticFile {
    pub path: PathBuf,
    pub file: File,
    pub len: u64,
    pub content_type: Mime,
}

/// Maps request targets onto files below a fixed directory
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
    index_document: String,
}

impl DocumentRoot {
    pub fn new(root: impl Into<PathBuf>, index_document: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_document: index_document.into(),
        }
    }

    /// Turn a request target into a path below the root
    ///
    /// Query strings and fragments are dropped. A target ending in `/` names
    /// the index document of that directory. `..` segments are refused. A
    /// target that is not an absolute path names nothing below the root.
    pub fn resolve(&self, target: &str) -> Result<PathBuf, RequestError> {
        let path = target
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        if !path.starts_with('/') {
            return Err(RequestError::NotFound(target.to_string()));
        }

        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(RequestError::Forbidden(target.to_string())),
                segment => resolved.push(segment),
            }
        }

        if path.ends_with('/') {
            resolved.push(&self.index_document);
        }

        Ok(resolved)
    }

    /// Open the file behind `target`
    ///
    /// Absent files and directories are `NotFound`; files the process may
    /// not read are `Forbidden`.
    pub async fn open(&self, target: &str) -> Result<StaticFile, RequestError> {
        let path = self.resolve(target)?;

        let file = File::open(&path).await.map_err(|err| {
            debug!(path = %path.display(), error = %err, "Open failed");
            RequestError::from_io(&err, target)
        })?;

        let metadata = file
            .metadata()
            .await
            .map_err(|err| RequestError::from_io(&err, target))?;

        if !metadata.is_file() {
            return Err(RequestError::NotFound(target.to_string()));
        }

        Ok(StaticFile {
            content_type: content_type_for(&path),
            len: metadata.len(),
            path,
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, DocumentRoot) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("index.html"), "<p>docs</p>").unwrap();
        fs::write(dir.path().join("docs").join("notes.txt"), "plain").unwrap();

        let root = DocumentRoot::new(dir.path(), "index.html");
        (dir, root)
    }

    #[test]
    fn test_resolve_plain_target() {
        let root = DocumentRoot::new("www", "index.html");

        assert_eq!(
            root.resolve("/css/site.css").unwrap(),
            PathBuf::from("www/css/site.css")
        );
    }

    #[test]
    fn test_resolve_directory_uses_index() {
        let root = DocumentRoot::new("www", "index.html");

        assert_eq!(root.resolve("/").unwrap(), PathBuf::from("www/index.html"));
        assert_eq!(
            root.resolve("/docs/").unwrap(),
            PathBuf::from("www/docs/index.html")
        );
    }

    #[test]
    fn test_resolve_strips_query() {
        let root = DocumentRoot::new("www", "index.html");

        assert_eq!(
            root.resolve("/page.html?v=3#top").unwrap(),
            PathBuf::from("www/page.html")
        );
        assert_eq!(
            root.resolve("/?lang=en").unwrap(),
            PathBuf::from("www/index.html")
        );
    }

    #[test]
    fn test_resolve_refuses_parent_segments() {
        let root = DocumentRoot::new("www", "index.html");

        assert!(matches!(
            root.resolve("/../etc/passwd"),
            Err(RequestError::Forbidden(_))
        ));
        assert!(matches!(
            root.resolve("/docs/../../secret"),
            Err(RequestError::Forbidden(_))
        ));
    }

    #[test]
    fn test_resolve_without_leading_slash_is_not_found() {
        let root = DocumentRoot::new("www", "index.html");

        assert_eq!(
            root.resolve("index.html"),
            Err(RequestError::NotFound("index.html".into()))
        );
        assert_eq!(
            root.resolve("http://localhost/"),
            Err(RequestError::NotFound("http://localhost/".into()))
        );
    }

    #[tokio::test]
    async fn test_open_existing_file() {
        let (_dir, root) = site();

        let file = root.open("/docs/notes.txt").await.unwrap();
        assert_eq!(file.len, 5);
        assert_eq!(file.content_type, mime::TEXT_PLAIN);
    }

    #[tokio::test]
    async fn test_open_directory_index() {
        let (_dir, root) = site();

        let file = root.open("/docs/").await.unwrap();
        assert_eq!(file.len, "<p>docs</p>".len() as u64);
        assert_eq!(file.content_type, mime::TEXT_HTML);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let (_dir, root) = site();

        assert_eq!(
            root.open("/missing.txt").await.unwrap_err(),
            RequestError::NotFound("/missing.txt".into())
        );
    }

    #[tokio::test]
    async fn test_open_directory_without_slash() {
        let (_dir, root) = site();

        assert_eq!(
            root.open("/docs").await.unwrap_err(),
            RequestError::NotFound("/docs".into())
        );
    }
}
