//! Discovered assets and their publication records.
//!
//! An [`Asset`] is one local file slated for publication. It is created
//! during discovery, gets its remote destination assigned once before
//! upload, and receives its resolved URL / MIME type exactly once on
//! successful publish. After that the record is read-only and serves as a
//! rewrite target for later assets.

mod collect;
mod kind;
mod registry;

pub use collect::collect_patterns;
pub use kind::{AssetKind, IMAGE_EXTENSIONS, PUBLISH_ORDER, is_image_extension};
pub use registry::Registry;

use std::path::{Path, PathBuf};

/// One discovered local file.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Filesystem path the file was discovered at. Immutable.
    source: PathBuf,
    /// Pattern directory recorded in strip mode, absent otherwise.
    base: Option<String>,
    /// Resolved remote title. Assigned exactly once before upload.
    destination: Option<String>,
    /// Remote URL, set once on successful publish.
    url: Option<String>,
    /// MIME type reported by the host, set once on successful publish.
    mime: Option<String>,
    /// Normalized lookup aliases, computed when the asset is published.
    aliases: Vec<String>,
}

impl Asset {
    /// Create an asset discovered at `source`.
    ///
    /// In strip mode `base` carries the pattern's directory; the initial
    /// destination is the source path with that prefix removed once.
    pub fn new(source: PathBuf, base: Option<String>) -> Self {
        let destination = base.as_deref().map(|b| {
            let path = source.to_string_lossy();
            path.replacen(b, "", 1)
        });
        Self {
            source,
            base,
            destination,
            url: None,
            mime: None,
            aliases: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Source path as a string (the form used in link matching).
    pub fn source_str(&self) -> String {
        self.source.to_string_lossy().into_owned()
    }

    /// Pattern directory joined back onto the source path.
    pub fn full_path(&self) -> Option<String> {
        self.base
            .as_deref()
            .map(|b| Path::new(b).join(&self.source).to_string_lossy().into_owned())
    }

    /// File extension without the dot, empty if none.
    pub fn extension(&self) -> &str {
        self.source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::from_extension(self.extension())
    }

    pub fn is_image(&self) -> bool {
        is_image_extension(self.extension())
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Assign the canonical remote title. Must happen exactly once, before
    /// any upload attempt.
    pub fn set_destination(&mut self, destination: String) {
        self.destination = Some(destination);
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Record the publish outcome. URL and MIME are write-once: a later
    /// duplicate upload must not overwrite an already-resolved record.
    pub fn mark_published(&mut self, url: Option<String>, mime: Option<String>) {
        if self.url.is_none() {
            self.url = url;
        }
        if self.mime.is_none() {
            self.mime = mime;
        }
        self.aliases = self.compute_aliases();
    }

    /// Lookup aliases: destination, source path, full path and resolved
    /// URL, each in raw form and with a leading `./` stripped.
    fn compute_aliases(&self) -> Vec<String> {
        let mut aliases = Vec::new();
        let mut push = |candidate: Option<String>| {
            if let Some(c) = candidate {
                let stripped = normalize_reference(&c).to_string();
                if stripped != c {
                    aliases.push(stripped);
                }
                aliases.push(c);
            }
        };
        push(self.destination.clone());
        push(Some(self.source_str()));
        push(self.full_path());
        push(self.url.clone());
        aliases
    }

    /// Check a (pre-normalized) reference against the alias set.
    fn matches(&self, reference: &str) -> bool {
        self.aliases.iter().any(|a| a == reference)
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} => {}",
            self.source.display(),
            self.destination.as_deref().unwrap_or("?")
        )
    }
}

/// Strip a single leading `./` (repeated, so `././x` also normalizes).
pub fn normalize_reference(reference: &str) -> &str {
    let mut r = reference;
    while let Some(rest) = r.strip_prefix("./") {
        r = rest;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_base_removes_prefix_once() {
        let asset = Asset::new(PathBuf::from("assets/css/style.css"), Some("assets".into()));
        assert_eq!(asset.destination(), Some("/css/style.css"));
    }

    #[test]
    fn test_no_base_no_destination() {
        let asset = Asset::new(PathBuf::from("logo.png"), None);
        assert_eq!(asset.destination(), None);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(
            Asset::new(PathBuf::from("a/index.html"), None).kind(),
            AssetKind::Html
        );
        assert_eq!(
            Asset::new(PathBuf::from("a/logo.png"), None).kind(),
            AssetKind::Resource
        );
    }

    #[test]
    fn test_mark_published_write_once() {
        let mut asset = Asset::new(PathBuf::from("logo.png"), None);
        asset.mark_published(Some("http://host/logo".into()), Some("image/png".into()));
        asset.mark_published(Some("http://other/url".into()), Some("text/plain".into()));
        assert_eq!(asset.url(), Some("http://host/logo"));
        assert_eq!(asset.mime(), Some("image/png"));
    }

    #[test]
    fn test_aliases_include_stripped_form() {
        let mut asset = Asset::new(PathBuf::from("./css/style.css"), None);
        asset.set_destination("Team:X/css/style".into());
        asset.mark_published(Some("http://host/Team:X/css/style".into()), None);
        assert!(asset.matches("css/style.css"));
        assert!(asset.matches("./css/style.css"));
        assert!(asset.matches("Team:X/css/style"));
        assert!(asset.matches("http://host/Team:X/css/style"));
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference("./css/a.css"), "css/a.css");
        assert_eq!(normalize_reference("././x"), "x");
        assert_eq!(normalize_reference("css/a.css"), "css/a.css");
        // A hidden file keeps its dot.
        assert_eq!(normalize_reference(".hidden"), ".hidden");
    }
}
