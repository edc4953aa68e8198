//! In-memory record of pending and published assets.
//!
//! Two disjoint ordered containers with explicit move-on-publish
//! semantics: an asset is in exactly one of `pending` / `published` at any
//! time. The orchestrator takes a kind's worth of pending assets, pushes
//! each one into `published` on success or back into `pending` on failure.
//!
//! Lookup by alias ([`Registry::find_published`]) consults published
//! assets only - an asset that has not finished uploading is not a valid
//! rewrite target and callers must fall back to a synthetic URL guess.

use super::{Asset, AssetKind, normalize_reference};

/// Ordered pending/published asset store.
#[derive(Debug, Default)]
pub struct Registry {
    pending: Vec<Asset>,
    published: Vec<Asset>,
}

impl Registry {
    /// Create a registry with all discovered assets pending.
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            pending: assets,
            published: Vec::new(),
        }
    }

    /// Remove and return all pending assets of `kind`, preserving
    /// discovery order.
    pub fn take_kind(&mut self, kind: AssetKind) -> Vec<Asset> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.pending.len());
        for asset in self.pending.drain(..) {
            if asset.kind() == kind {
                taken.push(asset);
            } else {
                kept.push(asset);
            }
        }
        self.pending = kept;
        taken
    }

    /// Record a successfully published asset.
    pub fn push_published(&mut self, asset: Asset) {
        debug_assert!(asset.destination().is_some());
        self.published.push(asset);
    }

    /// Return a failed asset to the pending set.
    pub fn push_pending(&mut self, asset: Asset) {
        self.pending.push(asset);
    }

    pub fn pending(&self) -> &[Asset] {
        &self.pending
    }

    pub fn published(&self) -> &[Asset] {
        &self.published
    }

    /// Find the published asset a raw reference points at.
    ///
    /// The reference is probed raw and with a leading `./` stripped
    /// against each published asset's alias set (destination, source
    /// path, full path, resolved URL - likewise normalized). First match
    /// in publish order wins; pending assets are never considered.
    pub fn find_published(&self, reference: &str) -> Option<&Asset> {
        let stripped = normalize_reference(reference);
        self.published
            .iter()
            .find(|a| a.matches(reference) || a.matches(stripped))
    }

    /// Check whether a destination title is already taken by a published
    /// asset (duplicate-destination collision).
    pub fn is_destination_published(&self, destination: &str) -> bool {
        self.published
            .iter()
            .any(|a| a.destination() == Some(destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset(path: &str) -> Asset {
        Asset::new(PathBuf::from(path), None)
    }

    fn published(path: &str, dest: &str, url: &str) -> Asset {
        let mut a = asset(path);
        a.set_destination(dest.into());
        a.mark_published(Some(url.into()), None);
        a
    }

    #[test]
    fn test_take_kind_preserves_order_and_rest() {
        let mut registry = Registry::new(vec![
            asset("a.html"),
            asset("b.css"),
            asset("c.html"),
            asset("d.png"),
        ]);

        let html = registry.take_kind(AssetKind::Html);
        assert_eq!(html.len(), 2);
        assert_eq!(html[0].source_str(), "a.html");
        assert_eq!(html[1].source_str(), "c.html");
        assert_eq!(registry.pending().len(), 2);
    }

    #[test]
    fn test_move_on_publish_is_exclusive() {
        let mut registry = Registry::new(vec![asset("logo.png")]);
        let mut batch = registry.take_kind(AssetKind::Resource);
        assert!(registry.pending().is_empty());

        let mut a = batch.remove(0);
        a.set_destination("Team:X/logo.png".into());
        a.mark_published(Some("http://host/logo".into()), Some("image/png".into()));
        registry.push_published(a);

        assert_eq!(registry.published().len(), 1);
        assert!(registry.pending().is_empty());
    }

    #[test]
    fn test_failed_asset_returns_to_pending() {
        let mut registry = Registry::new(vec![asset("logo.png")]);
        let mut batch = registry.take_kind(AssetKind::Resource);
        registry.push_pending(batch.remove(0));
        assert_eq!(registry.pending().len(), 1);
        assert!(registry.published().is_empty());
    }

    #[test]
    fn test_find_published_by_each_alias() {
        let mut registry = Registry::new(vec![]);
        registry.push_published(published(
            "css/style.css",
            "Team:X/css/style",
            "http://2024.igem.org/Team:X/css/style",
        ));

        for probe in [
            "css/style.css",
            "./css/style.css",
            "Team:X/css/style",
            "http://2024.igem.org/Team:X/css/style",
        ] {
            assert!(registry.find_published(probe).is_some(), "probe {probe}");
        }
        assert!(registry.find_published("css/other.css").is_none());
    }

    #[test]
    fn test_find_published_ignores_pending() {
        let registry = Registry::new(vec![asset("css/style.css")]);
        assert!(registry.find_published("css/style.css").is_none());
    }

    #[test]
    fn test_find_published_first_match_wins() {
        let mut registry = Registry::new(vec![]);
        registry.push_published(published("a.png", "Team:X/a.png", "http://host/first"));
        registry.push_published(published("a.png", "Team:X/a.png", "http://host/second"));

        let hit = registry.find_published("a.png").unwrap();
        assert_eq!(hit.url(), Some("http://host/first"));
    }

    #[test]
    fn test_stored_alias_with_dot_slash_matches_bare_probe() {
        let mut registry = Registry::new(vec![]);
        registry.push_published(published("./img/logo.png", "Team:X/img/logo.png", "http://host/logo"));
        assert!(registry.find_published("img/logo.png").is_some());
    }

    #[test]
    fn test_duplicate_destination_detection() {
        let mut registry = Registry::new(vec![]);
        registry.push_published(published("a.png", "Team:X/a.png", "http://host/a"));
        assert!(registry.is_destination_published("Team:X/a.png"));
        assert!(!registry.is_destination_published("Team:X/b.png"));
    }
}
