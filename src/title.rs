//! Title resolution for the remote wiki namespace.
//!
//! Every page and attachment on the target host lives under a flat title
//! namespace addressed by string prefixing: `Team:X/prefix/raw-title`.
//! [`TitleResolver`] is the single place that builds those titles and the
//! URLs derived from them; every other component goes through it.
//!
//! Invariants:
//! - Resolution is idempotent: a title that already carries the full
//!   namespace prefix is returned unchanged (no double-prefixing)
//! - Empty segments are omitted, segments are joined with exactly one `/`

/// Builds canonical remote titles and URLs for a team namespace.
#[derive(Debug, Clone)]
pub struct TitleResolver {
    /// Team namespace segment (e.g. `Team:Amsterdam`), empty if unset.
    namespace: String,
    /// Extra prefix segment below the namespace, empty if unset.
    prefix: String,
    /// Wiki edition host (e.g. `2024.igem.org`).
    host: String,
}

impl TitleResolver {
    /// Create a resolver for the given team, prefix and wiki edition year.
    ///
    /// A bare team name is normalized to the `Team:` namespace form.
    pub fn new(team: Option<&str>, prefix: Option<&str>, year: u16) -> Self {
        let namespace = match team {
            Some(t) if !t.is_empty() => {
                if t.starts_with("Team:") {
                    t.to_string()
                } else {
                    format!("Team:{t}")
                }
            }
            _ => String::new(),
        };
        Self {
            namespace,
            prefix: prefix.unwrap_or_default().to_string(),
            host: format!("{year}.igem.org"),
        }
    }

    /// Host part of the target site, without scheme.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Base URL of the target site.
    ///
    /// Plain http: the host serves stylesheets over http, so forcing https
    /// would trip mixed-content warnings on every published page.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.host)
    }

    /// Full namespace prefix (`namespace/prefix`), without trailing `/`.
    fn full_prefix(&self) -> String {
        let ns = self.namespace.trim_matches('/');
        let prefix = self.prefix.trim_matches('/');
        match (ns.is_empty(), prefix.is_empty()) {
            (false, false) => format!("{ns}/{prefix}"),
            (false, true) => ns.to_string(),
            (true, false) => prefix.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Resolve a raw title to its canonical namespaced form.
    ///
    /// Idempotent: a title already below the namespace prefix (as a whole
    /// path segment, not just a string prefix) comes back unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        let uri = self.full_prefix();
        if uri.is_empty() {
            return raw.trim_matches('/').to_string();
        }
        if raw == uri || raw.starts_with(&format!("{uri}/")) {
            return raw.to_string();
        }
        let title = raw.trim_matches('/');
        if title.is_empty() {
            uri
        } else {
            format!("{uri}/{title}")
        }
    }

    /// Absolute URL for a title on the target host, with exactly one `/`
    /// between base URL and resolved title.
    pub fn url_for(&self, title: &str) -> String {
        format!("{}/{}", self.base_url(), self.resolve(title))
    }
}
