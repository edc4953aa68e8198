//! Link rewriting for published HTML content.
//!
//! Four reference categories are rewritten independently: stylesheet
//! `link[href]`, `script[src]`, anchor `a[href]` and `img[src]`. Each has
//! its own rewrite rule but all of them resolve references through the
//! registry's published-assets lookup, falling back to a best-effort URL
//! guess when a reference has no published match yet.
//!
//! Only attribute values change; markup around them stays byte-identical,
//! and references whose host is neither empty nor the target site's own
//! pass through untouched.
//!
//! Stylesheet and script *bodies* are published as-is.
//! TODO: rewrite url() references inside stylesheet bodies.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::asset::{Registry, is_image_extension, normalize_reference};
use crate::debug;
use crate::title::TitleResolver;

/// Query suffix forcing raw delivery of stylesheet pages.
const RAW_CSS_SUFFIX: &str = "?action=raw&ctype=text/css";

/// Query suffix forcing raw delivery of script pages.
const RAW_JS_SUFFIX: &str = "?action=raw&ctype=text/javascript";

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap());
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<script\b[^>]*>").unwrap());
static ANCHOR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\b[^>]*>").unwrap());
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

static REL_STYLESHEET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']?stylesheet["']?"#).unwrap());
static HREF_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(\s)(href)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static SRC_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(\s)(src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Rewrites references in one asset's HTML against the current registry
/// state. Never mutates the registry.
pub struct LinkRewriter<'a> {
    registry: &'a Registry,
    titles: &'a TitleResolver,
}

/// A reference split into rewritable parts, or external.
enum Reference {
    External,
    Local {
        path: String,
        query: Option<String>,
        fragment: Option<String>,
    },
}

impl<'a> LinkRewriter<'a> {
    pub fn new(registry: &'a Registry, titles: &'a TitleResolver) -> Self {
        Self { registry, titles }
    }

    /// Rewrite all four reference categories in an HTML document.
    pub fn rewrite_html(&self, html: &str) -> String {
        let html = LINK_TAG.replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            if REL_STYLESHEET.is_match(tag) {
                replace_attr(tag, &HREF_ATTR, |href| Some(self.stylesheet_target(href)))
            } else {
                tag.to_string()
            }
        });
        let html = SCRIPT_TAG.replace_all(&html, |caps: &Captures| {
            replace_attr(&caps[0], &SRC_ATTR, |src| Some(self.script_target(src)))
        });
        let html = ANCHOR_TAG.replace_all(&html, |caps: &Captures| {
            replace_attr(&caps[0], &HREF_ATTR, |href| self.page_target(href))
        });
        let html = IMG_TAG.replace_all(&html, |caps: &Captures| {
            replace_attr(&caps[0], &SRC_ATTR, |src| self.image_target(src))
        });
        html.into_owned()
    }

    /// Stylesheet link: published URL or best-effort guess, plus the raw
    /// CSS suffix (appended at most once).
    fn stylesheet_target(&self, href: &str) -> String {
        let uri = self.resolved_or_guess(href);
        append_suffix(uri, RAW_CSS_SUFFIX)
    }

    /// Script source: published URL or best-effort guess, plus the raw
    /// JavaScript suffix (appended at most once).
    fn script_target(&self, src: &str) -> String {
        let uri = self.resolved_or_guess(src);
        append_suffix(uri, RAW_JS_SUFFIX)
    }

    /// Published URL for a reference, or the guessed page URL built from
    /// the reference with its extension stripped.
    fn resolved_or_guess(&self, reference: &str) -> String {
        match self.lookup(reference) {
            Some(asset) => asset
                .url()
                .map(str::to_string)
                .unwrap_or_else(|| self.guess_url(reference)),
            None => {
                debug!("rewrite"; "no published match for {reference}, guessing");
                self.guess_url(reference)
            }
        }
    }

    /// Registry lookup, probing the raw reference and its title-resolved
    /// form (a local `img/logo.png` matches the asset published under
    /// `Team:X/img/logo.png`).
    fn lookup(&self, reference: &str) -> Option<&'a crate::asset::Asset> {
        self.registry.find_published(reference).or_else(|| {
            let resolved = self.titles.resolve(normalize_reference(reference));
            self.registry.find_published(&resolved)
        })
    }

    fn guess_url(&self, reference: &str) -> String {
        let bare = strip_extension(normalize_reference(reference));
        self.titles.url_for(bare)
    }

    /// Anchor href: same-site references become canonical page URLs
    /// (extension stripped, `/` maps to `index`, fragment reattached);
    /// external references pass through unchanged (`None`).
    fn page_target(&self, href: &str) -> Option<String> {
        let Reference::Local {
            path,
            query,
            fragment,
        } = self.classify(href)
        else {
            return None;
        };
        if path.is_empty() {
            return None;
        }

        let stripped = strip_extension(&path);
        let name = if stripped == "/" { "index" } else { stripped };
        let name = normalize_reference(name).trim_start_matches('/');

        let mut url = self.titles.url_for(name);
        if let Some(query) = query {
            url.push('?');
            url.push_str(&query);
        }
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(&fragment);
        }
        Some(url)
    }

    /// Image source: same-site references resolve through the registry;
    /// the matched asset's MIME type (or, failing that, the reference's
    /// own extension) decides whether a raw image suffix is appended.
    fn image_target(&self, src: &str) -> Option<String> {
        let Reference::Local { path, .. } = self.classify(src) else {
            return None;
        };
        if path.is_empty() {
            return None;
        }

        let matched = self.lookup(src).or_else(|| self.lookup(&path));

        let (mut url, mime) = match matched {
            Some(asset) => {
                let url = asset.url().map(str::to_string).unwrap_or_else(|| {
                    self.titles
                        .url_for(asset.destination().unwrap_or(path.as_str()))
                });
                (url, asset.mime().map(str::to_string))
            }
            None => {
                debug!("rewrite"; "no published match for image {src}, guessing");
                let name = normalize_reference(&path).trim_start_matches('/');
                (self.titles.url_for(name), None)
            }
        };

        // `image/png` and a bare `png` extension both reduce to `png`.
        let ext = match &mime {
            Some(mime) => mime.rsplit('/').next().unwrap_or("").to_string(),
            None => extension_of(&url).to_string(),
        };
        if is_image_extension(&ext) {
            url = append_suffix(url, &format!("?action=raw&ctype=image/{ext}"));
        }
        Some(url)
    }

    /// Split a reference into path/query/fragment, or flag it external.
    ///
    /// Absolute URLs are external unless http(s) on the target site's own
    /// host; any other scheme (mailto:, tel:, ...) is external too.
    fn classify(&self, reference: &str) -> Reference {
        match Url::parse(reference) {
            Ok(url) => match url.scheme() {
                "http" | "https" => {
                    let same_host = url
                        .host_str()
                        .is_none_or(|host| host == self.titles.host());
                    if same_host {
                        Reference::Local {
                            path: url.path().to_string(),
                            query: url.query().map(str::to_string),
                            fragment: url.fragment().map(str::to_string),
                        }
                    } else {
                        Reference::External
                    }
                }
                _ => Reference::External,
            },
            Err(_) => {
                // No scheme: a local path, possibly with query/fragment.
                let (rest, fragment) = match reference.split_once('#') {
                    Some((r, f)) => (r, Some(f.to_string())),
                    None => (reference, None),
                };
                let (path, query) = match rest.split_once('?') {
                    Some((p, q)) => (p, Some(q.to_string())),
                    None => (rest, None),
                };
                Reference::Local {
                    path: path.to_string(),
                    query,
                    fragment,
                }
            }
        }
    }
}

/// Stylesheet bodies pass through unmodified.
pub fn rewrite_stylesheet(content: &str) -> &str {
    content
}

/// Script bodies pass through unmodified.
pub fn rewrite_script(content: &str) -> &str {
    content
}

/// Rewrite one attribute inside a tag. `rewrite` returning `None` leaves
/// the attribute (and therefore the tag) byte-identical.
fn replace_attr(tag: &str, attr: &Regex, rewrite: impl Fn(&str) -> Option<String>) -> String {
    attr.replace(tag, |caps: &Captures| {
        let whitespace = &caps[1];
        let name = &caps[2];
        let (value, quote) = match (caps.get(3), caps.get(4)) {
            (Some(v), _) => (v.as_str(), '"'),
            (_, Some(v)) => (v.as_str(), '\''),
            _ => return caps[0].to_string(),
        };
        match rewrite(value) {
            Some(new) => format!("{whitespace}{name}={quote}{new}{quote}"),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Append `suffix` unless the URI already ends with it.
fn append_suffix(uri: String, suffix: &str) -> String {
    if uri.ends_with(suffix) {
        uri
    } else {
        format!("{uri}{suffix}")
    }
}

/// Drop everything from the last `.` on (one trailing extension).
fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((head, _)) => head,
        None => path,
    }
}

/// Extension of the last path segment, empty if none.
fn extension_of(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    match segment.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}
