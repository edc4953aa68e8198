//! Asset discovery from glob-like patterns (pure filesystem traversal).
//!
//! Patterns may carry `*` / `?` wildcards in their final path component
//! (`site/*.html`, `assets/*`). Matching directories recurse depth-first,
//! each entry re-expanded as `entry/*`; matching files are collected as
//! leaves. Nothing is deduplicated: duplicate destinations are a known,
//! accepted edge case handled at publish time.
//!
//! In strip mode the **pattern's directory** is recorded on each asset so
//! the computed destination drops that prefix (`assets/css/style.css`
//! under pattern `assets/*` publishes as `css/style.css`).

use std::path::Path;

use crate::debug;

use super::Asset;

/// Expand an ordered sequence of patterns into an ordered asset list.
///
/// Patterns that match nothing silently contribute zero entries.
pub fn collect_patterns(patterns: &[String], strip: bool) -> Vec<Asset> {
    let mut results = Vec::new();
    for pattern in patterns {
        let before = results.len();
        let base = strip
            .then(|| Path::new(pattern).parent())
            .flatten()
            .map(|p| p.to_string_lossy().into_owned());
        collect_pattern(&mut results, pattern, base.as_deref());
        debug!(
            "collect";
            "collected {} files matching pattern {}",
            results.len() - before,
            pattern
        );
    }
    debug!("collect"; "collected {} files in total", results.len());
    results
}

/// Expand one pattern, recursing into matched directories.
fn collect_pattern(results: &mut Vec<Asset>, pattern: &str, base: Option<&str>) {
    for source in expand_pattern(pattern) {
        let path = Path::new(&source);
        if path.is_dir() {
            let sub = format!("{}/*", source.trim_end_matches('/'));
            collect_pattern(results, &sub, base);
        } else if path.is_file() {
            results.push(Asset::new(path.to_path_buf(), base.map(str::to_string)));
        }
    }
}

/// Expand wildcards in the final component of `pattern` against the
/// filesystem. A pattern without wildcards matches itself if it exists.
///
/// Matches are sorted so discovery order is deterministic.
fn expand_pattern(pattern: &str) -> Vec<String> {
    let (dir, leaf) = match pattern.rfind('/') {
        Some(idx) => (&pattern[..idx], &pattern[idx + 1..]),
        None => ("", pattern),
    };

    if !leaf.contains(['*', '?']) {
        return if Path::new(pattern).exists() {
            vec![pattern.to_string()]
        } else {
            Vec::new()
        };
    }

    let search_dir = if dir.is_empty() { "." } else { dir };
    let Ok(entries) = std::fs::read_dir(search_dir) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if wildcard_match(leaf, name) {
            if dir.is_empty() {
                matches.push(name.to_string());
            } else {
                matches.push(format!("{dir}/{name}"));
            }
        }
    }
    matches.sort();
    matches
}

/// Match `name` against a pattern of literal characters, `*` (any run)
/// and `?` (any single character).
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = name.chars().collect();

    // Iterative backtracking over the last `*` seen.
    let (mut p, mut t) = (0, 0);
    let (mut star, mut star_t) = (None, 0);
    while t < text.len() {
        if p < pat.len() && (pat[p] == '?' || pat[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetKind;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn pattern(dir: &Path, rel: &str) -> String {
        dir.join(rel).to_string_lossy().into_owned()
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("*.html", "index.html"));
        assert!(!wildcard_match("*.html", "style.css"));
        assert!(wildcard_match("a?c", "abc"));
        assert!(!wildcard_match("a?c", "abbc"));
        assert!(wildcard_match("st*le.*", "style.css"));
        assert!(wildcard_match("*", ""));
        assert!(!wildcard_match("?", ""));
    }

    #[test]
    fn test_nonexistent_pattern_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let assets = collect_patterns(&[pattern(dir.path(), "missing/*.html")], false);
        assert!(assets.is_empty());
    }

    #[test]
    fn test_literal_pattern_matches_single_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.html");
        let assets = collect_patterns(&[pattern(dir.path(), "index.html")], false);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].kind(), AssetKind::Html);
    }

    #[test]
    fn test_wildcard_pattern_matches_by_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site/index.html");
        touch(dir.path(), "site/about.html");
        touch(dir.path(), "site/style.css");

        let assets = collect_patterns(&[pattern(dir.path(), "site/*.html")], false);
        assert_eq!(assets.len(), 2);
        assert!(assets.iter().all(|a| a.kind() == AssetKind::Html));
    }

    #[test]
    fn test_directories_recurse_depth_first() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site/index.html");
        touch(dir.path(), "site/css/style.css");
        touch(dir.path(), "site/img/logo.png");

        let assets = collect_patterns(&[pattern(dir.path(), "site")], false);
        assert_eq!(assets.len(), 3);
    }

    #[test]
    fn test_strip_records_pattern_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "assets/css/style.css");

        let assets = collect_patterns(&[pattern(dir.path(), "assets/*")], true);
        assert_eq!(assets.len(), 1);
        // Destination is the source with the pattern directory removed once.
        let dest = assets[0].destination().unwrap();
        assert_eq!(dest.trim_start_matches('/'), "css/style.css");
    }

    #[test]
    fn test_without_strip_no_destination_yet() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "assets/logo.png");

        let assets = collect_patterns(&[pattern(dir.path(), "assets/*")], false);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].destination(), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site/index.html");

        let p = pattern(dir.path(), "site/*.html");
        let assets = collect_patterns(&[p.clone(), p], false);
        assert_eq!(assets.len(), 2);
    }

    #[test]
    fn test_patterns_keep_given_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/page.html");
        touch(dir.path(), "a/style.css");

        let assets = collect_patterns(
            &[pattern(dir.path(), "b/*"), pattern(dir.path(), "a/*")],
            false,
        );
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].kind(), AssetKind::Html);
        assert_eq!(assets[1].kind(), AssetKind::Stylesheet);
    }
}
