//! The `upload` command: the asset publish pipeline.
//!
//! Strictly sequential, in a fixed kind order: resources, then
//! stylesheets, then scripts, then HTML. By the time an asset's content
//! is rewritten, every asset kind it could reference has already been
//! through publication, so rewrites see resolved URLs instead of
//! guesses. Within a kind, assets keep discovery order, and each
//! successful publish is visible to the very next rewrite.
//!
//! Failures are per-asset and non-fatal: the failed asset stays pending
//! and the run continues. The exit status reflects whether every
//! collected asset reached the published set.

use anyhow::{Context, Result, bail};

use crate::asset::{Asset, AssetKind, PUBLISH_ORDER, Registry, collect_patterns, normalize_reference};
use crate::config::Settings;
use crate::log;
use crate::rewrite::{LinkRewriter, rewrite_script, rewrite_stylesheet};
use crate::title::TitleResolver;
use crate::wiki::WikiClient;

/// Entry point for `wikiup upload`.
pub fn run(patterns: &[String], settings: &Settings) -> Result<()> {
    if !settings.dry_run && (settings.username.is_none() || settings.password.is_none()) {
        bail!("username and password are required (flags, or [auth] in wikiup.toml)");
    }

    let mut client =
        WikiClient::new(settings.year, settings.dry_run).context("cannot build API client")?;
    client
        .login(
            settings.username.as_deref().unwrap_or_default(),
            settings.password.as_deref().unwrap_or_default(),
        )
        .context("login failed")?;

    let registry = execute(&client, patterns, settings)?;
    if !registry.pending().is_empty() {
        bail!("{} asset(s) failed to publish", registry.pending().len());
    }
    Ok(())
}

/// Collect, order, rewrite and publish all assets. Returns the registry
/// so callers can inspect what ended up published vs. pending.
pub(crate) fn execute(
    client: &WikiClient,
    patterns: &[String],
    settings: &Settings,
) -> Result<Registry> {
    let titles = TitleResolver::new(
        settings.team.as_deref(),
        settings.prefix.as_deref(),
        settings.year,
    );

    let assets = collect_patterns(patterns, settings.strip);
    if assets.is_empty() {
        log!("warning"; "patterns matched no files");
        return Ok(Registry::new(vec![]));
    }
    let total = assets.len();
    let mut registry = Registry::new(assets);

    for kind in PUBLISH_ORDER {
        let batch = registry.take_kind(kind);
        if batch.is_empty() {
            continue;
        }
        log!("upload"; "publishing {} {}", batch.len(), kind.plural());

        for mut asset in batch {
            normalize_destination(&mut asset, &titles);
            if let Some(destination) = asset.destination()
                && registry.is_destination_published(destination)
            {
                log!(
                    "warning";
                    "duplicate destination {destination}; remote content will be overwritten"
                );
            }

            match publish_asset(client, &titles, &registry, &mut asset, settings) {
                Ok(()) => {
                    log!("upload"; "published {asset}");
                    registry.push_published(asset);
                }
                Err(err) => {
                    log!("error"; "failed to publish {asset}: {err:#}");
                    registry.push_pending(asset);
                }
            }
        }
    }

    log!(
        "upload";
        "published {} of {} assets",
        registry.published().len(),
        total
    );
    Ok(registry)
}

/// Assign the canonical destination title, exactly once per asset.
///
/// Pages lose their extension (`css/style.css` publishes as `css/style`);
/// resources keep theirs. The remainder is resolved into the namespace.
fn normalize_destination(asset: &mut Asset, titles: &TitleResolver) {
    let name = asset
        .destination()
        .map(str::to_string)
        .unwrap_or_else(|| asset.source_str());
    let trimmed = normalize_reference(&name).trim_start_matches('/');

    let suffix = format!(".{}", asset.extension());
    let bare = if asset.kind().is_page() {
        trimmed.strip_suffix(&suffix).unwrap_or(trimmed)
    } else {
        trimmed
    };

    asset.set_destination(titles.resolve(bare));
}

/// Publish one asset: rewrite (HTML), then edit or upload, then record
/// the outcome write-once.
fn publish_asset(
    client: &WikiClient,
    titles: &TitleResolver,
    registry: &Registry,
    asset: &mut Asset,
    settings: &Settings,
) -> Result<()> {
    let destination = asset
        .destination()
        .context("destination not assigned")?
        .to_string();

    if asset.kind().is_page() {
        let text = std::fs::read_to_string(asset.source())
            .with_context(|| format!("cannot read {}", asset.source().display()))?;
        let content = match asset.kind() {
            AssetKind::Html => LinkRewriter::new(registry, titles).rewrite_html(&text),
            AssetKind::Stylesheet => rewrite_stylesheet(&text).to_string(),
            _ => rewrite_script(&text).to_string(),
        };
        client.edit(&destination, &content)?;
        asset.mark_published(Some(titles.url_for(&destination)), None);
    } else {
        let published = client.upload(
            &destination,
            asset.source(),
            settings.comment.as_deref(),
            settings.chunk_size,
        )?;
        asset.mark_published(Some(published.url), Some(published.mime));
    }
    Ok(())
}
