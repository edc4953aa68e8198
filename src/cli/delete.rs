//! The `delete` command: remove remote pages under a title prefix.
//!
//! Every page is confirmed on the console before deletion unless quiet
//! mode accepts them all. Deletion failures are per-page and non-fatal.

use std::io::Write;

use anyhow::{Context, Result, bail};

use crate::cli::DeleteArgs;
use crate::config::Settings;
use crate::title::TitleResolver;
use crate::wiki::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_LIMIT, WikiClient};
use crate::{log, logger};

/// Entry point for `wikiup delete`.
pub fn run(args: &DeleteArgs, settings: &Settings) -> Result<()> {
    if !settings.dry_run && (settings.username.is_none() || settings.password.is_none()) {
        bail!("username and password are required (flags, or [auth] in wikiup.toml)");
    }

    let titles = TitleResolver::new(
        settings.team.as_deref(),
        settings.prefix.as_deref(),
        settings.year,
    );
    let mut client =
        WikiClient::new(settings.year, settings.dry_run).context("cannot build API client")?;
    client
        .login(
            settings.username.as_deref().unwrap_or_default(),
            settings.password.as_deref().unwrap_or_default(),
        )
        .context("login failed")?;

    let resolved = titles.resolve(&args.prefix);
    let mut pages = Vec::new();
    for batch in client.search_pages(&resolved, DEFAULT_PAGE_LIMIT, DEFAULT_MAX_PAGES) {
        pages.extend(batch.context("page search failed")?);
    }
    log!("wiki"; "found {} pages matching '{resolved}'", pages.len());

    let mut deleted = 0usize;
    for page in &pages {
        let confirmed = logger::is_quiet()
            || ask_confirm(&format!("Do you really want to DELETE page {}?", page.title))?;
        if !confirmed {
            continue;
        }
        match client.delete_page(&page.title, args.reason.as_deref()) {
            Ok(()) => {
                log!("wiki"; "deleted {}", page.title);
                deleted += 1;
            }
            Err(err) => log!("error"; "failed to delete {}: {err}", page.title),
        }
    }
    log!("wiki"; "deleted {deleted} pages");
    Ok(())
}

/// Ask a yes/no question on the console. Anything but an explicit yes
/// counts as no.
fn ask_confirm(question: &str) -> Result<bool> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{question} [Y/n] ")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" | "" => Ok(false),
        _ => {
            log!("warning"; "no valid answer given, taking NO");
            Ok(false)
        }
    }
}
