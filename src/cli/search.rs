//! The `search` command: list remote pages under a title prefix.

use anyhow::{Context, Result};

use crate::cli::SearchArgs;
use crate::config::Settings;
use crate::log;
use crate::title::TitleResolver;
use crate::wiki::WikiClient;

/// Entry point for `wikiup search`.
pub fn run(args: &SearchArgs, settings: &Settings) -> Result<()> {
    let titles = TitleResolver::new(
        settings.team.as_deref(),
        settings.prefix.as_deref(),
        settings.year,
    );
    let client =
        WikiClient::new(settings.year, settings.dry_run).context("cannot build API client")?;

    let resolved = titles.resolve(&args.prefix);
    log!("wiki"; "pages starting with '{resolved}':");

    let mut index = 0usize;
    for batch in client.search_pages(&resolved, args.limit, args.max_pages) {
        for page in batch.context("page search failed")? {
            println!("{index:3}. {} [{}]", page.title, page.pageid);
            index += 1;
        }
    }
    log!("wiki"; "{index} pages found");
    Ok(())
}
