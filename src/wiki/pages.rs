//! Page listing and deletion.
//!
//! `list=allpages` results arrive in pages linked by a continuation
//! token. [`PageSearch`] follows them lazily and iteratively, bounded by
//! a caller-supplied maximum page count, so a very large namespace can
//! neither recurse unboundedly nor be fetched eagerly.

use crate::log;

use super::protocol::{AllPagesEnvelope, DeleteEnvelope, PageInfo};
use super::{WikiClient, WikiError};

/// Results requested per API page.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Default bound on API pages fetched per search.
pub const DEFAULT_MAX_PAGES: u32 = 32;

impl WikiClient {
    /// Lazily iterate pages whose title starts with `prefix` (already
    /// resolved into the target namespace), at most `max_pages` API
    /// pages of `limit` results each.
    pub fn search_pages(&self, prefix: &str, limit: u32, max_pages: u32) -> PageSearch<'_> {
        PageSearch {
            client: self,
            prefix: prefix.to_string(),
            limit,
            max_pages,
            fetched: 0,
            continuation: None,
            done: false,
        }
    }

    /// One `list=allpages` request. Returns the page entries and the
    /// continuation token, if any.
    fn all_pages(
        &self,
        prefix: &str,
        limit: u32,
        continuation: Option<&str>,
    ) -> Result<(Vec<PageInfo>, Option<String>), WikiError> {
        if self.dry_run {
            return Ok((Vec::new(), None));
        }

        let limit = limit.to_string();
        let mut params = vec![
            ("format", "json"),
            ("action", "query"),
            ("list", "allpages"),
            ("apprefix", prefix),
            ("aplimit", limit.as_str()),
        ];
        if let Some(token) = continuation {
            params.push(("apcontinue", token));
        }

        let envelope: AllPagesEnvelope = self
            .http
            .get(&self.api_url)
            .query(&params)
            .send()?
            .json()?;

        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        let pages = envelope.query.map(|q| q.allpages).unwrap_or_default();
        let continuation = envelope.query_continue.map(|c| c.allpages.apcontinue);
        Ok((pages, continuation))
    }

    /// Delete one page. Success is the absence of an error payload.
    pub fn delete_page(&self, title: &str, reason: Option<&str>) -> Result<(), WikiError> {
        if self.dry_run {
            return Ok(());
        }

        let token = self.token_param()?;
        let mut params = vec![
            ("format", "json"),
            ("action", "delete"),
            ("title", title),
            ("token", token),
        ];
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            params.push(("reason", reason));
        }

        let envelope: DeleteEnvelope = self
            .http
            .post(&self.api_url)
            .form(&params)
            .send()?
            .json()?;

        match envelope.error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

/// Lazy, bounded iterator over `allpages` result pages.
pub struct PageSearch<'a> {
    client: &'a WikiClient,
    prefix: String,
    limit: u32,
    max_pages: u32,
    fetched: u32,
    continuation: Option<String>,
    done: bool,
}

impl Iterator for PageSearch<'_> {
    type Item = Result<Vec<PageInfo>, WikiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.fetched >= self.max_pages {
            self.done = true;
            log!(
                "warning";
                "page search for '{}' stopped after {} pages; more results were dropped",
                self.prefix,
                self.max_pages
            );
            return None;
        }

        match self
            .client
            .all_pages(&self.prefix, self.limit, self.continuation.as_deref())
        {
            Ok((pages, continuation)) => {
                self.fetched += 1;
                match continuation {
                    Some(token) => self.continuation = Some(token),
                    None => self.done = true,
                }
                Some(Ok(pages))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockWiki;
    use super::*;

    fn client_for(mock: &MockWiki) -> WikiClient {
        WikiClient::with_endpoints(mock.api_url(), mock.login_url(), false).unwrap()
    }

    const PAGE_ONE: &str = r#"{"query":{"allpages":[
        {"pageid":1,"ns":0,"title":"Team:X/a"},
        {"pageid":2,"ns":0,"title":"Team:X/b"}]},
        "query-continue":{"allpages":{"apcontinue":"Team:X/c"}}}"#;
    const PAGE_TWO: &str = r#"{"query":{"allpages":[
        {"pageid":3,"ns":0,"title":"Team:X/c"}]}}"#;

    #[test]
    fn test_search_follows_continuation() {
        let mock = MockWiki::start(vec![PAGE_ONE.to_string(), PAGE_TWO.to_string()]);
        let client = client_for(&mock);

        let pages: Vec<_> = client
            .search_pages("Team:X", 50, 32)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].title, "Team:X/c");

        let received = mock.finish();
        assert_eq!(received.len(), 2);
        assert!(received[0].url.contains("apprefix=Team%3AX"));
        assert!(!received[0].url.contains("apcontinue"));
        assert!(received[1].url.contains("apcontinue=Team%3AX%2Fc"));
    }

    #[test]
    fn test_search_respects_page_cap() {
        // Both responses advertise a continuation; the cap stops after one.
        let mock = MockWiki::start(vec![PAGE_ONE.to_string()]);
        let client = client_for(&mock);

        let batches: Vec<_> = client.search_pages("Team:X", 50, 1).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].as_ref().unwrap().len(), 2);
        mock.finish();
    }

    #[test]
    fn test_search_stops_on_missing_continuation() {
        let mock = MockWiki::start(vec![PAGE_TWO.to_string()]);
        let client = client_for(&mock);

        let batches: Vec<_> = client.search_pages("Team:X", 50, 32).collect();
        assert_eq!(batches.len(), 1);
        mock.finish();
    }

    #[test]
    fn test_search_error_is_terminal() {
        let mock = MockWiki::start(vec![
            r#"{"error":{"code":"readapidenied","info":"denied"}}"#.to_string(),
        ]);
        let client = client_for(&mock);

        let mut search = client.search_pages("Team:X", 50, 32);
        assert!(search.next().unwrap().is_err());
        assert!(search.next().is_none());
        mock.finish();
    }

    #[test]
    fn test_dry_run_search_is_empty_and_offline() {
        let client = WikiClient::new(2024, true).unwrap();
        let batches: Vec<_> = client.search_pages("Team:X", 50, 32).collect();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_delete_posts_title_and_reason() {
        let mock = MockWiki::start(vec![
            "ok".to_string(),
            r#"{"query":{"tokens":{"csrftoken":"tok"}}}"#.to_string(),
            r#"{"delete":{"title":"Team:X/a"}}"#.to_string(),
        ]);
        let mut client = client_for(&mock);
        client.login("user", "pass").unwrap();

        client.delete_page("Team:X/a", Some("cleanup")).unwrap();

        let received = mock.finish();
        let body = &received[2].body;
        assert!(body.contains("action=delete"));
        assert!(body.contains("reason=cleanup"));
    }
}
