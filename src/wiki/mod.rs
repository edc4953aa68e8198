//! Client for the wiki action API.
//!
//! One [`WikiClient`] lives for the whole run. It logs in once, obtains
//! the CSRF token once, and attaches it to every later request. Dry-run
//! mode is first-class: every method short-circuits before the network
//! and synthesizes a deterministic placeholder response while executing
//! the same control flow, so the full pipeline can be exercised offline.

mod pages;
mod protocol;
mod upload;

#[cfg(test)]
pub mod mock;

pub use pages::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_LIMIT, PageSearch};
pub use protocol::PageInfo;
pub use upload::{DEFAULT_CHUNK_SIZE, Published};

use crate::debug;
use protocol::{ApiError, EditEnvelope, TokenEnvelope};

/// Login endpoint shared by all wiki editions.
const LOGIN_URL: &str = "https://igem.org/Login2";

/// Token placeholder used in dry-run mode.
const DRY_RUN_TOKEN: &str = "-- DRY RUN TOKEN --";

/// Base of the placeholder URLs synthesized for dry-run uploads.
pub const DRY_RUN_BASE: &str = "http://DRY.RUN";

/// Errors from the wiki API client.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {code}: {info}")]
    Api { code: String, info: String },

    #[error("login failed: {0}")]
    Login(String),

    #[error("no edit token - login first")]
    MissingToken,

    #[error("upload warning not resolved: {0}")]
    Warning(String),

    #[error("upload response carries no file info for {0}")]
    MissingFileInfo(String),

    #[error("chunk protocol error: {0}")]
    ChunkProtocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for WikiError {
    fn from(e: ApiError) -> Self {
        Self::Api {
            code: e.code,
            info: e.info,
        }
    }
}

/// Blocking client for one wiki edition.
pub struct WikiClient {
    http: reqwest::blocking::Client,
    api_url: String,
    login_url: String,
    token: Option<String>,
    dry_run: bool,
}

impl WikiClient {
    /// Create a client for the given wiki edition year.
    pub fn new(year: u16, dry_run: bool) -> Result<Self, WikiError> {
        Self::with_endpoints(
            format!("https://{year}.igem.org/wiki/api.php"),
            LOGIN_URL.to_string(),
            dry_run,
        )
    }

    /// Create a client against explicit endpoints (tests point this at a
    /// local mock server).
    pub fn with_endpoints(
        api_url: String,
        login_url: String,
        dry_run: bool,
    ) -> Result<Self, WikiError> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            api_url,
            login_url,
            token: None,
            dry_run,
        })
    }

    /// The CSRF token, if obtained.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token for token-carrying requests.
    fn token_param(&self) -> Result<&str, WikiError> {
        self.token.as_deref().ok_or(WikiError::MissingToken)
    }

    /// Log in and obtain the edit token. Called once per run.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), WikiError> {
        if self.dry_run {
            self.token = Some(DRY_RUN_TOKEN.to_string());
            debug!("wiki"; "dry-run: skipping login");
            return Ok(());
        }

        let response = self
            .http
            .post(&self.login_url)
            .form(&[
                ("return_to", ""),
                ("username", username),
                ("password", password),
                ("Login", "Login"),
            ])
            .send()?;

        // The account server answers with a redirect to the confirmation
        // page; anything else means the credentials were rejected.
        if !response.url().as_str().ends_with("Login_Confirmed") {
            return Err(WikiError::Login(format!(
                "credentials rejected for {username}"
            )));
        }

        self.obtain_token()
    }

    /// Fetch the CSRF token attached to every mutating request.
    fn obtain_token(&mut self) -> Result<(), WikiError> {
        let envelope: TokenEnvelope = self
            .http
            .get(&self.api_url)
            .query(&[
                ("format", "json"),
                ("action", "query"),
                ("meta", "tokens"),
            ])
            .send()?
            .json()?;

        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        let token = envelope
            .query
            .map(|q| q.tokens.csrftoken)
            .ok_or_else(|| WikiError::Login("token response carries no csrftoken".to_string()))?;

        debug!("wiki"; "obtained edit token");
        self.token = Some(token);
        Ok(())
    }

    /// Replace a page's content with `text`.
    pub fn edit(&self, title: &str, text: &str) -> Result<(), WikiError> {
        if self.dry_run {
            debug!("wiki"; "dry-run: edit {title}");
            return Ok(());
        }

        let token = self.token_param()?;
        let envelope: EditEnvelope = self
            .http
            .post(&self.api_url)
            .form(&[
                ("format", "json"),
                ("action", "edit"),
                ("assert", "user"),
                ("title", title),
                ("text", text),
                ("token", token),
            ])
            .send()?
            .json()?;

        match envelope.error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}
