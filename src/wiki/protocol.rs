//! Wire types for the wiki action API.
//!
//! Envelopes mirror the JSON the host actually sends; every field the
//! client does not consume is ignored. Error payloads share one shape
//! across actions: `{"error": {"code": ..., "info": ...}}`.

use serde::Deserialize;

/// Error payload returned by any API action.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub info: String,
}

/// File info attached to a successful upload response.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInfo {
    pub url: String,
    pub mime: String,
}

/// `upload` member of an upload response.
///
/// `result` is `Success`, `Warning` or `Continue`; `filekey` and `offset`
/// drive the chunked handshake and are authoritative over any local state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResult {
    pub result: Option<String>,
    pub filekey: Option<String>,
    pub offset: Option<u64>,
    pub imageinfo: Option<ImageInfo>,
}

/// Response envelope for `action=upload`.
#[derive(Debug, Deserialize)]
pub struct UploadEnvelope {
    pub upload: Option<UploadResult>,
    pub error: Option<ApiError>,
}

/// Response envelope for `action=edit` (only the error member matters:
/// success is the absence of an error).
#[derive(Debug, Deserialize)]
pub struct EditEnvelope {
    pub error: Option<ApiError>,
}

/// Response envelope for `action=delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteEnvelope {
    pub error: Option<ApiError>,
}

/// Response envelope for `action=query&meta=tokens`.
#[derive(Debug, Deserialize)]
pub struct TokenEnvelope {
    pub query: Option<TokenQuery>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub tokens: Tokens,
}

#[derive(Debug, Deserialize)]
pub struct Tokens {
    pub csrftoken: String,
}

/// One page entry from `list=allpages`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub pageid: u64,
    pub title: String,
}

/// Response envelope for `action=query&list=allpages`.
#[derive(Debug, Deserialize)]
pub struct AllPagesEnvelope {
    pub query: Option<AllPagesQuery>,
    #[serde(rename = "query-continue")]
    pub query_continue: Option<AllPagesContinue>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AllPagesQuery {
    #[serde(default)]
    pub allpages: Vec<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AllPagesContinue {
    pub allpages: ContinueToken,
}

#[derive(Debug, Deserialize)]
pub struct ContinueToken {
    pub apcontinue: String,
}
