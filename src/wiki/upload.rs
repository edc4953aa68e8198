//! File upload handshake: single-shot for small files, chunked/resumable
//! for large ones.
//!
//! Single-shot uploads answer a `Warning` (duplicate/existing file) with
//! exactly one retry that reuses the returned `filekey` and forces
//! `ignorewarnings`; a second warning is final failure, bounding retry
//! amplification.
//!
//! Chunked uploads stream fixed-size pieces. The `filekey` assigned by
//! the first chunk response binds all later chunks to one assembling
//! upload on the remote side, and the server-reported `filekey`/`offset`
//! always overwrite local session state. The loop is hard-bounded both
//! per chunk (retry count) and overall (request ceiling), so a
//! misbehaving endpoint cannot spin it forever. A final `filekey`-only
//! commit finalizes assembly and carries the resolved URL and MIME type.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};

use crate::debug;

use super::protocol::{UploadEnvelope, UploadResult};
use super::{DRY_RUN_BASE, WikiClient, WikiError};

/// Default chunk threshold and chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Consecutive no-progress responses tolerated per chunk.
const MAX_CHUNK_RETRIES: u32 = 3;

/// Filekey placeholder used in dry-run mode.
const DRY_RUN_FILEKEY: &str = "-- DRY RUN KEY --";

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub url: String,
    pub mime: String,
}

/// Transient state of one chunked upload, alive for a single file.
///
/// `offset` is monotonically non-decreasing; the session ends when it
/// reaches `total` or the host reports terminal success/error.
struct ChunkSession {
    offset: u64,
    filekey: Option<String>,
    total: u64,
}

impl WikiClient {
    /// Upload a file as an attachment under `title`.
    ///
    /// Files below `chunk_size` go in one request; larger files use the
    /// chunked handshake. `chunk_size == 0` selects the default.
    pub fn upload(
        &self,
        title: &str,
        path: &Path,
        comment: Option<&str>,
        chunk_size: u64,
    ) -> Result<Published, WikiError> {
        let size = std::fs::metadata(path)?.len();
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        if size < chunk_size {
            self.upload_single(title, path, comment)
        } else {
            self.upload_chunked(title, path, size, comment, chunk_size)
        }
    }

    /// One-request upload carrying the whole file.
    fn upload_single(
        &self,
        title: &str,
        path: &Path,
        comment: Option<&str>,
    ) -> Result<Published, WikiError> {
        if self.dry_run {
            debug!("wiki"; "dry-run: upload {title}");
            return Ok(dry_run_published(title));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let form = self
            .upload_form(title, comment)?
            .part("file", Part::bytes(bytes).file_name(file_name));

        let mut upload = self.send_upload(form)?;

        if upload.result.as_deref() == Some("Warning") {
            // One bounded retry, reusing the key the host assigned.
            let filekey = upload.filekey.clone().ok_or_else(|| {
                WikiError::Warning(format!("warning without filekey for {title}"))
            })?;
            debug!("wiki"; "upload warning for {title}, retrying with ignorewarnings");

            let form = self
                .upload_form(title, comment)?
                .text("filekey", filekey)
                .text("ignorewarnings", "1");
            upload = self.send_upload(form)?;

            if upload.result.as_deref() == Some("Warning") {
                return Err(WikiError::Warning(format!(
                    "warning persisted after retry for {title}"
                )));
            }
        }

        published_from(title, upload)
    }

    /// Stream a large file in fixed-size chunks, then commit.
    fn upload_chunked(
        &self,
        title: &str,
        path: &Path,
        total: u64,
        comment: Option<&str>,
        chunk_size: u64,
    ) -> Result<Published, WikiError> {
        let mut session = ChunkSession {
            offset: 0,
            filekey: None,
            total,
        };
        let mut file = File::open(path)?;
        let mut buf = vec![0u8; chunk_size as usize];

        // Hard ceiling on chunk requests, so a host that keeps answering
        // without progress cannot spin the loop.
        let max_requests = 2 * total.div_ceil(chunk_size) + 8;
        let mut requests = 0u64;

        'chunks: while session.offset < session.total {
            file.seek(SeekFrom::Start(session.offset))?;
            let want = (session.total - session.offset).min(chunk_size) as usize;
            file.read_exact(&mut buf[..want])?;

            let mut attempts = 0u32;
            loop {
                requests += 1;
                if requests > max_requests {
                    return Err(WikiError::ChunkProtocol(format!(
                        "request ceiling ({max_requests}) exceeded for {title}"
                    )));
                }

                let response = self.send_chunk(
                    title,
                    &buf[..want],
                    session.offset,
                    session.total,
                    session.filekey.as_deref(),
                    comment,
                )?;

                // Remote values are authoritative over session state.
                if let Some(key) = response.filekey {
                    session.filekey = Some(key);
                }
                if response.result.as_deref() == Some("Success") {
                    session.offset = response.offset.unwrap_or(session.total);
                    break 'chunks;
                }

                let next = response
                    .offset
                    .unwrap_or(session.offset + want as u64);
                if next > session.offset {
                    session.offset = next;
                    continue 'chunks;
                }

                attempts += 1;
                if attempts >= MAX_CHUNK_RETRIES {
                    return Err(WikiError::ChunkProtocol(format!(
                        "no progress at offset {} for {title}",
                        session.offset
                    )));
                }
                debug!("wiki"; "chunk at offset {} not accepted, retrying", session.offset);
            }
        }

        let filekey = session.filekey.ok_or_else(|| {
            WikiError::ChunkProtocol(format!("no filekey assigned for {title}"))
        })?;
        self.commit_chunked(title, &filekey, comment)
    }

    /// Send one chunk; returns the host's (authoritative) upload member.
    fn send_chunk(
        &self,
        title: &str,
        chunk: &[u8],
        offset: u64,
        total: u64,
        filekey: Option<&str>,
        comment: Option<&str>,
    ) -> Result<UploadResult, WikiError> {
        if self.dry_run {
            let next = offset + chunk.len() as u64;
            let result = if next >= total { "Success" } else { "Continue" };
            return Ok(UploadResult {
                result: Some(result.to_string()),
                filekey: Some(DRY_RUN_FILEKEY.to_string()),
                offset: Some(next),
                imageinfo: None,
            });
        }

        let mut form = self
            .upload_form(title, comment)?
            .text("filesize", total.to_string())
            .text("offset", offset.to_string())
            .part("chunk", Part::bytes(chunk.to_vec()).file_name("chunk"));
        if let Some(key) = filekey {
            form = form.text("filekey", key.to_string());
        }

        let upload = self.send_upload(form)?;
        if upload.result.is_none() && upload.offset.is_none() {
            return Err(WikiError::ChunkProtocol(format!(
                "chunk response carries neither result nor offset for {title}"
            )));
        }
        Ok(upload)
    }

    /// Finalize an assembled chunked upload.
    fn commit_chunked(
        &self,
        title: &str,
        filekey: &str,
        comment: Option<&str>,
    ) -> Result<Published, WikiError> {
        if self.dry_run {
            debug!("wiki"; "dry-run: commit {title}");
            return Ok(dry_run_published(title));
        }

        let form = self
            .upload_form(title, comment)?
            .text("filekey", filekey.to_string());
        let upload = self.send_upload(form)?;
        published_from(title, upload)
    }

    /// Base multipart form shared by all upload requests.
    fn upload_form(&self, title: &str, comment: Option<&str>) -> Result<Form, WikiError> {
        let mut form = Form::new()
            .text("format", "json")
            .text("action", "upload")
            .text("filename", title.to_string())
            .text("token", self.token_param()?.to_string());
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            form = form.text("comment", comment.to_string());
        }
        Ok(form)
    }

    /// POST an upload form, unwrap the envelope.
    fn send_upload(&self, form: Form) -> Result<UploadResult, WikiError> {
        let envelope: UploadEnvelope = self
            .http
            .post(&self.api_url)
            .multipart(form)
            .send()?
            .json()?;
        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        Ok(envelope.upload.unwrap_or_default())
    }
}

/// Success requires file info in the response; its absence after the
/// warning retry (or the commit) is failure.
fn published_from(title: &str, upload: UploadResult) -> Result<Published, WikiError> {
    match upload.imageinfo {
        Some(info) => Ok(Published {
            url: info.url,
            mime: info.mime,
        }),
        None => Err(WikiError::MissingFileInfo(title.to_string())),
    }
}

/// Deterministic placeholder for dry-run uploads.
fn dry_run_published(title: &str) -> Published {
    Published {
        url: format!("{DRY_RUN_BASE}/{title}"),
        mime: "text/plain".to_string(),
    }
}
