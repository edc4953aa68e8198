//! Scripted mock wiki API server for tests.
//!
//! Serves a fixed sequence of canned response bodies (one per incoming
//! request, in order) and records everything it received so tests can
//! assert on methods, URLs and bodies afterwards.

use std::io::Read;
use std::thread::JoinHandle;

use tiny_http::{Header, Response, Server};

/// One recorded request.
pub struct ReceivedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// A mock wiki API endpoint backed by a scripted response sequence.
pub struct MockWiki {
    base: String,
    handle: Option<JoinHandle<Vec<ReceivedRequest>>>,
}

impl MockWiki {
    /// Start the server. It answers exactly `responses.len()` requests,
    /// then stops accepting.
    pub fn start(responses: Vec<String>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let base = format!("http://127.0.0.1:{port}");

        let handle = std::thread::spawn(move || {
            let mut received = Vec::new();
            for body in responses {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut content = String::new();
                let _ = request.as_reader().read_to_string(&mut content);
                received.push(ReceivedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: content,
                });

                let header =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let _ = request.respond(Response::from_string(body).with_header(header));
            }
            received
        });

        Self {
            base,
            handle: Some(handle),
        }
    }

    /// API endpoint URL.
    pub fn api_url(&self) -> String {
        format!("{}/api.php", self.base)
    }

    /// Login endpoint URL. Ends with the confirmation marker so the
    /// client's redirect check passes without an actual redirect.
    pub fn login_url(&self) -> String {
        format!("{}/Login_Confirmed", self.base)
    }

    /// Wait for the scripted exchange to finish and return what the
    /// server saw.
    pub fn finish(mut self) -> Vec<ReceivedRequest> {
        self.handle.take().unwrap().join().unwrap()
    }
}

/// Extract a text field value from a multipart body.
pub fn multipart_value(body: &str, field: &str) -> Option<String> {
    let marker = format!("name=\"{field}\"");
    let idx = body.find(&marker)?;
    let rest = &body[idx + marker.len()..];
    let start = rest.find("\r\n\r\n")? + 4;
    let end = rest[start..].find("\r\n")? + start;
    Some(rest[start..end].to_string())
}

/// Byte length of a file part's payload in a multipart body.
pub fn multipart_part_len(body: &str, field: &str) -> Option<usize> {
    let marker = format!("name=\"{field}\"");
    let idx = body.find(&marker)?;
    let rest = &body[idx + marker.len()..];
    let start = rest.find("\r\n\r\n")? + 4;
    let end = rest[start..].find("\r\n--")? + start;
    Some(end - start)
}
