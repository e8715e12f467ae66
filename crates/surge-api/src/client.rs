// Surge HTTP API client
//
// Wraps `reqwest::Client` with base URL construction, the `X-Key` header,
// and the status-code classification every endpoint shares. Endpoint
// methods live in `endpoints/` as inherent impls so this module stays
// focused on transport mechanics.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Async client for one Surge HTTP API endpoint.
///
/// Stateless apart from the pooled connections inside `reqwest::Client`,
/// so a single instance is shared (behind an `Arc`) by every resource
/// refresh and every command. No retries happen here.
#[derive(Debug, Clone)]
pub struct SurgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SurgeClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, API key, and transport config.
    ///
    /// Injects `X-Key` (marked sensitive) and `Accept: application/json`
    /// as default headers on every request.
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-Key", key_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Build `scheme://host:port/v1`, where the scheme is `https` iff
    /// `use_https` is set. Bare IPv6 literals are bracketed.
    pub fn base_url_for(host: &str, port: u16, use_https: bool) -> Result<Url, Error> {
        let scheme = if use_https { "https" } else { "http" };
        let host = host.trim();
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        Ok(Url::parse(&format!("{scheme}://{host}:{port}/v1"))?)
    }

    /// The API root every path is relative to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the API root. Each segment is
    /// percent-encoded, so group names with spaces or slashes stay intact.
    pub(crate) fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url
    }

    // ── Request primitive ────────────────────────────────────────────

    /// Send one request and return the decoded JSON body.
    ///
    /// Fails with exactly one of `Authentication`, `Server`, `BadRequest`,
    /// `Connectivity` or `Format`. An empty 2xx body decodes to `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, Error> {
        let url = self.url(path);
        debug!(%method, %url, "surge request");

        let mut builder = self.http.request(method, url.clone());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|source| Error::Connectivity {
            url: url.to_string(),
            source,
        })?;

        handle_response(&url, resp).await
    }

    /// GET and deserialize into a wire type.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let value = self.request(Method::GET, path, None, query).await?;
        decode(&value)
    }

    /// POST a JSON body, ignoring whatever the server answers with.
    pub(crate) async fn post(&self, path: &[&str], body: Option<&Value>) -> Result<(), Error> {
        self.request(Method::POST, path, body, &[]).await.map(drop)
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(url: &Url, resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    let code = status.as_u16();

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "invalid or missing X-Key".into(),
        });
    }

    if code >= 500 {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Server {
            status: code,
            message: describe(status, &body),
        });
    }

    if (400..500).contains(&code) {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::BadRequest {
            status: code,
            message: describe(status, &body),
        });
    }

    let body = resp.text().await.map_err(|source| Error::Connectivity {
        url: url.to_string(),
        source,
    })?;
    trace!(%url, bytes = body.len(), "surge response");

    if !status.is_success() {
        return Err(Error::Format {
            message: format!("unexpected HTTP {status}"),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| Error::Format {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

/// Deserialize a decoded body into a wire type; a shape mismatch is a
/// format error, same as a non-JSON body.
fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    <T as Deserialize>::deserialize(value).map_err(|e| Error::Format {
        message: format!("unexpected response shape: {e}"),
        body: value.to_string(),
    })
}

fn describe(status: StatusCode, body: &str) -> String {
    let body = preview(body);
    if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
