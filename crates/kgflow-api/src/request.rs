//! HTTP request descriptor handed to the host's HTTP primitive

use kgflow_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound call: method, absolute URL, optional JSON body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Request and response are JSON.
    pub json: bool,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self::new(HttpMethod::Get, url, None)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(HttpMethod::Delete, url, None)
    }

    pub fn post(url: Url, body: Option<Value>) -> Self {
        Self::new(HttpMethod::Post, url, body)
    }

    fn new(method: HttpMethod, url: Url, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            body,
            json: true,
        }
    }
}

/// Join path segments onto a base URL. Segments are percent-encoded, so ids
/// containing `/`, `?` or spaces stay inside one segment. An empty final
/// segment produces a trailing slash.
pub fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| Error::invalid_base_url(base_url, e.to_string()))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| Error::invalid_base_url(base_url, "cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
