//! HTTP client abstraction for upstream calls (the auth provider).
//!
//! The default implementation wraps reqwest. Responses are returned with
//! their status code instead of being turned into errors, because callers
//! relay upstream replies verbatim.

use async_trait::async_trait;
use std::collections::HashMap;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(
        &self,
        url: String,
        headers: HashMap<String, String>,
        body: String,
    ) -> Result<HttpResponse, Error>;
}

#[derive(Clone, Default)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn post(
        &self,
        url: String,
        headers: HashMap<String, String>,
        body: String,
    ) -> Result<HttpResponse, Error> {
        let mut request = self.client.post(&url).body(body);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
