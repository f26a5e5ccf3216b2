use crate::domain::entities::{Request, Response};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use hyper::header::{HeaderName, HeaderValue};

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Application service for orchestrating HTTP request workflows
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// Validates and sends a single request. Every received status is a
    /// successful outcome here.
    pub async fn send_request(&self, request: Request) -> Result<Response> {
        self.validate_request(&request)?;
        log::debug!("sending {} {}", request.method, request.url.as_str());
        self.http_client.send(request).await
    }

    fn validate_request(&self, request: &Request) -> Result<()> {
        RequestValidator::validate(request)
    }
}

/// Checks that run before anything touches the network
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate(request: &Request) -> Result<()> {
        Self::validate_url(&request.url)?;
        Self::validate_headers(&request.headers)?;
        Ok(())
    }

    fn validate_url(url: &crate::domain::value_objects::Url) -> Result<()> {
        match url.scheme() {
            Some("http") | Some("https") => {}
            _ => return Err(anyhow!("URL must start with http:// or https://")),
        }
        if url.0.host().is_none_or(str::is_empty) {
            return Err(anyhow!("URL has no host: '{}'", url.as_str()));
        }
        Ok(())
    }

    fn validate_headers(headers: &[(String, String)]) -> Result<()> {
        for (name, value) in headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| anyhow!("Invalid header name: '{}'", name))?;
            HeaderValue::from_str(value)
                .map_err(|_| anyhow!("Invalid value for header '{}'", name))?;
        }
        Ok(())
    }
}
