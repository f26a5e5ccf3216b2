use crate::application::services::{HttpClient, HttpRequestService};
use crate::domain::entities::{Method as DomainMethod, Request, Response, ResponseBody};
use crate::domain::errors::FetchError;
use crate::domain::value_objects::{Credentials, RequestBody};
use crate::infrastructure::config::ClientConfig;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, AUTHORIZATION, USER_AGENT};
use hyper::{Method, Request as HyperRequest};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Infrastructure implementation of HttpClient using Hyper.
/// A fresh connector is built per request so `Request::verify_tls` decides
/// how certificates are checked.
pub struct HyperHttpClient {
    config: ClientConfig,
}

impl HyperHttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Creates a configured HTTP request service using this client
    pub fn create_request_service(self) -> HttpRequestService {
        HttpRequestService::new(Box::new(self))
    }

    fn build_client(verify_tls: bool) -> Result<HttpsClient> {
        let connector = ConnectorAdapter::https_connector(verify_tls)?;
        Ok(Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(connector))
    }
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, request: Request) -> Result<Response> {
        let client = Self::build_client(request.verify_tls)?;
        let hyper_request = RequestAdapter::to_hyper_request(request, &self.config)?;
        let hyper_response = self.execute_http_request(&client, hyper_request).await?;
        ResponseAdapter::to_domain_response(hyper_response).await
    }
}

impl HyperHttpClient {
    async fn execute_http_request(
        &self,
        client: &HttpsClient,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<hyper::Response<hyper::body::Incoming>> {
        client.request(request).await.map_err(|e| {
            log::debug!("request failed: {:?}", e);
            anyhow::Error::new(FetchError::NoResponse(Box::new(e)))
        })
    }
}

/// Builds the HTTPS-capable connector, optionally without certificate checks
struct ConnectorAdapter;

impl ConnectorAdapter {
    fn https_connector(verify_tls: bool) -> Result<HttpsConnector<HttpConnector>> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .danger_accept_invalid_hostnames(!verify_tls)
            .build()
            .map_err(|e| anyhow!("Failed to initialise TLS: {}", e))?;

        Ok(HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls))))
    }
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(domain_request: Request, config: &ClientConfig) -> Result<HyperRequest<Full<Bytes>>> {
        let method = MethodAdapter::to_hyper_method(&domain_request.method)?;
        let body = BodyAdapter::to_hyper_body(&domain_request.body);

        let mut builder = HyperRequest::builder()
            .method(method)
            .uri(domain_request.url.0.clone());

        builder = HeaderAdapter::add_user_headers(builder, &domain_request.headers);
        builder = HeaderAdapter::add_basic_auth(builder, &domain_request.basic_auth);
        if domain_request.header(USER_AGENT.as_str()).is_none() {
            builder = builder.header(USER_AGENT, config.user_agent.as_str());
        }

        builder.body(body)
            .map_err(|e| anyhow!("Failed to build HTTP request: {}", e))
    }
}

/// Adapter for converting domain responses from Hyper responses
struct ResponseAdapter;

impl ResponseAdapter {
    async fn to_domain_response(hyper_response: hyper::Response<hyper::body::Incoming>) -> Result<Response> {
        let status = hyper_response.status();
        let version = hyper_response.version();
        let reason = Self::reason_phrase(&hyper_response);
        let headers = Self::collect_headers(hyper_response.headers());
        let body = Self::extract_response_body(hyper_response)
            .await
            .map_err(|e| {
                log::debug!("response body interrupted: {:?}", e);
                anyhow::Error::new(FetchError::Status { code: status, text: reason.clone() })
            })?;

        log::debug!("received {} ({} body bytes)", status, body.len());

        Ok(Response {
            status,
            reason,
            version,
            headers,
            body: ResponseBody::classify(body),
        })
    }

    /// Wire reason phrase when the server sent a non-canonical one
    fn reason_phrase(response: &hyper::Response<hyper::body::Incoming>) -> String {
        response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
            .or_else(|| response.status().canonical_reason().map(str::to_string))
            .unwrap_or_default()
    }

    /// `HeaderMap` groups repeated names, so interleaved duplicates such as
    /// two `Set-Cookie` lines around another header come out adjacent.
    fn collect_headers(headers: &hyper::HeaderMap) -> Vec<(String, String)> {
        headers
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect()
    }

    async fn extract_response_body(response: hyper::Response<hyper::body::Incoming>) -> Result<Bytes, hyper::Error> {
        Ok(response.into_body().collect().await?.to_bytes())
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: &DomainMethod) -> Result<Method> {
        Ok(match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Options => Method::OPTIONS,
            DomainMethod::Extension(name) => Method::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Unsupported HTTP method '{}': {}", name, e))?,
        })
    }
}

/// Adapter for converting domain request bodies to Hyper bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_hyper_body(domain_body: &Option<RequestBody>) -> Full<Bytes> {
        match domain_body {
            Some(body) => Full::new(Bytes::copy_from_slice(body.as_bytes())),
            None => Full::new(Bytes::new()),
        }
    }
}

/// Adapter for handling HTTP headers
struct HeaderAdapter;

impl HeaderAdapter {
    fn add_user_headers(
        mut builder: http::request::Builder,
        headers: &[(String, String)],
    ) -> http::request::Builder {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn add_basic_auth(
        builder: http::request::Builder,
        credentials: &Option<Credentials>,
    ) -> http::request::Builder {
        match credentials {
            Some(credentials) => match HeaderValue::from_str(&credentials.header_value()) {
                Ok(value) => builder.header(AUTHORIZATION, value),
                Err(_) => builder,
            },
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builders::request_builder::RequestBuilder;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP/1.1 response and hands back the raw request text.
    async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(raw);
        });

        (format!("http://{}", addr), rx)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn request(url: &str, headers: &[&str], body: Option<&str>, user: Option<&str>) -> Request {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        RequestBuilder::new()
            .method(if body.is_some() { "POST" } else { "GET" })
            .unwrap()
            .url(url)
            .unwrap()
            .headers(&headers)
            .body(body)
            .user(user)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn decodes_json_responses() {
        let (base, _rx) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 7\r\nConnection: close\r\n\r\n{\"a\":1}",
        )
        .await;

        let response = HyperHttpClient::default()
            .send(request(&format!("{}/ok", base), &[], None, None))
            .await
            .unwrap();

        assert_eq!(response.status, hyper::StatusCode::OK);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.version, hyper::Version::HTTP_11);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.body, ResponseBody::Decoded(json!({"a": 1})));
    }

    #[tokio::test]
    async fn error_statuses_are_responses_with_wire_reason() {
        let (base, _rx) = serve_once(
            "HTTP/1.1 404 Nothing Here\r\nContent-Length: 4\r\nConnection: close\r\n\r\ngone",
        )
        .await;

        let response = HyperHttpClient::default()
            .send(request(&format!("{}/missing", base), &[], None, None))
            .await
            .unwrap();

        assert_eq!(response.status, hyper::StatusCode::NOT_FOUND);
        assert_eq!(response.reason, "Nothing Here");
        assert_eq!(response.body, ResponseBody::Raw(Bytes::from_static(b"gone")));
    }

    #[tokio::test]
    async fn sends_body_auth_and_default_headers() {
        let (base, rx) = serve_once(
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n",
        )
        .await;

        HyperHttpClient::default()
            .send(request(&base, &["X-Trace: 7"], Some(r#"{"x":1}"#), Some("user:pw")))
            .await
            .unwrap();

        let raw = rx.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post / http/1.1\r\n"));
        assert!(raw.contains("content-type: application/json\r\n"));
        assert!(raw.contains("x-trace: 7\r\n"));
        assert!(raw.contains("authorization: basic dxnlcjpwdw==\r\n"));
        assert!(raw.contains("user-agent: pcurl/"));
        assert!(raw.ends_with("{\"x\":1}"));
    }

    #[tokio::test]
    async fn user_supplied_user_agent_wins() {
        let (base, rx) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;

        HyperHttpClient::default()
            .send(request(&base, &["User-Agent: custom/1"], None, None))
            .await
            .unwrap();

        let raw = rx.await.unwrap().to_ascii_lowercase();
        assert!(raw.contains("user-agent: custom/1\r\n"));
        assert!(!raw.contains("pcurl/"));
    }

    #[tokio::test]
    async fn refused_connection_is_no_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HyperHttpClient::default()
            .send(request(&format!("http://{}", addr), &[], None, None))
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<FetchError>(), Some(FetchError::NoResponse(_))));
    }

    #[tokio::test]
    async fn truncated_body_reports_received_status() {
        let (base, _rx) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\nshort",
        )
        .await;

        let err = HyperHttpClient::default()
            .send(request(&base, &[], None, None))
            .await
            .unwrap_err();

        match err.downcast_ref::<FetchError>() {
            Some(FetchError::Status { code, text }) => {
                assert_eq!(*code, hyper::StatusCode::OK);
                assert_eq!(text, "OK");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "200 OK");
    }

    #[tokio::test]
    async fn repeated_headers_are_grouped_by_name() {
        let (base, _rx) = serve_once(
            "HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nX-Id: 7\r\nSet-Cookie: b=2\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let response = HyperHttpClient::default()
            .send(request(&base, &[], None, None))
            .await
            .unwrap();

        let names: Vec<&str> = response.headers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["set-cookie", "set-cookie", "x-id", "content-length", "connection"]);
        assert_eq!(response.headers[0].1, "a=1");
        assert_eq!(response.headers[1].1, "b=2");
    }
}
