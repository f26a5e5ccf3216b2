use crate::domain::value_objects::{Credentials, RequestBody, Url};
use anyhow::{Result, anyhow};
use hyper::body::Bytes;
use hyper::{StatusCode, Version};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP method; anything outside the common set is carried as an extension token
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Extension(String),
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => {
                hyper::Method::from_bytes(other.as_bytes())
                    .map_err(|_| anyhow!("Unsupported HTTP method: '{}'", s))?;
                Ok(Method::Extension(other.to_string()))
            }
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Extension(name) => name,
        };
        f.write_str(name)
    }
}

/// Represents an HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>, // case-preserving, no identical names
    pub body: Option<RequestBody>,
    pub basic_auth: Option<Credentials>,
    pub verify_tls: bool,
}

impl Request {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response payload, classified once by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Raw(Bytes),
    Decoded(Value),
}

impl ResponseBody {
    /// Structured JSON (object or array) becomes `Decoded`, everything else stays `Raw`.
    pub fn classify(bytes: Bytes) -> Self {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => ResponseBody::Decoded(value),
            _ => ResponseBody::Raw(bytes),
        }
    }
}

/// Represents an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub reason: String,
    pub version: Version,
    pub headers: Vec<(String, String)>, // wire order
    pub body: ResponseBody,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}
