use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use hyper::http::Uri;

/// Represents a parsed request URL
#[derive(Debug, Clone, PartialEq)]
pub struct Url(pub Uri);

impl Url {
    /// Creates a new Url from raw CLI input
    ///
    /// # Arguments
    /// * `url` - The URL string to parse
    ///
    /// # Returns
    /// * `Ok(Url)` - Parsed URL
    /// * `Err(anyhow::Error)` - If the text is not a URI at all
    pub fn new(url: &str) -> Result<Self> {
        let uri = url
            .trim()
            .parse::<Uri>()
            .map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
        Ok(Url(uri))
    }

    /// Returns the URL as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.0.scheme_str()
    }
}

/// Request payload exactly as supplied on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody(pub String);

impl RequestBody {
    pub fn new(data: &str) -> Self {
        RequestBody(data.to_string())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// HTTP Basic credentials from `-u user:password`
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Splits on the first colon; a missing colon means an empty password.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((username, password)) => Credentials {
                username: username.to_string(),
                password: password.to_string(),
            },
            None => Credentials {
                username: raw.to_string(),
                password: String::new(),
            },
        }
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> String {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}
