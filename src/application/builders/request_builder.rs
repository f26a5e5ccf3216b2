use crate::domain::entities::{Method, Request};
use crate::domain::value_objects::{Credentials, RequestBody, Url};
use anyhow::{Result, anyhow};
use std::str::FromStr;

const CONTENT_TYPE: &str = "Content-Type";
const JSON_MIME: &str = "application/json";

pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<Url>,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    basic_auth: Option<Credentials>,
    verify_tls: bool,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
            headers: Vec::new(),
            body: None,
            basic_auth: None,
            verify_tls: true,
        }
    }

    pub fn method(mut self, method: &str) -> Result<Self> {
        self.method = Some(Method::from_str(method)?);
        Ok(self)
    }

    pub fn url(mut self, raw_url: &str) -> Result<Self> {
        self.url = Some(Url::new(raw_url)?);
        Ok(self)
    }

    /// Adds `Name: Value` headers. Entries without a colon or with an empty
    /// name are skipped; a repeated name replaces the earlier value.
    pub fn headers(mut self, raw_headers: &[String]) -> Self {
        for raw in raw_headers {
            match parse_header(raw) {
                Some((name, value)) => self.set_header(name, value),
                None => log::debug!("dropping malformed header {:?}", raw),
            }
        }
        self
    }

    pub fn body(mut self, data: Option<&str>) -> Self {
        self.body = data.map(RequestBody::new);
        self
    }

    pub fn user(mut self, raw: Option<&str>) -> Self {
        self.basic_auth = raw.map(Credentials::parse);
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.verify_tls = !insecure;
        self
    }

    pub fn build(mut self) -> Result<Request> {
        let url = self.url.take().ok_or_else(|| anyhow!("URL is required"))?;

        if self.body.is_some() && !self.has_header(CONTENT_TYPE) {
            self.headers.push((CONTENT_TYPE.to_string(), JSON_MIME.to_string()));
        }

        Ok(Request {
            method: self.method.unwrap_or(Method::Get),
            url,
            headers: self.headers,
            body: self.body,
            basic_auth: self.basic_auth,
            verify_tls: self.verify_tls,
        })
    }

    fn set_header(&mut self, name: String, value: String) {
        match self.headers.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
