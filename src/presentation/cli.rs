use crate::application::builders::request_builder::RequestBuilder;
use crate::application::services::HttpRequestService;
use crate::domain::entities::Request;
use crate::infrastructure::config::RenderOptions;
use crate::infrastructure::output::ResponseRenderer;
use anyhow::{Result, anyhow};
use clap::Parser;
use std::io::Write;

/// CLI configuration for pcurl
#[derive(Parser, Debug)]
#[command(name = "pcurl", version, args_override_self = true)]
#[command(about = "pcurl: curl-style requests with pretty JSON output", long_about = None)]
pub struct Cli {
    /// Target URL; stray values left behind by unsupported options are ignored
    #[arg(value_name = "URL", required = true)]
    pub targets: Vec<String>,

    /// HTTP method
    #[arg(short = 'X', long = "request", default_value = "GET")]
    pub method: String,

    /// Add header "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header", allow_hyphen_values = true)]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long = "data", allow_hyphen_values = true)]
    pub data: Option<String>,

    /// Request body, same as --data
    #[arg(long = "data-raw", allow_hyphen_values = true)]
    pub data_raw: Option<String>,

    /// Request body, same as --data
    #[arg(long = "data-binary", allow_hyphen_values = true)]
    pub data_binary: Option<String>,

    /// HTTP Basic credentials as user:password
    #[arg(short = 'u', long = "user", allow_hyphen_values = true)]
    pub user: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Print the status line and response headers before the body
    #[arg(short = 'i', long)]
    pub include: bool,

    /// Accepted for curl compatibility
    #[arg(short = 'L', long)]
    pub location: bool,

    /// Accepted for curl compatibility
    #[arg(long)]
    pub compressed: bool,

    /// Suppress warnings and error messages
    #[arg(short = 's', long)]
    pub silent: bool,
}

impl Cli {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::detect(self.include, self.silent)
    }

    /// First positional that looks like a URL, else the first positional
    pub fn target_url(&self) -> Result<&str> {
        self.targets
            .iter()
            .find(|target| target.contains("://"))
            .or_else(|| self.targets.first())
            .map(String::as_str)
            .ok_or_else(|| anyhow!("URL is required"))
    }

    /// First non-empty of --data, --data-raw, --data-binary
    pub fn request_body(&self) -> Option<&str> {
        [&self.data, &self.data_raw, &self.data_binary]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|data| !data.is_empty())
    }

    pub fn build_request(&self) -> Result<Request> {
        RequestBuilder::new()
            .method(&self.method)?
            .url(self.target_url()?)?
            .headers(&self.headers)
            .body(self.request_body())
            .user(self.user.as_deref())
            .insecure(self.insecure)
            .build()
    }

    pub async fn run(
        &self,
        request_service: &HttpRequestService,
        options: RenderOptions,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        let request = self.build_request()?;
        let response = request_service.send_request(request).await?;
        ResponseRenderer::new(options).render(&response, out, err)
    }
}
