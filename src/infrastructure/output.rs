use crate::domain::entities::{Response, ResponseBody};
use crate::domain::errors::FetchError;
use crate::infrastructure::config::RenderOptions;
use anyhow::{Result, anyhow};
use colored::{ColoredString, Colorize};
use colored_json::{ColorMode, to_colored_json};
use hyper::Version;
use serde_json::Value;
use std::io::Write;

/// Writes a received response: optional status line and headers, an
/// advisory warning for error statuses, then the body.
pub struct ResponseRenderer {
    options: RenderOptions,
}

impl ResponseRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, response: &Response, out: &mut dyn Write, err: &mut dyn Write) -> Result<()> {
        if self.options.include {
            self.print_head(response, out)?;
        }

        if response.status.as_u16() >= 400 && !self.options.silent {
            let line = format!("Warning: HTTP {} {}", response.status.as_u16(), response.reason);
            writeln!(err, "{}", paint(&line, self.options.color_stderr, |s| s.yellow().bold()))?;
        }

        self.print_body(response, out)?;
        out.flush()?;
        Ok(())
    }

    fn print_head(&self, response: &Response, out: &mut dyn Write) -> Result<()> {
        let status = format!(
            "HTTP/{} {} {}",
            version_label(response.version),
            response.status.as_u16(),
            response.reason
        );
        writeln!(out, "{}", paint(status.trim_end(), self.options.color_stdout, |s| s.bold()))?;

        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", paint(name, self.options.color_stdout, |s| s.cyan()), value)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn print_body(&self, response: &Response, out: &mut dyn Write) -> Result<()> {
        match &response.body {
            ResponseBody::Decoded(value) => self.print_json(value, out),
            ResponseBody::Raw(bytes) if response.is_json() => {
                match serde_json::from_slice::<Value>(bytes) {
                    Ok(value) => self.print_json(&value, out),
                    Err(e) => {
                        log::debug!("body claims JSON but does not parse ({}), printing raw", e);
                        out.write_all(bytes)?;
                        Ok(())
                    }
                }
            }
            ResponseBody::Raw(bytes) => {
                out.write_all(bytes)?;
                Ok(())
            }
        }
    }

    fn print_json(&self, value: &Value, out: &mut dyn Write) -> Result<()> {
        let mode = if self.options.color_stdout { ColorMode::On } else { ColorMode::Off };
        let pretty = to_colored_json(value, mode).map_err(|e| anyhow!("Failed to format JSON: {}", e))?;
        writeln!(out, "{}", pretty)?;
        Ok(())
    }
}

/// Writes the single-line failure report unless silenced.
pub fn report_failure(error: &anyhow::Error, options: &RenderOptions, err: &mut dyn Write) {
    if options.silent {
        return;
    }
    let message = match error.downcast_ref::<FetchError>() {
        Some(fetch_error) => format!("Error: {}", fetch_error),
        None => format!("Error: {}", error),
    };
    let _ = writeln!(err, "{}", paint(&message, options.color_stderr, |s| s.red()));
}

fn paint(text: &str, enabled: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if enabled {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
