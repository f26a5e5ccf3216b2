use std::io::IsTerminal;

/// Transport settings that do not come from an individual request
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent unless the user supplies their own `User-Agent`
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// How a response (or failure) is written to the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    pub include: bool,
    pub silent: bool,
    pub color_stdout: bool,
    pub color_stderr: bool,
}

impl RenderOptions {
    /// Colors follow whether each stream is attached to a terminal.
    pub fn detect(include: bool, silent: bool) -> Self {
        Self {
            include,
            silent,
            color_stdout: std::io::stdout().is_terminal(),
            color_stderr: std::io::stderr().is_terminal(),
        }
    }

    /// `colored` only checks stdout on its own; once either stream is a
    /// terminal the per-stream flags above decide instead.
    pub fn install_color_override(&self) {
        if self.color_stdout || self.color_stderr {
            colored::control::set_override(true);
        }
    }
}
