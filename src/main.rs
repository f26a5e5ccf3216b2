mod application;
mod domain;
mod infrastructure;
mod presentation;

use clap::Parser;
use clap::error::ErrorKind;
use crate::infrastructure::config::{ClientConfig, RenderOptions};
use crate::infrastructure::http_client::HyperHttpClient;
use crate::infrastructure::output::report_failure;
use crate::presentation::argv;
use crate::presentation::cli::Cli;

/// pcurl: curl-compatible HTTP client with pretty JSON output
///
/// Accepts the everyday subset of curl's flags, ignores the rest, sends one
/// request and prints the response with JSON bodies indented and highlighted.
/// HTTP error statuses are warnings; only transport and usage failures exit 1.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    pretty_env_logger::init();

    let args = match argv::normalize(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            report_failure(&err, &RenderOptions::detect(false, false), &mut std::io::stderr());
            std::process::exit(1);
        }
    };

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    let options = cli.render_options();
    options.install_color_override();
    let request_service = HyperHttpClient::new(ClientConfig::default()).create_request_service();

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();

    if let Err(err) = cli.run(&request_service, options, &mut stdout, &mut stderr).await {
        report_failure(&err, &options, &mut stderr);
        std::process::exit(1);
    }
}
