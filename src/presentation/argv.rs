//! Pre-filters raw process arguments so curl options this tool does not
//! implement are dropped instead of rejected by clap.

use anyhow::{Result, bail};
use std::ffi::OsString;

/// Long options `Cli` understands that take a value
const LONG_WITH_VALUE: &[&str] = &["--request", "--header", "--data", "--data-raw", "--data-binary", "--user"];

/// Long switches `Cli` understands
const LONG_SWITCHES: &[&str] = &[
    "--insecure",
    "--include",
    "--location",
    "--compressed",
    "--silent",
    "--help",
    "--version",
];

const SHORT_WITH_VALUE: &str = "XHdu";
const SHORT_SWITCHES: &str = "kiLshV";

/// curl options outside our surface whose value must be dropped with them
const FOREIGN_LONG_WITH_VALUE: &[&str] = &[
    "--output",
    "--user-agent",
    "--referer",
    "--max-time",
    "--connect-timeout",
    "--cookie",
    "--cookie-jar",
    "--write-out",
    "--proxy",
    "--proxy-user",
    "--form",
    "--form-string",
    "--upload-file",
    "--range",
    "--retry",
    "--retry-delay",
    "--retry-max-time",
    "--max-redirs",
    "--resolve",
    "--connect-to",
    "--cacert",
    "--capath",
    "--cert",
    "--cert-type",
    "--key",
    "--key-type",
    "--ciphers",
    "--interface",
    "--limit-rate",
    "--data-urlencode",
    "--data-ascii",
    "--json",
    "--config",
    "--oauth2-bearer",
    "--dump-header",
    "--trace",
    "--trace-ascii",
    "--continue-at",
    "--time-cond",
    "--speed-limit",
    "--speed-time",
];
const FOREIGN_SHORT_WITH_VALUE: &str = "AbcCeEFKmoPQrtTUwxyYz";

/// One raw argument. Non-UTF-8 arguments are matched through their lossy
/// text and only rejected if they survive into what clap sees.
struct Token {
    text: String,
    utf8: bool,
}

impl Token {
    fn from_os(raw: OsString) -> Self {
        match raw.into_string() {
            Ok(text) => Token { text, utf8: true },
            Err(raw) => Token { text: raw.to_string_lossy().into_owned(), utf8: false },
        }
    }

    /// A new argument carved out of this one
    fn derive(&self, text: String) -> Self {
        Token { text, utf8: self.utf8 }
    }
}

/// Returns the arguments clap should see. The program name is kept as is.
pub fn normalize<I>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().map(Token::from_os);
    let mut kept: Vec<Token> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        if arg.text == "--" {
            kept.push(arg);
            kept.extend(args.by_ref());
            break;
        }
        if arg.text == "-" || !arg.text.starts_with('-') {
            kept.push(arg);
        } else if arg.text.starts_with("--") {
            normalize_long(arg, &mut args, &mut kept);
        } else {
            normalize_short(arg, &mut args, &mut kept);
        }
    }

    // argv[0] is never handed to clap as a value
    if let Some(bad) = kept.iter().skip(1).find(|token| !token.utf8) {
        bail!("argument is not valid UTF-8: {:?}", bad.text);
    }
    Ok(kept.into_iter().map(|token| token.text).collect())
}

fn normalize_long(arg: Token, rest: &mut impl Iterator<Item = Token>, kept: &mut Vec<Token>) {
    let (name, inline_value) = match arg.text.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (arg.text.clone(), None),
    };

    if LONG_WITH_VALUE.contains(&name.as_str()) {
        kept.push(arg);
        if inline_value.is_none() {
            kept.extend(rest.next());
        }
    } else if LONG_SWITCHES.contains(&name.as_str()) && inline_value.is_none() {
        kept.push(arg);
    } else if name == "--url" {
        // curl's --url is the target given as an option
        match inline_value {
            Some(value) => kept.push(arg.derive(value)),
            None => kept.extend(rest.next()),
        }
    } else if FOREIGN_LONG_WITH_VALUE.contains(&name.as_str()) {
        let dropped = if inline_value.is_none() { rest.next().map(|token| token.text) } else { None };
        log::debug!("ignoring unsupported option {} {:?}", name, dropped.or(inline_value));
    } else {
        log::debug!("ignoring unsupported option {}", arg.text);
    }
}

/// Handles `-k`, clusters such as `-sSL`, and attached values such as `-XPOST`.
fn normalize_short(arg: Token, rest: &mut impl Iterator<Item = Token>, kept: &mut Vec<Token>) {
    let mut switches = String::new();
    let mut chars = arg.text[1..].char_indices();

    while let Some((idx, flag)) = chars.next() {
        let attached = &arg.text[1 + idx + flag.len_utf8()..];

        if SHORT_WITH_VALUE.contains(flag) {
            push_cluster(&switches, kept);
            kept.push(arg.derive(format!("-{}", flag)));
            if attached.is_empty() {
                kept.extend(rest.next());
            } else {
                kept.push(arg.derive(attached.to_string()));
            }
            return;
        }
        if FOREIGN_SHORT_WITH_VALUE.contains(flag) {
            let dropped = if attached.is_empty() {
                rest.next().map(|token| token.text)
            } else {
                Some(attached.to_string())
            };
            log::debug!("ignoring unsupported option -{} {:?}", flag, dropped);
            break;
        }
        if SHORT_SWITCHES.contains(flag) {
            switches.push(flag);
        } else {
            log::debug!("ignoring unsupported option -{}", flag);
        }
    }

    push_cluster(&switches, kept);
}

/// Switch letters are ASCII, so the cluster itself is always valid text.
fn push_cluster(switches: &str, kept: &mut Vec<Token>) {
    if !switches.is_empty() {
        kept.push(Token { text: format!("-{}", switches), utf8: true });
    }
}
