//! Purpose: `jsvalue` CLI entry point; inspect schemaless JSON from the shell.
//! Role: Binary crate root; parses args, reads a document, prints coerced output.
//! Invariants: Documents come from stdin unless `--file` or `--url` is given.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `jsvalue::to_exit_code`.
#![allow(clippy::result_large_err)]

use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::aot::Shell;
use serde_json::{Map, json};
use std::error::Error as StdError;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

use jsvalue::{
    Error, ErrorKind, HttpClient, HttpConfig, Object, Value, indent_encode, parse_file,
    parse_time, to_exit_code,
};

mod command_dispatch;

const LOG_ENV: &str = "JSVALUE_LOG";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `jsvalue --help`."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "jsvalue",
    version,
    about = "Read loosely-typed JSON and print coerced values",
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '{"user":{"age":"41.9"}}' | jsvalue get user.age --as int
  41
  $ jsvalue keys --file config.json
  $ jsvalue sort-by price --file items.json --pretty
  $ jsvalue time 01.05.23
  2023-05-01T00:00:00Z

Set JSVALUE_LOG=debug to log file and http activity on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the value at a dotted path (keys or array indices)")]
    Get {
        #[arg(help = "Dotted path such as `items.0.name`; `.` selects the root")]
        path: String,
        #[arg(long = "as", value_enum, default_value = "json", help = "Output coercion")]
        output: OutputKind,
        #[command(flatten)]
        source: SourceArgs,
    },
    #[command(about = "List the keys of a top-level object, sorted")]
    Keys {
        #[command(flatten)]
        source: SourceArgs,
    },
    #[command(about = "Sort a top-level array of objects by one field")]
    SortBy {
        field: String,
        #[arg(long, help = "Indent output with two spaces")]
        pretty: bool,
        #[command(flatten)]
        source: SourceArgs,
    },
    #[command(about = "Parse a loosely formatted date/time and print RFC 3339 UTC")]
    Time { text: String },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, conflicts_with = "url", value_hint = ValueHint::FilePath, help = "Read the document from a file")]
    file: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::Url, help = "Fetch the document over http(s)")]
    url: Option<String>,
    #[arg(
        long = "header",
        value_name = "NAME:VALUE",
        requires = "url",
        help = "Extra request header (repeatable)"
    )]
    headers: Vec<String>,
    #[arg(long, requires = "url", help = "Request timeout in milliseconds")]
    timeout_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputKind {
    Json,
    Str,
    Int,
    Num,
    Bool,
    Time,
}

fn read_document(source: &SourceArgs) -> Result<Value, Error> {
    if let Some(path) = &source.file {
        return parse_file(path);
    }
    if let Some(url) = &source.url {
        let mut config = HttpConfig::default();
        if let Some(ms) = source.timeout_ms {
            config.timeout = Some(Duration::from_millis(ms));
        }
        let headers = parse_header_args(&source.headers)?;
        let client = HttpClient::with_config(config);
        return client.request_value(None, url, &headers, None);
    }
    Value::read_from(io::stdin().lock())
}

fn parse_header_args(raw: &[String]) -> Result<Object, Error> {
    let mut headers = Object::null();
    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid header `{entry}`"))
                .with_hint("Use `--header 'Name: value'`."));
        };
        headers = headers.set(name.trim(), value.trim());
    }
    Ok(headers)
}

/// Walks `path` one segment at a time; numeric segments index arrays
/// (negative counts from the end), everything else looks up object keys.
fn walk_path(root: Value, path: &str) -> Result<Value, Error> {
    if path.is_empty() || path == "." {
        return Ok(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("empty segment in path `{path}`"))
                .with_hint("Separate keys with single dots, e.g. `a.b.0`."));
        }
        current = match segment.parse::<isize>() {
            Ok(index) if current.is_array() => current.into_array().eq(index),
            _ => current.into_object().get(segment),
        };
    }
    Ok(current)
}

fn render(value: &Value, output: OutputKind) -> Result<String, Error> {
    Ok(match output {
        OutputKind::Json => value.json(),
        OutputKind::Str => value.string(),
        OutputKind::Int => value.int64().to_string(),
        OutputKind::Num => jsvalue::to_str(value.float64()),
        OutputKind::Bool => value.bool().to_string(),
        OutputKind::Time => format_time(value.time())?,
    })
}

fn format_time(ts: time::OffsetDateTime) -> Result<String, Error> {
    ts.format(&Rfc3339).map_err(|err| {
        Error::new(ErrorKind::TimeFormat)
            .with_message("timestamp cannot be rendered as rfc3339")
            .with_source(err)
    })
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {}", error_message(err));
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }
    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Decode => "invalid json".to_string(),
        ErrorKind::Encode => "json encode failed".to_string(),
        ErrorKind::Construct => "value has the wrong shape".to_string(),
        ErrorKind::TimeFormat => "unrecognized time format".to_string(),
        ErrorKind::Status => "unexpected http status".to_string(),
        ErrorKind::Encoding => "unsupported content encoding".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> serde_json::Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": serde_json::Value::Object(inner) })
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
