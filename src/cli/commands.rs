use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use http::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::dispatcher::RestController;
use crate::echo::EchoResource;
use crate::params::parse_form;
use crate::runtime_config::RestConfig;
use crate::server::RestRequest;

/// Command-line interface for restdispatch
#[derive(Parser, Debug)]
#[command(name = "restdispatch")]
#[command(about = "REST dispatch layer CLI", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch a synthetic request to the echo resource and print the body
    Request(RequestArgs),
}

/// Options of the `request` command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    /// Resource path, e.g. `/shop/orders.json`
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub resource: String,

    /// Request headers as a JSON object
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub headers: String,

    /// Transport method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// URL-encoded query parameters
    #[arg(long)]
    pub get: Option<String>,

    /// URL-encoded posted form values
    #[arg(long)]
    pub post: Option<String>,

    /// Directory of HTML views
    #[arg(long)]
    pub views: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Build the synthetic request described by `args`.
///
/// # Errors
///
/// `--method` is not a valid method token.
pub fn build_request(args: &RequestArgs) -> Result<RestRequest> {
    let verb = args.method.trim().to_ascii_uppercase();
    let method = Method::from_bytes(verb.as_bytes())
        .with_context(|| format!("Invalid method '{}'", args.method))?;

    let path = format!("/{}", args.resource.trim_start_matches('/'));
    let mut request = RestRequest::new(method, &path);

    match serde_json::from_str::<Value>(&args.headers) {
        Ok(Value::Object(headers)) => {
            for (name, value) in &headers {
                let name = name.to_ascii_lowercase().replace('_', "-");
                request = request.with_header(&name, &header_value(value));
            }
        }
        Ok(other) => warn!(headers = %other, "Headers are not a JSON object - ignored"),
        Err(e) => warn!(error = %e, "Headers are not valid JSON - ignored"),
    }

    if let Some(query) = &args.get {
        request = request.with_query_string(query);
    }
    if let Some(form) = &args.post {
        request = request
            .with_post(parse_form(form))
            .with_body(form.as_bytes());
    }
    Ok(request)
}

fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Execute a parsed command, writing the response body to `out`.
///
/// # Errors
///
/// Invalid options, unreadable configuration, or a request the dispatcher
/// aborted (for instance an unknown output format).
pub fn run_command<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Request(args) => {
            let mut config = match &args.config {
                Some(path) => RestConfig::from_yaml_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => RestConfig::from_env(),
            };
            if let Some(views) = &args.views {
                config.views_dir = Some(views.clone());
            }

            let request = build_request(&args)?;
            let controller = RestController::new(Arc::new(EchoResource), config);
            let response = controller
                .execute(request)
                .with_context(|| format!("Request to {} failed", args.resource))?;

            info!(
                resource = %args.resource,
                status = response.status,
                body_size_bytes = response.body.len(),
                "CLI request complete"
            );
            out.write_all(&response.body)
                .context("Failed to write response body")?;
            out.flush().context("Failed to flush output")?;
            Ok(())
        }
    }
}

/// Parse command-line arguments and run the command against stdout.
///
/// # Errors
///
/// See [`run_command`].
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli, &mut out)
}
