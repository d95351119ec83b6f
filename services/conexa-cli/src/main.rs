//! Conexa command-line client
//!
//! Thin binary over the `conexa` crate:
//! 1. Loads settings (`--config` > `CONEXA_CONFIG` > `conexa.toml`)
//! 2. Logs in every configured tenant
//! 3. Runs one call, or lists the registered clients, and prints pretty JSON
//!
//! Usage:
//!   conexa [--config PATH] [--client KEY] <METHOD> <PATH> [JSON_PARAMS]
//!   conexa [--config PATH] clients

use anyhow::{Context, Result, bail};
use conexa::{Call, Client, Method, Payload, Settings};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: conexa [--config PATH] [--client KEY] <METHOD> <PATH> [JSON_PARAMS]\n       conexa [--config PATH] clients";

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<String>,
    client: Option<String>,
    command: Command,
}

#[derive(Debug, PartialEq)]
enum Command {
    Clients,
    Request {
        method: Method,
        path: String,
        params: Option<Value>,
    },
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut config = None;
    let mut client = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(iter.next().context("--config needs a path")?.clone());
            }
            "--client" => {
                client = Some(iter.next().context("--client needs a key")?.clone());
            }
            "-h" | "--help" => bail!("{USAGE}"),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ => positional.push(arg.as_str()),
        }
    }

    let command = match positional.as_slice() {
        ["clients"] => Command::Clients,
        [method, path] => Command::Request {
            method: parse_method(method)?,
            path: path.to_string(),
            params: None,
        },
        [method, path, params] => Command::Request {
            method: parse_method(method)?,
            path: path.to_string(),
            params: Some(
                serde_json::from_str(params).context("JSON_PARAMS is not valid JSON")?,
            ),
        },
        _ => bail!("{USAGE}"),
    };

    Ok(Args {
        config,
        client,
        command,
    })
}

fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method: {raw}"))
}

/// Data alone, or data with pagination when the API sent one.
fn render(payload: Payload) -> Value {
    match payload.pagination {
        Some(pagination) => json!({"data": payload.data, "pagination": pagination}),
        None => payload.data,
    }
}

async fn run(client: &Client, client_key: Option<String>, command: Command) -> Result<Value> {
    match command {
        Command::Clients => {
            let registry = client.registry();
            let mut clients = Vec::new();
            for alias in registry.aliases().await {
                if let Some(credential) = registry.client_for(Some(&alias)).await {
                    clients.push(json!({
                        "key": credential.key(),
                        "kind": credential.kind().as_str(),
                        "client_id": credential.client_id(),
                        "default": credential.is_default(),
                    }));
                }
            }
            Ok(Value::Array(clients))
        }
        Command::Request {
            method,
            path,
            params,
        } => {
            let mut call = Call::new(method, path);
            if let Some(params) = params {
                call = call.json_params(params)?;
            }
            if let Some(key) = client_key {
                call = call.client_key(key);
            }
            let payload = client.execute(call).await?;
            Ok(render(payload))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr so stdout stays pipeable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let config_path = Settings::resolve_path(args.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let settings = Settings::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let client = Client::connect(&settings)
        .await
        .context("failed to log in to Conexa")?;

    let output = run(&client, args.client, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
