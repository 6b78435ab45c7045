use std::process::ExitCode;

use anyhow::{Context, Result};
use api_commons::signing::AUTHORIZATION_HEADER;
use api_commons::{HmacSigner, HttpTransport, Payload};
use clap::{Args, Parser, Subcommand};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(about = "Sign, verify and send HMAC-authenticated API requests")]
struct Cli {
    #[clap(flatten)]
    credentials: Credentials,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Credentials {
    #[clap(long, env = "HMAC_IDENTIFIER")]
    identifier: String,
    #[clap(long, env = "HMAC_SECRET", hide_env_values = true)]
    secret: String,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token for a payload
    Sign {
        payload: String,
        /// Parse the payload as JSON before signing
        #[clap(long)]
        json: bool,
        /// Emit the `hmac `-prefixed header form
        #[clap(long)]
        header: bool,
    },
    /// Check a received token against a payload
    Verify {
        token: String,
        payload: String,
        #[clap(long)]
        json: bool,
    },
    /// Send a signed JSON request
    Request {
        method: Method,
        path: String,
        /// JSON request body
        #[clap(long)]
        body: Option<String>,
        #[clap(long, env = "API_BASE_URL", default_value = "")]
        base_url: String,
        #[clap(long, env = "API_USER_AGENT")]
        user_agent: Option<String>,
        /// Accepted status codes (any 2xx when omitted)
        #[clap(long = "accept", value_parser = parse_status)]
        accepted: Vec<StatusCode>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let signer = HmacSigner::new(cli.credentials.identifier, cli.credentials.secret);

    match cli.command {
        Command::Sign {
            payload,
            json,
            header,
        } => {
            let payload = parse_payload(&payload, json)?;
            let token = if header {
                signer.generate_header(payload)
            } else {
                signer.generate(payload)
            }
            .context("signing payload")?;
            println!("{token}");
        }
        Command::Verify {
            token,
            payload,
            json,
        } => {
            let payload = parse_payload(&payload, json)?;
            if !signer.validate(&token, payload) {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
            println!("valid");
        }
        Command::Request {
            method,
            path,
            body,
            base_url,
            user_agent,
            accepted,
        } => {
            let mut builder = HttpTransport::builder().base_url(base_url);
            if let Some(user_agent) = user_agent {
                builder = builder
                    .user_agent(&user_agent)
                    .context("invalid user agent")?;
            }
            let transport = builder.build();

            let body: Option<Value> = body
                .map(|body| serde_json::from_str(&body))
                .transpose()
                .context("parsing request body as JSON")?;
            let signed = match &body {
                Some(body) => signer.generate_header(body),
                None => signer.generate_header(""),
            }
            .context("signing request body")?;

            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION_HEADER,
                HeaderValue::from_str(&signed).context("building authorization header")?,
            );

            let response = transport
                .request(method, &path, body.as_ref(), &headers, &accepted)
                .await
                .context("sending request")?;
            println!("{}", response.status());
            println!("{}", String::from_utf8_lossy(response.body()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_payload(raw: &str, json: bool) -> Result<Payload<'_>> {
    if json {
        let value: Value = serde_json::from_str(raw).context("parsing payload as JSON")?;
        Ok(Payload::from(value))
    } else {
        Ok(Payload::from(raw))
    }
}

fn parse_status(raw: &str) -> Result<StatusCode, String> {
    let code: u16 = raw.parse().map_err(|e| format!("invalid status code: {e}"))?;
    StatusCode::from_u16(code).map_err(|e| format!("invalid status code: {e}"))
}
