use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, LOCATION};
use std::path::PathBuf;

use edge_gate::config::{load_config, EdgeConfig};
use edge_gate::http::IncomingRequest;
use edge_gate::EdgeGate;

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Inspect routing and access decisions of the edge gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a request offline and print the decision as JSON
    Explain {
        /// Request path, optionally with a query string (e.g. /en/register?ref=ABC)
        path: String,

        /// Cookie as name=value; repeatable
        #[arg(short = 'b', long = "cookie")]
        cookies: Vec<String>,

        /// Shortcut for a signed-in visitor with this role (member, admin, super_admin)
        #[arg(long)]
        role: Option<String>,

        /// Accept-Language header value
        #[arg(long)]
        accept_language: Option<String>,

        /// Gate configuration; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Send a request to a running gate and show where it leads
    Probe {
        /// Full URL, e.g. http://localhost:8080/en/dashboard
        url: String,

        /// Cookie as name=value; repeatable
        #[arg(short = 'b', long = "cookie")]
        cookies: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            path,
            cookies,
            role,
            accept_language,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => EdgeConfig::default(),
            };
            let gate = EdgeGate::from_config(&config);

            let (path, query) = path.split_once('?').unwrap_or((path.as_str(), ""));
            let mut request = IncomingRequest::new(path).with_query(query);
            if let Some(role) = role {
                let user_data = urlencoding::encode(&format!(r#"{{"role":"{role}"}}"#)).into_owned();
                request = request
                    .with_cookie("auth_token", "edge-cli")
                    .with_cookie("user_data", user_data);
            }
            for cookie in &cookies {
                let (name, value) = split_cookie(cookie)?;
                request = request.with_cookie(name, value);
            }
            if let Some(lang) = accept_language {
                request = request.with_accept_language(lang);
            }

            let evaluation = gate.evaluate(&request);
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        Commands::Probe { url, cookies } => {
            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?;

            let mut headers = HeaderMap::new();
            if !cookies.is_empty() {
                headers.insert(COOKIE, HeaderValue::from_str(&cookies.join("; "))?);
            }

            let res = client.get(&url).headers(headers).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn split_cookie(raw: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("cookie '{raw}' must look like name=value").into())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status: {}", status);
    if let Some(location) = res.headers().get(LOCATION) {
        println!("Location: {}", location.to_str().unwrap_or("<non-ascii>"));
    }
    if !status.is_success() && !status.is_redirection() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
