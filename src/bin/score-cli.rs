use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

#[derive(Parser)]
#[command(name = "score-cli")]
#[command(about = "Client for the scoring server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the health endpoint
    Health,
    /// Send a scoring request
    Score {
        /// Inline request body
        #[arg(short, long, conflicts_with = "file")]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extra request header, as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Score { data, file, headers } => {
            let body = match (data, file) {
                (Some(data), _) => data.into_bytes(),
                (None, Some(path)) => std::fs::read(path)?,
                (None, None) => Vec::new(),
            };

            let res = client
                .post(format!("{}/score", cli.url))
                .headers(parse_headers(&headers)?)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in 'Name: value' form", entry))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let failed = res.headers().contains_key("x-run-function-failed");
    let is_json = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!(
            "Error: scoring server returned status {}{}",
            status,
            if failed { " (handler failed)" } else { "" }
        );
        eprintln!("Response: {}", text);
        return Ok(());
    }

    if is_json {
        let json: serde_json::Value = serde_json::from_str(&text)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}
