use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gtr-cli")]
#[command(about = "Client for the gtr transload relay", long_about = None)]
struct Cli {
    /// Base URL of the relay.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the relay's API version
    Version,
    /// Transload a source URL into a destination blob
    Transload {
        /// Destination path, e.g. /t-azb/<account>/<container>/<blob>?<sas>
        destination: String,
        /// Absolute URL of the source file
        source: String,
        /// Source byte range, e.g. bytes=0-1048575
        #[arg(short, long)]
        range: Option<String>,
        /// Extra destination header "name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// HTTP method for the destination write
        #[arg(short, long, default_value = "PUT")]
        method: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Version => {
            let res = client.get(format!("{}/version/", base)).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: relay returned status {}", status);
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Transload {
            destination,
            source,
            range,
            headers,
            method,
        } => {
            let mut header_map = HeaderMap::new();
            header_map.insert("x-gtr-copy-source", HeaderValue::from_str(&source)?);
            if let Some(range) = range {
                header_map.insert("x-gtr-source-range", HeaderValue::from_str(&range)?);
            }
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| format!("header '{}' is not 'name: value'", header))?;
                header_map.insert(
                    HeaderName::from_bytes(name.trim().as_bytes())?,
                    HeaderValue::from_str(value.trim())?,
                );
            }

            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let path = destination.trim_start_matches('/');
            let res = client
                .request(method, format!("{}/{}", base, path))
                .headers(header_map)
                .send()
                .await?;

            println!("{}", res.status());
            let body = res.text().await?;
            if !body.is_empty() {
                println!("{}", body);
            }
        }
    }

    Ok(())
}
