use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "tracker-cli")]
#[command(about = "Management CLI for the site tracker", long_about = None)]
struct Cli {
    /// Base URL of the admin endpoints.
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Inspect resolution cache counters
    Cache,
    /// Drop every cached resolution
    ClearCache,
    /// Resolve a location to its site
    Resolve {
        /// Page URL to resolve
        location: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)).send().await?,
        Commands::Cache => client.get(format!("{}/admin/cache", base)).send().await?,
        Commands::ClearCache => client.delete(format!("{}/admin/cache", base)).send().await?,
        Commands::Resolve { location } => {
            client
                .get(format!("{}/admin/resolve", base))
                .query(&[("location", location)])
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
