//! Send one command to a running backend (or facade) and print the result.

use std::time::Duration;

use clap::Parser;
use compreflex::proxy::Forwarder;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "reflex-cli")]
#[command(about = "Run a single command against a compreflex server", long_about = None)]
struct Cli {
    /// Base URL of the server.
    #[arg(short, long, env = "COMPREFLEX_BACKEND_URL", default_value = "http://localhost:45000")]
    url: String,

    /// Endpoint path: /compreflex on a backend, /consulta on a facade.
    #[arg(short, long, default_value = "/compreflex")]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 15)]
    timeout: u64,

    /// Print the body exactly as received.
    #[arg(long)]
    raw: bool,

    /// The command, e.g. 'binaryInvoke(java.lang.Math, max, double, 4.5, double, -3.7)'.
    command: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let forwarder = Forwarder::new(&cli.url, &cli.endpoint, Duration::from_secs(cli.timeout))?;

    let target = forwarder.request_target(&cli.command);
    let response = forwarder.fetch(&target).await?;
    if response.status() != 200 {
        eprintln!("Error: server returned {} {}", response.status(), response.reason());
    }

    let body = response.body();
    match serde_json::from_str::<Value>(body) {
        Ok(json) if !cli.raw => println!("{}", serde_json::to_string_pretty(&json)?),
        _ => println!("{body}"),
    }

    if response.status() == 200 {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
