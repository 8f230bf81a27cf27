//! Stockledger API Server binary
//!
//! HTTP REST API for stock sheet ingestion.
//! Provides validate, ingest, upload and per-party stock endpoints.

use clap::Parser;
use std::path::PathBuf;
use stockledger::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "stockledger-server")]
#[command(version)]
#[command(about = "Stockledger API Server - HTTP REST API for stock sheet ingestion")]
#[command(long_about = r#"
Stockledger API Server - HTTP REST API

Provides RESTful endpoints for the inventory dashboard:
  - POST /api/v1/validate                  - Validate a stock sheet on disk
  - POST /api/v1/ingest                    - Parse a stock sheet on disk
  - POST /api/v1/upload                    - Upload a sheet (request body) and store it
  - GET  /api/v1/parties/:party_id/stocks  - Stored stock for an account

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Uploaded records are booked against the accounts file by exact party
name. Records whose party has no account are dropped.

Example usage:
  stockledger-server --accounts accounts.yaml
  stockledger-server --host 0.0.0.0 --port 3000 --max-rows 50000

  curl -X POST http://localhost:8080/api/v1/upload \
    -H "X-Uploaded-By: admin" \
    --data-binary @stock.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "STOCKLEDGER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "STOCKLEDGER_PORT")]
    port: u16,

    /// Accounts file (YAML) that uploads are booked against
    #[arg(short, long, env = "STOCKLEDGER_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Reject uploaded sheets with more rows than this
    #[arg(long, env = "STOCKLEDGER_MAX_ROWS")]
    max_rows: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        accounts: args.accounts,
        max_rows: args.max_rows,
    };

    run_api_server(config).await
}
