//! Edge gate (v1)
//!
//! Request routing and access-control front for a multi-tenant web app,
//! built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                    EDGE GATE                     │
//!                        │                                                  │
//!   Client Request       │  ┌─────────┐   ┌────────────┐   ┌────────────┐   │
//!   ─────────────────────┼─▶│  http   │──▶│  routing   │──▶│ shortlink  │───┼──▶ Link backend
//!                        │  │ server  │   │ classifier │   │  rewrite   │   │    (/links/{code})
//!                        │  └─────────┘   └─────┬──────┘   └────────────┘   │
//!                        │                      │                           │
//!                        │                      ▼                           │
//!                        │               ┌────────────┐   ┌────────────┐    │
//!   Client Redirect      │               │  security  │──▶│   locale   │────┼──▶ Page renderer
//!   ◀────────────────────┼───────────────│ identity + │   │  delegate  │    │
//!                        │               │   rules    │   └────────────┘    │
//!                        │               └────────────┘                     │
//!                        │                                                  │
//!                        │  config (hot reload) · observability · lifecycle │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use edge_gate::lifecycle::startup;

#[derive(Parser)]
#[command(name = "edge-gate")]
#[command(about = "Edge routing and access control gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "EDGE_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    startup::start(args.config).await?;
    Ok(())
}
