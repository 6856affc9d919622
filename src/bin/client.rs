//! # Client Binary Entry Point
//!
//! Submits the lab source file to the grading server and prints the result.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- <TEAM_ID> <PASSWORD>
//! ```
//!
//! Against a local grader, with metrics:
//! ```bash
//! cargo run --bin client -- team1 secret --config config/local.toml \
//!   --metrics-output ./metrics/submission.json
//! ```
//!
//! The client will:
//! 1. Load configuration (built-in defaults unless `--config` is given)
//! 2. Connect to the grading server and send the credentials
//! 3. Upload the source file
//! 4. Stream the grading result to stdout
//! 5. Print the best result so far
//! 6. Export metrics to JSON (if metrics-output specified)

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;

use lab_submit::{ClientConfig, Credentials, TransferClient};

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Submit a source file to the grading server",
    override_usage = "client <TEAM_ID> <PASSWORD> [OPTIONS]"
)]
struct Args {
    /// Your team id
    team_id: String,

    /// Your password
    password: String,

    /// Path to a client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to write metrics JSON output (optional)
    #[arg(long)]
    metrics_output: Option<String>,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Logs go to stderr at INFO level unless `RUST_LOG` says otherwise, keeping
/// stdout for the grading result.
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse before anything else: a usage error must not touch the network
    let args = Args::parse();

    init_logger();

    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    let credentials = Credentials::new(args.team_id, args.password);
    let client = TransferClient::new(config);

    let mut stdout = tokio::io::stdout();
    let metrics = client.run(&credentials, &mut stdout).await?;

    if let Some(output_path) = args.metrics_output {
        metrics.export_to_json(&output_path)?;
        info!("Metrics exported to: {}", output_path);
    }

    Ok(())
}
