//! RustStack Transfer - bulk S3 copy and move runner.
//!
//! Reads transfer requests from a JSON manifest, or builds them by listing a
//! source prefix, runs one batch copy or move, and prints a JSON report on
//! stdout.
//!
//! # Usage
//!
//! ```text
//! ruststack-transfer requests.json
//! ruststack-transfer --mode move --prefix src-bucket/logs/ dst-bucket/archive/logs/
//! ruststack-transfer --plan requests.json
//! ```
//!
//! Ctrl-C lets the running group of transfers settle, skips every later
//! group, prints the partial report and exits with status 130.
//!
//! The manifest is a JSON array of
//! `{"source": {"bucket", "key"}, "destination": {"bucket", "key"}, "overrides"?}`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TRANSFER_MODE` | `copy` | `copy` or `move`; `--mode` overrides |
//! | `TRANSFER_PART_SIZE` | `52428800` | Multipart part size in bytes |
//! | `TRANSFER_POLICY` | `standard` | `standard` or `prefer-multipart` |
//! | `TRANSFER_GROUP_SIZE` | `100` | Objects transferred concurrently |
//! | `TRANSFER_MAX_ATTEMPTS` | `3` | Attempts per remote call |
//! | `TRANSFER_BASE_DELAY_MS` | `100` | First retry delay |
//! | `TRANSFER_MAX_DELAY_MS` | `10000` | Retry delay cap |
//! | `TRANSFER_BATCHED_DELETE` | `false` | Bulk-delete sources after a move |
//! | `S3_ENDPOINT_URL` | *(unset)* | Custom S3 endpoint |
//! | `S3_FORCE_PATH_STYLE` | `false` | Path-style bucket addressing |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ruststack_transfer_aws::{AwsClientConfig, AwsObjectStore, build_client};
use ruststack_transfer_core::{
    BatchResult, MoveConfig, RetryPolicy, S3Transfer, eligible_requests,
};
use ruststack_transfer_model::TransferRequest;

/// Version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status after an interrupted batch.
const EXIT_INTERRUPTED: u8 = 130;

/// Copy or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Copy,
    Move,
}

/// A `bucket/prefix` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    bucket: String,
    prefix: String,
}

/// Split `bucket/prefix` at the first slash. The prefix may be empty.
fn parse_location(value: &str) -> Result<Location, String> {
    let (bucket, prefix) = value.split_once('/').unwrap_or((value, ""));
    if bucket.is_empty() {
        return Err(format!("missing bucket in '{value}'"));
    }
    Ok(Location {
        bucket: bucket.to_owned(),
        prefix: prefix.to_owned(),
    })
}

#[derive(Debug, Parser)]
#[command(name = "ruststack-transfer")]
#[command(about = "Bulk S3 copy and move runner")]
#[command(version)]
struct Cli {
    /// Copy or move the objects
    #[arg(
        long,
        value_enum,
        env = "TRANSFER_MODE",
        default_value_t = Mode::Copy,
        ignore_case = true
    )]
    mode: Mode,

    /// Print the eligible requests as JSON without transferring anything
    #[arg(long)]
    plan: bool,

    /// Build requests by listing a source prefix instead of reading a manifest
    #[arg(
        long,
        num_args = 2,
        value_names = ["SRC", "DST"],
        value_parser = parse_location,
        conflicts_with = "manifest"
    )]
    prefix: Option<Vec<Location>>,

    /// JSON manifest of transfer requests
    #[arg(required_unless_present = "prefix")]
    manifest: Option<PathBuf>,
}

/// Where the requests come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Manifest(PathBuf),
    Prefix {
        source: Location,
        destination: Location,
    },
}

impl Cli {
    fn input(&self) -> Result<Input> {
        match (self.prefix.as_deref(), &self.manifest) {
            (Some([source, destination]), _) => Ok(Input::Prefix {
                source: source.clone(),
                destination: destination.clone(),
            }),
            (Some(_), _) => anyhow::bail!("--prefix takes a source and a destination"),
            (None, Some(path)) => Ok(Input::Manifest(path.clone())),
            (None, None) => anyhow::bail!("either a manifest or --prefix is required"),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `log_level`. Logs go to
/// stderr so stdout carries only the report.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Cancel `token` on Ctrl-C.
fn setup_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted, waiting for the running group to settle");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for ctrl-c"),
        }
    });
}

async fn load_requests(input: &Input, transfer: &S3Transfer) -> Result<Vec<TransferRequest>> {
    match input {
        Input::Manifest(path) => {
            let raw = tokio::fs::read(path)
                .await
                .with_context(|| format!("cannot read manifest {}", path.display()))?;
            serde_json::from_slice(&raw)
                .with_context(|| format!("invalid manifest {}", path.display()))
        }
        Input::Prefix {
            source,
            destination,
        } => transfer
            .requests_for_prefix(
                &source.bucket,
                &source.prefix,
                &destination.bucket,
                &destination.prefix,
            )
            .await
            .with_context(|| format!("cannot list {}/{}", source.bucket, source.prefix)),
    }
}

async fn run_batch(
    transfer: &S3Transfer,
    mode: Mode,
    requests: &[TransferRequest],
    config: &MoveConfig,
) -> Result<BatchResult> {
    let result = match mode {
        Mode::Copy => transfer.copy_objects(requests, &config.copy).await?,
        Mode::Move => transfer.move_objects(requests, config).await?,
    };
    Ok(result)
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = MoveConfig::from_env()?;
    config.validate()?;
    let input = cli.input()?;

    let client = build_client(&AwsClientConfig::from_env()).await;
    let cancel_token = CancellationToken::new();
    let transfer = S3Transfer::new(
        Arc::new(AwsObjectStore::new(client)),
        RetryPolicy::new(config.copy.retry.clone()),
    )
    .with_cancellation(cancel_token.clone());

    let requests = load_requests(&input, &transfer).await?;
    info!(
        mode = ?cli.mode,
        requests = requests.len(),
        part_size = config.copy.part_size,
        group_size = config.copy.group_size,
        batched_delete = config.batched_delete,
        "loaded transfer requests"
    );

    if cli.plan {
        let eligible = eligible_requests(&requests);
        println!("{}", serde_json::to_string_pretty(&eligible)?);
        return Ok(ExitCode::SUCCESS);
    }

    setup_signal_handler(cancel_token.clone());
    let result = run_batch(&transfer, cli.mode, &requests, &config).await?;

    let report = result.report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if cancel_token.is_cancelled() {
        warn!(
            succeeded = report.succeeded,
            failed = report.failed,
            "transfer batch interrupted"
        );
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else if result.is_complete_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(failed = report.failed, "some transfers failed");
        Ok(ExitCode::from(2))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    init_tracing(&log_level)?;

    info!(version = VERSION, "starting RustStack Transfer");
    run(&cli).await
}
