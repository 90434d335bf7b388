//! Mobile Racking - command line status and aisle control for the WMS interface.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mobile_racking as app;

use app::config::{AppConfig, ConfigLoadResult};
use app::monitor::{MonitorState, poll_once};
use app::plc::PlcClient;
use app::report::{StatusReport, StatusView, format_hex, parse_hex};
use app::wms::{self, ProtocolMode, Request, StatusRecord};

/// Status and aisle control client for Mobile Racking PLC controllers.
#[derive(Parser)]
#[command(name = "mobile-racking", version)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Override the PLC host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Override the PLC port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Send commands in the legacy 6-byte framed format
    #[arg(long, global = true)]
    legacy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Request and print the controller status
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Open an aisle and print the status reply
    Open {
        aisle: i32,
        #[arg(long)]
        json: bool,
    },
    /// Poll status repeatedly
    Watch {
        /// Seconds between polls (config default when omitted)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many polls
        #[arg(long)]
        count: Option<usize>,
    },
    /// Check TCP reachability and protocol response
    Diagnose,
    /// Print the bytes of a command frame without sending it
    Encode {
        #[command(subcommand)]
        request: EncodeRequest,
    },
    /// Decode a 20-byte hex dump
    Decode {
        hex: String,
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum EncodeRequest {
    Status,
    Open { aisle: i32 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = if let Some(path) = &cli.config {
        path.clone()
    } else if cli.dev {
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };

    if let Command::InitConfig { force } = &cli.command {
        return init_config(&config_path, *force);
    }

    let (mut config, load_note) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, None),
        ConfigLoadResult::Missing => (AppConfig::default(), Some("Config missing, using defaults")),
        ConfigLoadResult::Invalid(e) => {
            anyhow::bail!("Invalid config {}: {e}", config_path.display());
        }
    };

    if let Some(host) = cli.host {
        config.plc.host = host;
    }
    if let Some(port) = cli.port {
        config.plc.port = port;
    }
    if cli.legacy {
        config.plc.protocol = ProtocolMode::Legacy;
    }
    config.validate().context("Invalid settings")?;

    let _log_guard = app::logging::init(&config.logging);
    tracing::info!("Config path: {:?}", config_path);
    if let Some(note) = load_note {
        tracing::info!("{note}");
    }

    let mut client = PlcClient::new(
        &config.plc.host,
        config.plc.port,
        config.plc.timeout_secs,
        config.plc.protocol,
    )
    .with_max_aisle(config.control.max_aisle);

    match cli.command {
        Command::Status { json } => {
            let status = client.fetch_status().await?;
            print_status(&status, json)?;
        }
        Command::Open { aisle, json } => {
            client.check_aisle(aisle)?;
            client.connect().await?;
            let result = client.open_aisle(aisle).await;
            client.disconnect().await?;
            print_status(&result?, json)?;
        }
        Command::Watch { interval, count } => {
            let interval = Duration::from_secs(interval.unwrap_or(config.control.poll_interval_secs).max(1));
            let mut state = MonitorState::new(config.control.history_size);
            let mut ticker = tokio::time::interval(interval);
            let mut polls = 0usize;

            loop {
                ticker.tick().await;
                match poll_once(&mut client, &mut state).await {
                    Ok(snapshot) => {
                        let safety = wms::safety_assessment(&snapshot.record);
                        println!(
                            "{} [{}] {} - {}",
                            snapshot.received_at.format("%H:%M:%S"),
                            safety.severity,
                            safety.label,
                            safety.advice
                        );
                    }
                    Err(e) => tracing::error!("Poll failed: {e}"),
                }

                polls += 1;
                if count.is_some_and(|c| polls >= c) {
                    break;
                }
            }
        }
        Command::Diagnose => {
            let diagnosis = client.diagnose_connection().await;
            print!("{diagnosis}");
        }
        Command::Encode { request } => {
            let request = match request {
                EncodeRequest::Status => Request::Status,
                EncodeRequest::Open { aisle } => Request::OpenAisle(aisle),
            };
            let frame = wms::encode(request, config.plc.protocol)?;
            println!("{frame}");
        }
        Command::Decode { hex, json } => {
            let bytes = parse_hex(&hex).map_err(anyhow::Error::msg)?;
            let status = wms::parse(&bytes)?;
            print_status(&status, json)?;
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

fn print_status(status: &StatusRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&StatusView::new(status))?);
    } else {
        print!("{}", StatusReport(status));
        tracing::debug!("Raw reply: {}", format_hex(status.raw()));
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
