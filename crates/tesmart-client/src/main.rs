//! `tesmart`: command-line control for TESmart HDMI switches.
//!
//! # Usage
//!
//! ```text
//! tesmart [OPTIONS] <COMMAND>
//!
//! Commands:
//!   devices          List configured devices
//!   status           Show source, sources and sound mode
//!   source           Print the active source
//!   select <NAME>    Switch to a source
//!   beeper <on|off>  Turn the beeper on or off
//!   list             Print the selectable sources
//!
//! Options:
//!   --config  <PATH>        Config file [default: platform config dir]
//!   --device  <SLUG>        Device from the config file
//!   --host    <HOST>        Talk to a device not in the config file
//!   --port    <PORT>        Port for --host [default: 5000]
//!   --dialect <lan|legacy>  Firmware dialect for --host [default: lan]
//!   --sources <A,B,..>      Source names for --host
//!   --source-ignore <A,..>  Sources to hide for --host
//! ```
//!
//! `--device` can be left out when the config file holds exactly one device.
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                   |
//! |-------------------|-------------------------------|
//! | `TESMART_CONFIG`  | Config file path              |
//! | `TESMART_DEVICE`  | Device slug                   |
//! | `RUST_LOG`        | Log filter (overrides config) |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tesmart_client::{load_config, AppConfig, DeviceConfig};
use tesmart_client::{SwitchClient, SwitchStatus, TcpTransport, Transport, TransportTimings};
use tesmart_core::{Dialect, SoundMode, DEFAULT_DEVICE_PORT};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control a TESmart HDMI switch over TCP.
#[derive(Debug, Parser)]
#[command(name = "tesmart", version)]
struct Cli {
    /// Path to config.toml.
    #[arg(long, global = true, env = "TESMART_CONFIG")]
    config: Option<PathBuf>,

    /// Slug of the device to control, as named under `[devices.<slug>]`.
    #[arg(long, global = true, env = "TESMART_DEVICE", conflicts_with = "host")]
    device: Option<String>,

    /// Hostname or IP address of a device not listed in the config file.
    #[arg(long, global = true)]
    host: Option<String>,

    /// TCP port of the device given with --host.
    #[arg(long, global = true, requires = "host")]
    port: Option<u16>,

    /// Firmware dialect of the device given with --host.
    #[arg(long, global = true, requires = "host")]
    dialect: Option<Dialect>,

    /// Comma-separated source names for the device given with --host.
    #[arg(long, global = true, requires = "host", value_delimiter = ',')]
    sources: Vec<String>,

    /// Comma-separated source names to hide, for the device given with --host.
    #[arg(long, global = true, requires = "host", value_delimiter = ',')]
    source_ignore: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the devices in the config file.
    Devices,
    /// Show the device's current state.
    Status,
    /// Print the active source.
    Source,
    /// Switch to the named source.
    Select { name: String },
    /// Turn the beeper on or off.
    Beeper { mode: SoundMode },
    /// Print the sources that can be selected.
    List,
}

impl Cli {
    /// Picks the device entry named by the flags: an ad-hoc `--host`, an
    /// explicit `--device`, or the only configured device.
    fn device_config(&self, config: &AppConfig) -> anyhow::Result<(String, DeviceConfig)> {
        if let Some(host) = &self.host {
            let mut device = DeviceConfig::new(host.clone());
            device.port = self.port.unwrap_or(DEFAULT_DEVICE_PORT);
            device.dialect = self.dialect.unwrap_or_default();
            device.sources = self.sources.clone();
            device.source_ignore = self.source_ignore.clone();
            return Ok((host.clone(), device));
        }
        let (slug, device) = config.resolve_device(self.device.as_deref())?;
        Ok((slug.to_string(), device.clone()))
    }

    fn build_client(&self, config: &AppConfig) -> anyhow::Result<SwitchClient> {
        let (slug, device) = self.device_config(config)?;
        let transport: Arc<dyn Transport> =
            Arc::new(TcpTransport::new(TransportTimings::from(config.timings)));
        let client = device.build_client(&slug, transport)?;
        debug!(?client, "client ready");
        Ok(client)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_devices(config: &AppConfig) {
    if config.devices.is_empty() {
        println!("no devices configured");
        return;
    }
    for (slug, device) in &config.devices {
        println!(
            "{slug:<16} {:<24} {:<24} {}",
            device.display_name(slug),
            device.endpoint().to_string(),
            device.dialect
        );
    }
}

fn print_status(status: &SwitchStatus) {
    println!("{} ({}, {} firmware)", status.name, status.endpoint, status.dialect);
    println!("  available:  {}", if status.available { "yes" } else { "no" });
    println!("  source:     {}", status.source.as_deref().unwrap_or("unknown"));
    println!("  sources:    {}", status.sources.join(", "));
    match status.sound_mode {
        Some(mode) => println!("  sound mode: {mode}"),
        None => println!("  sound mode: unknown"),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    // `RUST_LOG` wins; otherwise the config file's `log_level`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Command::Devices = cli.command {
        print_devices(&config);
        return Ok(());
    }

    let client = cli.build_client(&config)?;

    match &cli.command {
        Command::Devices => {}
        Command::Status => print_status(&client.status().await),
        Command::Source => {
            let source = client
                .get_current_source()
                .await
                .with_context(|| format!("failed to read the source of {}", client.name()))?;
            println!("{source}");
        }
        Command::Select { name } => client
            .select_source(name)
            .await
            .with_context(|| format!("failed to select {name:?} on {}", client.name()))?,
        Command::Beeper { mode } => client
            .select_sound_mode(*mode)
            .await
            .with_context(|| format!("failed to set {mode} on {}", client.name()))?,
        Command::List => {
            for source in client.list_sources() {
                println!("{source}");
            }
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
