//! # Recibo CLI
//!
//! Command-line interface for encoding and printing sale receipts.
//!
//! ## Usage
//!
//! ```bash
//! # Show the receipt as the printer would lay it out
//! recibo preview --sale sale.json --merchant merchant.json
//!
//! # Write the raw ESC/POS stream (hex dump on stdout without --out)
//! recibo encode --sale sale.json --merchant merchant.json --out receipt.bin
//!
//! # Run the full print pipeline against a simulated printer
//! recibo print --sale sale.json --merchant merchant.json --simulate
//!
//! # With the `ble` feature: scan, then print to a saved printer
//! recibo scan --seconds 5
//! recibo print --sale sale.json --merchant merchant.json --device AA:BB:CC:DD:EE:FF
//! recibo test-page --name MPT-II
//! ```
//!
//! `RUST_LOG=recibo=debug` shows negotiation and chunk-level logging.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "ble")]
use recibo::error::TransportError;

use recibo::{
    PrintError, PrintSession, PrinterProfile,
    error::ConfigError,
    receipt,
    sale::{MerchantProfile, PrinterIdentity, Sale},
    session,
    transport::{
        BleHost, WriteSupport,
        mock::{MockDevice, MockHost},
    },
};

/// Recibo - sale receipts for Bluetooth LE thermal printers
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Printer profile (JSON); defaults to the generic 58mm profile
    #[arg(long, global = true, value_name = "FILE")]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct SaleArgs {
    /// Sale record (JSON)
    #[arg(long, value_name = "FILE")]
    sale: PathBuf,

    /// Merchant profile (JSON)
    #[arg(long, value_name = "FILE")]
    merchant: PathBuf,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Saved printer id (Bluetooth address)
    #[arg(long)]
    device: Option<String>,

    /// Saved printer name, tried before the generic filters
    #[arg(long)]
    name: Option<String>,

    /// Print to an in-memory printer instead of real hardware
    #[arg(long)]
    simulate: bool,
}

impl TargetArgs {
    fn identity(&self) -> Option<PrinterIdentity> {
        if self.device.is_none() && self.name.is_none() {
            return None;
        }
        Some(PrinterIdentity {
            device_id: self.device.clone().unwrap_or_default(),
            display_name: self.name.clone(),
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a receipt to ESC/POS bytes
    Encode {
        #[command(flatten)]
        input: SaleArgs,

        /// Output file (hex dump on stdout if omitted)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Print a plain-text preview of a receipt
    Preview {
        #[command(flatten)]
        input: SaleArgs,
    },

    /// Print a receipt
    Print {
        #[command(flatten)]
        input: SaleArgs,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print a short test ticket
    TestPage {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// List nearby Bluetooth LE devices
    #[cfg(feature = "ble")]
    Scan {
        /// Scan duration
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Print(#[from] PrintError),

    #[cfg(feature = "ble")]
    #[error("Bluetooth error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[cfg(not(feature = "ble"))]
    #[error("Bluetooth support is not built in; rebuild with `--features ble` or pass --simulate")]
    NoBluetooth,
}

enum Job {
    Receipt(Box<(Sale, MerchantProfile)>),
    TestPage,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recibo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        match &e {
            CliError::Print(err) => eprintln!("Error: {}", err.user_message()),
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let profile = match &cli.profile {
        Some(path) => PrinterProfile::load(path)?,
        None => PrinterProfile::default(),
    };

    match cli.command {
        Commands::Encode { input, out } => {
            let (sale, merchant) = load_sale(&input)?;
            session::validate(&sale, &merchant)?;
            let stream = receipt::encode_receipt(&sale, &merchant, &profile);
            match out {
                Some(path) => {
                    fs::write(&path, stream.as_bytes())
                        .map_err(|source| CliError::Write { path: path.clone(), source })?;
                    println!("Wrote {} bytes to {}", stream.len(), path.display());
                }
                None => print!("{}", hex_dump(stream.as_bytes())),
            }
            Ok(())
        }

        Commands::Preview { input } => {
            let (sale, merchant) = load_sale(&input)?;
            for line in receipt::preview_lines(&sale, &merchant, &profile) {
                println!("{}", line);
            }
            Ok(())
        }

        Commands::Print { input, target } => {
            let job = Job::Receipt(Box::new(load_sale(&input)?));
            dispatch(profile, job, &target).await
        }

        Commands::TestPage { target } => dispatch(profile, Job::TestPage, &target).await,

        #[cfg(feature = "ble")]
        Commands::Scan { seconds } => {
            let host = recibo::transport::btle::BtleHost::new().await?;
            let devices = host.scan(std::time::Duration::from_secs(seconds)).await?;
            if devices.is_empty() {
                println!("No devices found");
            }
            for device in devices {
                println!(
                    "{}  {:<24} rssi={}",
                    device.id,
                    device.name.as_deref().unwrap_or("(unnamed)"),
                    device.rssi.map_or_else(|| "?".to_string(), |r| r.to_string()),
                );
            }
            Ok(())
        }
    }
}

async fn dispatch(profile: PrinterProfile, job: Job, target: &TargetArgs) -> Result<(), CliError> {
    if target.simulate {
        let printer = MockDevice::printer("00:00:00:00:00:00", "MPT-Simulated", WriteSupport::BOTH);
        let host = MockHost::new().with_discoverable(printer.clone());
        run_job(host, profile.without_delays(), job, target).await?;
        println!("Simulated printer received {} bytes", printer.received().len());
        return Ok(());
    }

    run_on_hardware(profile, job, target).await
}

#[cfg(feature = "ble")]
async fn run_on_hardware(profile: PrinterProfile, job: Job, target: &TargetArgs) -> Result<(), CliError> {
    let host = recibo::transport::btle::BtleHost::new().await?;
    run_job(host, profile, job, target).await
}

#[cfg(not(feature = "ble"))]
async fn run_on_hardware(_profile: PrinterProfile, _job: Job, _target: &TargetArgs) -> Result<(), CliError> {
    Err(CliError::NoBluetooth)
}

async fn run_job<H: BleHost>(
    host: H,
    profile: PrinterProfile,
    job: Job,
    target: &TargetArgs,
) -> Result<(), CliError> {
    let session = PrintSession::new(host, profile);
    let identity = target.identity();

    let outcome = match job {
        Job::Receipt(input) => {
            let (sale, merchant) = *input;
            session.print_receipt(&sale, &merchant, identity.as_ref()).await?
        }
        Job::TestPage => session.print_test_page(identity.as_ref()).await?,
    };

    println!("{}", outcome.message);
    println!(
        "  {} chunks, {} bytes, {:?} writes{}",
        outcome.report.chunks_sent,
        outcome.report.bytes_sent,
        outcome.report.mode,
        if outcome.report.switched_mode { " (after fallback)" } else { "" }
    );
    Ok(())
}

fn load_sale(args: &SaleArgs) -> Result<(Sale, MerchantProfile), ConfigError> {
    Ok((load_json(&args.sale)?, load_json(&args.merchant)?))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, row) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = row
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}  {:<47}  {}\n", i * 16, hex.join(" "), ascii));
    }
    out
}
