//! Main entry point for the locio CLI application.
//!
//! This binary inspects local files and remote URLs through the same
//! [`Location`] and [`Handle`](locio::Handle) API the library exposes.

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use locio::cli::{Command, ValueKind};
use locio::{Cli, DynHandle, HandleConfig, Location};

/// Application entry point.
///
/// Parses command-line arguments, installs the log subscriber and dispatches
/// to the handler for the chosen subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.handle_config();
    let locate = |path: &str| Location::new(path).with_remote_config(config.remote.clone());
    match &cli.command {
        Command::Info { path } => show_info(&locate(path)).await,
        Command::Ls { path, all } => list_entries(&locate(path), *all),
        Command::Dump {
            path,
            offset,
            count,
        } => dump(&locate(path), &config, *offset, *count).await,
        Command::Peek {
            path,
            kind,
            offset,
            count,
        } => peek(&locate(path), &config, *kind, *offset, *count).await,
    }
}

/// Print every piece of metadata a location exposes.
async fn show_info(location: &Location) -> Result<()> {
    let exists = location.exists().await;

    println!("{:<12} {}", "path", location);
    println!("{:<12} {}", "backend", if location.is_remote() { "remote" } else { "local" });
    println!("{:<12} {}", "exists", exists);
    println!("{:<12} {}", "directory", location.is_directory());
    println!("{:<12} {}", "hidden", location.is_hidden());
    println!(
        "{:<12} {}{}",
        "mode",
        if location.can_read().await { "r" } else { "-" },
        if location.can_write() { "w" } else { "-" }
    );
    if exists {
        println!("{:<12} {}", "length", format_size(location.length().await));
    }
    println!("{:<12} {}", "canonical", location.canonical_path());
    if let Some(parent) = location.parent() {
        println!("{:<12} {}", "parent", parent);
    }
    match location.to_url() {
        Ok(url) => println!("{:<12} {}", "url", url),
        Err(e) => println!("{:<12} ({})", "url", e),
    }

    Ok(())
}

/// List directory entries, one per line.
///
/// Hidden entries are only shown with `-a`.
fn list_entries(location: &Location, all: bool) -> Result<()> {
    let Some(names) = location.list_filtered(!all) else {
        bail!("{} is not a readable directory", location);
    };
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Hex dump `count` bytes starting at `offset`, 16 bytes per line.
async fn dump(location: &Location, config: &HandleConfig, offset: u64, count: Option<u64>) -> Result<()> {
    let mut handle = location.open(config).await?;
    let result = dump_range(&mut handle, offset, count).await;
    handle.close().await?;
    result
}

async fn dump_range(handle: &mut DynHandle, offset: u64, count: Option<u64>) -> Result<()> {
    let available = handle.length().saturating_sub(offset);
    let mut remaining = count.map_or(available, |c| c.min(available));
    handle.seek(offset);

    let mut line = [0u8; 16];
    while remaining > 0 {
        let at = handle.file_pointer();
        let want = remaining.min(line.len() as u64) as usize;
        let n = handle.read(&mut line[..want]).await?;
        if n == 0 {
            break;
        }
        println!("{}", format_hex_line(at, &line[..n]));
        remaining -= n as u64;
    }
    Ok(())
}

/// Decode `count` consecutive values of `kind` starting at `offset`.
async fn peek(
    location: &Location,
    config: &HandleConfig,
    kind: ValueKind,
    offset: u64,
    count: usize,
) -> Result<()> {
    let mut handle = location.open(config).await?;
    handle.seek(offset);

    let mut result = Ok(());
    for _ in 0..count {
        let at = handle.file_pointer();
        match read_value(&mut handle, kind).await {
            Ok(value) => println!("{:>10}  {}", at, value),
            Err(e) => {
                result = Err(e.into());
                break;
            }
        }
    }
    handle.close().await?;
    result
}

async fn read_value(handle: &mut DynHandle, kind: ValueKind) -> locio::Result<String> {
    Ok(match kind {
        ValueKind::I8 => handle.read_i8().await?.to_string(),
        ValueKind::U8 => handle.read_u8().await?.to_string(),
        ValueKind::I16 => handle.read_i16().await?.to_string(),
        ValueKind::U16 => handle.read_u16().await?.to_string(),
        ValueKind::I32 => handle.read_i32().await?.to_string(),
        ValueKind::U32 => handle.read_u32().await?.to_string(),
        ValueKind::I64 => handle.read_i64().await?.to_string(),
        ValueKind::U64 => handle.read_u64().await?.to_string(),
        ValueKind::F32 => handle.read_f32().await?.to_string(),
        ValueKind::F64 => handle.read_f64().await?.to_string(),
    })
}

/// Format one hex dump line: offset, hex bytes, printable ASCII.
fn format_hex_line(offset: u64, bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!("{:08x}  {:<47}  |{}|", offset, hex.join(" "), ascii)
}

/// Byte count with a binary unit, plus the exact value when scaled.
fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    let mut scaled = size as f64;
    let mut unit = None;
    for name in UNITS {
        if scaled < 1024.0 {
            break;
        }
        scaled /= 1024.0;
        unit = Some(name);
    }
    match unit {
        Some(name) => format!("{scaled:.1} {name} ({size} bytes)"),
        None => format!("{size} bytes"),
    }
}
