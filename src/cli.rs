use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_WINDOW_SIZE, HandleConfig, RemoteConfig};

#[derive(Parser, Debug)]
#[command(name = "locio")]
#[command(version)]
#[command(about = "Inspect local files and HTTP resources through a random-access handle", long_about = None)]
#[command(after_help = "Examples:\n  \
  locio info ./image.tif                    show metadata for a local file\n  \
  locio dump -s 0 -n 64 https://example.com/a.bin   hex dump the first 64 bytes\n  \
  locio peek -t f64 -s 16 -c 2 data.bin     decode two big-endian doubles at offset 16")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Window size in bytes for buffered access
    #[arg(short = 'w', long, global = true, env = "LOCIO_WINDOW_SIZE", default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,

    /// Request timeout for remote resources, in seconds
    #[arg(long, global = true, env = "LOCIO_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show metadata for a path or URL
    Info {
        /// Local path or URL
        path: String,
    },

    /// List the entries of a directory
    Ls {
        /// Directory path
        path: String,

        /// Include hidden entries
        #[arg(short = 'a')]
        all: bool,
    },

    /// Hex dump a byte range
    Dump {
        /// Local path or URL
        path: String,

        /// Offset of the first byte
        #[arg(short = 's', long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes (default: to the end)
        #[arg(short = 'n', long)]
        count: Option<u64>,
    },

    /// Decode big-endian values
    Peek {
        /// Local path or URL
        path: String,

        /// Value type
        #[arg(short = 't', long = "type", value_enum)]
        kind: ValueKind,

        /// Offset of the first value
        #[arg(short = 's', long, default_value_t = 0)]
        offset: u64,

        /// Number of consecutive values
        #[arg(short = 'c', long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Cli {
    pub fn handle_config(&self) -> HandleConfig {
        let mut remote = RemoteConfig::default();
        if let Some(secs) = self.timeout {
            remote = remote.with_timeout(Duration::from_secs(secs));
        }
        HandleConfig::default()
            .with_window_size(self.window_size)
            .with_remote(remote)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.quiet {
            0 => "warn",
            1 => "error",
            _ => "off",
        }
    }
}
