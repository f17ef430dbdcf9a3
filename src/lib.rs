//! # locio
//!
//! Random-access binary I/O that behaves the same whether the bytes live on
//! local disk, behind an HTTP URL, or in memory.
//!
//! A [`Location`] classifies a path string as local or remote and answers
//! filesystem-style questions about it (existence, directory-ness, listing,
//! canonical form, URL). Opening it yields a [`Handle`]: a buffered,
//! seekable session that decodes and encodes big-endian primitives and grows
//! writable stores on demand.
//!
//! ## Features
//!
//! - One handle contract over local files, HTTP resources and byte vectors
//! - Window-buffered access whose results never depend on the window size
//! - Big-endian integer, float and UTF-16 text codecs
//! - Writes past the end grow the store, zero-filling any gap
//! - Remote reads keep their connection open and reconnect with HTTP Range
//!   requests only when they must
//!
//! ## Example
//!
//! ```no_run
//! use locio::{HandleConfig, Location};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let location = Location::new("https://example.com/image.ics");
//!     if location.exists().await {
//!         let mut handle = location.open(&HandleConfig::default()).await?;
//!         let magic = handle.read_u32().await?;
//!         println!("{} bytes, magic {:#010x}", handle.length(), magic);
//!         handle.close().await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handle;
pub mod io;
pub mod location;

pub use cli::Cli;
pub use config::{AccessMode, DEFAULT_WINDOW_SIZE, HandleConfig, RemoteConfig};
pub use error::{ErrorKind, HandleError, Result};
pub use handle::{DynHandle, Handle};
pub use io::{BackingStore, HttpStore, LocalFileStore, MemoryStore, RemoteMetadata};
pub use location::Location;
