//! Buffered random-access handles.
//!
//! A [`Handle`] owns one [`BackingStore`] and funnels every read and write
//! through a single in-memory [window](window::Window) over the store's
//! bytes. Small, scattered accesses are amortized into fewer and larger store
//! calls, while everything a caller can observe is independent of the window
//! size.
//!
//! ## Window discipline
//!
//! 1. An access that falls entirely inside the window is served from it.
//! 2. Otherwise the window is flushed and refilled at the access position,
//!    sized to the configured capacity (or to the access, if larger).
//! 3. Writes are staged in the window when they continue it; other writes
//!    start a fresh staged window, or go straight to the store when they are at
//!    least a window long. Bytes already cached are patched in place so a later
//!    read never sees stale data.
//! 4. A write past the current length grows the store; any gap reads back as
//!    zeros.
//! 5. [`Handle::close`] writes back whatever is still staged.
//!
//! All multi-byte values are big-endian.
//!
//! ## Example
//!
//! ```no_run
//! use locio::{AccessMode, Handle};
//!
//! # async fn demo() -> locio::Result<()> {
//! let mut handle = Handle::open_file("data.bin", AccessMode::ReadWrite, 4096)?;
//! handle.seek(8);
//! handle.write_f32(-1.0).await?;
//! handle.seek(8);
//! assert_eq!(handle.read_f32().await?, -1.0);
//! handle.close().await?;
//! # Ok(())
//! # }
//! ```

mod read;
mod text;
mod window;
mod write;

use std::path::Path;

use crate::config::{AccessMode, RemoteConfig};
use crate::error::{HandleError, Result};
use crate::io::{BackingStore, HttpStore, LocalFileStore, MemoryStore};

use window::Window;

/// Widest fixed-width value a handle decodes.
///
/// Reads longer than this that also exceed the window capacity bypass the
/// window and go straight to the store.
const MAX_PRIMITIVE_WIDTH: usize = 8;

/// A handle whose backend is chosen at runtime.
pub type DynHandle = Handle<Box<dyn BackingStore>>;

/// An open random-access session over one backing store.
///
/// A handle has a single owner; every operation that touches the store takes
/// `&mut self` and completes before the next one starts. Call
/// [`close`](Self::close) (or at least [`flush`](Self::flush)) before
/// dropping a writable handle.
pub struct Handle<S> {
    store: S,
    pointer: u64,
    length: u64,
    capacity: usize,
    window: Window,
}

impl Handle<LocalFileStore> {
    /// Open a local file. Read-write mode creates a missing file.
    pub fn open_file(path: impl AsRef<Path>, mode: AccessMode, window_size: usize) -> Result<Self> {
        let store = LocalFileStore::open(path.as_ref(), mode)?;
        Ok(Self::new(store, window_size))
    }
}

impl Handle<HttpStore> {
    /// Open a remote resource read-only.
    pub async fn open_url(url: &str, config: &RemoteConfig, window_size: usize) -> Result<Self> {
        let store = HttpStore::open(url, config).await?;
        Ok(Self::new(store, window_size))
    }
}

impl Handle<MemoryStore> {
    /// Wrap a byte vector.
    pub fn from_bytes(data: Vec<u8>, mode: AccessMode, window_size: usize) -> Self {
        Self::new(MemoryStore::new(data, mode), window_size)
    }
}

impl<S: BackingStore> Handle<S> {
    /// Create a handle over `store` with a window of `window_size` bytes
    /// (at least one).
    pub fn new(store: S, window_size: usize) -> Self {
        let length = store.size();
        Self {
            store,
            pointer: 0,
            length,
            capacity: window_size.max(1),
            window: Window::default(),
        }
    }

    /// Current length in bytes, including staged writes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Offset of the next read or write.
    pub fn file_pointer(&self) -> u64 {
        self.pointer
    }

    pub fn window_size(&self) -> usize {
        self.capacity
    }

    pub fn is_writable(&self) -> bool {
        self.store.is_writable()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Move the file pointer. Any position is accepted; reading past the
    /// length fails later.
    pub fn seek(&mut self, pos: u64) {
        self.pointer = pos;
    }

    /// Advance the pointer by up to `n` bytes without passing the length.
    ///
    /// Returns how far the pointer actually moved; non-positive `n` moves
    /// nothing.
    pub fn skip_bytes(&mut self, n: i64) -> u64 {
        if n <= 0 {
            return 0;
        }
        let remaining = self.length.saturating_sub(self.pointer);
        let skipped = (n as u64).min(remaining);
        self.pointer += skipped;
        skipped
    }

    /// Write staged bytes back to the store.
    pub async fn flush(&mut self) -> Result<()> {
        self.flush_window().await?;
        self.store.flush().await
    }

    /// Flush and release the store.
    ///
    /// A failure to release is reported after the flush has already
    /// persisted the staged bytes.
    pub async fn close(mut self) -> Result<()> {
        self.flush().await?;
        self.store.close().await
    }

    fn check_available(&self, requested: usize) -> Result<()> {
        let end = self.pointer.checked_add(requested as u64);
        if end.is_none_or(|end| end > self.length) {
            return Err(HandleError::EndOfStream {
                offset: self.pointer,
                requested: requested as u64,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Fill `out` with the bytes at `pos`. The caller has checked that they
    /// lie below the length.
    async fn copy_out(&mut self, pos: u64, out: &mut [u8]) -> Result<()> {
        let mut done = 0;
        while done < out.len() {
            let at = pos + done as u64;
            let remaining = out.len() - done;
            if !self.window.contains(at) {
                if remaining > self.capacity && remaining > MAX_PRIMITIVE_WIDTH {
                    return self.read_direct(at, &mut out[done..]).await;
                }
                self.refill(at, remaining).await?;
            }
            let tail = self.window.tail(at);
            let n = tail.len().min(remaining);
            out[done..done + n].copy_from_slice(&tail[..n]);
            done += n;
        }
        Ok(())
    }

    async fn refill(&mut self, at: u64, need: usize) -> Result<()> {
        self.flush_window().await?;

        let size = (self.capacity.max(need) as u64).min(self.length.saturating_sub(at)) as usize;
        let mut data = std::mem::take(&mut self.window.data);
        data.clear();
        data.resize(size, 0);
        let got = self.store.read_at(at, &mut data).await?;
        data.truncate(got);
        self.window.start = at;
        self.window.data = data;
        tracing::debug!(offset = at, len = got, "refilled window");

        if got == 0 {
            return Err(HandleError::EndOfStream {
                offset: at,
                requested: need as u64,
                length: self.length,
            });
        }
        Ok(())
    }

    async fn read_direct(&mut self, at: u64, out: &mut [u8]) -> Result<()> {
        self.flush_window().await?;
        let got = self.store.read_at(at, out).await?;
        tracing::trace!(offset = at, len = got, "direct read");
        if got < out.len() {
            return Err(HandleError::EndOfStream {
                offset: at + got as u64,
                requested: (out.len() - got) as u64,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Write `bytes` at the pointer and advance it.
    async fn put(&mut self, bytes: &[u8], operation: &'static str) -> Result<()> {
        if !self.store.is_writable() {
            return Err(HandleError::unsupported(operation));
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let pos = self.pointer;
        let end = pos
            .checked_add(bytes.len() as u64)
            .ok_or_else(|| HandleError::unsupported("write beyond the largest offset"))?;

        if self.window.can_stage(pos, bytes.len(), self.capacity) {
            self.window.stage(pos, bytes);
        } else {
            self.flush_window().await?;
            if bytes.len() >= self.capacity {
                self.store.write_at(pos, bytes).await?;
                self.window.patch(pos, bytes);
                tracing::trace!(offset = pos, len = bytes.len(), "direct write");
            } else {
                self.window.restage(pos, bytes);
            }
        }

        self.length = self.length.max(end);
        self.pointer = end;
        Ok(())
    }

    async fn flush_window(&mut self) -> Result<()> {
        let Some(range) = self.window.dirty.take() else {
            return Ok(());
        };
        let offset = self.window.start + range.start as u64;
        tracing::debug!(offset, len = range.len(), "flushing window");
        if let Err(e) = self
            .store
            .write_at(offset, &self.window.data[range.clone()])
            .await
        {
            self.window.dirty = Some(range);
            return Err(e);
        }
        Ok(())
    }
}

impl<S> Drop for Handle<S> {
    fn drop(&mut self) {
        if let Some(range) = &self.window.dirty {
            tracing::warn!(
                offset = self.window.start + range.start as u64,
                len = range.len(),
                "handle dropped with unflushed writes"
            );
        }
    }
}
