mod http;
mod local;
mod memory;

pub use http::{HttpStore, RemoteMetadata};
pub use local::LocalFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::{HandleError, Result};

/// Trait for random access to the bytes behind a handle
///
/// A store does no buffering of its own beyond what its medium requires; the
/// [`Handle`](crate::Handle) window sits on top of it.
#[async_trait]
pub trait BackingStore: Send {
    /// Read data at the specified offset into the buffer.
    ///
    /// Returns fewer bytes than requested only when the data ends first.
    async fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Write `data` at `offset`, extending the store if it ends past the
    /// current size. Any gap between the old size and `offset` reads back as
    /// zeros.
    async fn write_at(&mut self, _offset: u64, _data: &[u8]) -> Result<()> {
        Err(HandleError::unsupported("write"))
    }

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Whether [`write_at`](Self::write_at) is available.
    fn is_writable(&self) -> bool {
        false
    }

    /// Push buffered writes down to the medium.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the underlying descriptor or connection.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<S: BackingStore + ?Sized> BackingStore for Box<S> {
    async fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf).await
    }

    async fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        (**self).write_at(offset, data).await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}
