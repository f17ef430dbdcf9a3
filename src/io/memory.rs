use async_trait::async_trait;

use super::BackingStore;
use crate::config::AccessMode;
use crate::error::{HandleError, Result};

/// In-memory store over a growable byte vector
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Vec<u8>,
    writable: bool,
}

impl MemoryStore {
    pub fn new(data: Vec<u8>, mode: AccessMode) -> Self {
        Self {
            data,
            writable: mode.is_writable(),
        }
    }

    /// Empty, writable store.
    pub fn growable() -> Self {
        Self::new(Vec::new(), AccessMode::ReadWrite)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    async fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.writable {
            return Err(HandleError::unsupported("write to read-only buffer"));
        }
        let start = usize::try_from(offset)
            .map_err(|_| HandleError::unsupported("write beyond addressable memory"))?;
        let end = start + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}
