use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::path::Path;

use super::BackingStore;
use crate::config::AccessMode;
use crate::error::{HandleError, Result};

/// Local file store with random access support
pub struct LocalFileStore {
    file: File,
    path: String,
    size: u64,
    writable: bool,
}

impl LocalFileStore {
    /// Open `path`. Read-write mode creates the file when it is missing.
    pub fn open(path: &Path, mode: AccessMode) -> Result<Self> {
        let shown = path.to_string_lossy().into_owned();
        let file = match mode {
            AccessMode::Read => File::open(path),
            AccessMode::ReadWrite => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path),
        }
        .map_err(|e| HandleError::io(&shown, e))?;
        let size = file
            .metadata()
            .map_err(|e| HandleError::io(&shown, e))?
            .len();
        tracing::debug!(path = %shown, size, mode = mode.as_str(), "opened local file");
        Ok(Self {
            file,
            path: shown,
            size,
            writable: mode.is_writable(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn positional_read(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read(buf)
        }
    }

    fn positional_write(&self, offset: u64, data: &[u8]) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.write_all_at(data, offset)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Seek, SeekFrom, Write};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(data)
        }
    }
}

#[async_trait]
impl BackingStore for LocalFileStore {
    async fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.positional_read(offset + filled as u64, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HandleError::io(&self.path, e)),
            }
        }
        Ok(filled)
    }

    async fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.writable {
            return Err(HandleError::unsupported("write to read-only file"));
        }
        if offset > self.size {
            // set_len zero-fills (sparsely where the platform can)
            self.file
                .set_len(offset)
                .map_err(|e| HandleError::io(&self.path, e))?;
        }
        self.positional_write(offset, data)
            .map_err(|e| HandleError::io(&self.path, e))?;
        self.size = self.size.max(offset + data.len() as u64);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    async fn close(&mut self) -> Result<()> {
        if self.writable {
            self.file
                .sync_data()
                .map_err(|e| HandleError::io(&self.path, e))?;
        }
        Ok(())
    }
}
