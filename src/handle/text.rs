//! Line-oriented reading on top of the window, for text formats such as
//! INI-style configuration files.

use super::Handle;
use crate::error::Result;
use crate::io::BackingStore;

impl<S: BackingStore> Handle<S> {
    /// Read the next line, without its terminator.
    ///
    /// A line ends at `\n`, `\r` or `\r\n`, or at the end of data. Returns
    /// `None` once the pointer is at or past the length. Bytes are decoded as
    /// UTF-8, replacing invalid sequences.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        if self.pointer >= self.length {
            return Ok(None);
        }

        let mut line = Vec::new();
        while self.pointer < self.length {
            match self.read_u8().await? {
                b'\n' => break,
                b'\r' => {
                    if self.pointer < self.length && self.read_u8().await? != b'\n' {
                        self.pointer -= 1;
                    }
                    break;
                }
                byte => line.push(byte),
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Read exactly `len` bytes as UTF-8 text.
    pub async fn read_string(&mut self, len: usize) -> Result<String> {
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
