use byteorder::{BigEndian, ByteOrder};

use super::Handle;
use crate::error::Result;
use crate::io::BackingStore;

impl<S: BackingStore> Handle<S> {
    /// Read up to `buf.len()` bytes at the pointer.
    ///
    /// Stops at the length instead of failing; returns the number of bytes
    /// placed at the front of `buf` (0 at or past the end). The rest of `buf`
    /// is left untouched.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = self.length.saturating_sub(self.pointer);
        let n = (buf.len() as u64).min(available) as usize;
        if n == 0 {
            return Ok(0);
        }
        let pos = self.pointer;
        self.copy_out(pos, &mut buf[..n]).await?;
        self.pointer += n as u64;
        Ok(n)
    }

    /// Fill `buf` completely or fail with an end-of-stream error, leaving the
    /// pointer where it was.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_available(buf.len())?;
        let pos = self.pointer;
        self.copy_out(pos, buf).await?;
        self.pointer += buf.len() as u64;
        Ok(())
    }

    async fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.read_exact(&mut bytes).await?;
        Ok(bytes)
    }

    pub async fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>().await?[0])
    }

    pub async fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8().await? as i8)
    }

    /// One byte; anything but zero is `true`.
    pub async fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8().await? != 0)
    }

    pub async fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(&self.read_array::<2>().await?))
    }

    pub async fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(&self.read_array::<2>().await?))
    }

    /// One UTF-16 code unit, as written by
    /// [`write_char_unit`](Self::write_char_unit).
    pub async fn read_char_unit(&mut self) -> Result<u16> {
        self.read_u16().await
    }

    pub async fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(&self.read_array::<4>().await?))
    }

    pub async fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(&self.read_array::<4>().await?))
    }

    pub async fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(&self.read_array::<8>().await?))
    }

    pub async fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(&self.read_array::<8>().await?))
    }

    pub async fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(&self.read_array::<4>().await?))
    }

    pub async fn read_f64(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(&self.read_array::<8>().await?))
    }
}
