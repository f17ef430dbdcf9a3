use byteorder::{BigEndian, ByteOrder};

use super::Handle;
use crate::error::Result;
use crate::io::BackingStore;

impl<S: BackingStore> Handle<S> {
    /// Write all of `data` at the pointer, growing the store when it ends
    /// past the current length.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.put(data, "write").await
    }

    pub async fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value], "write_u8").await
    }

    pub async fn write_i8(&mut self, value: i8) -> Result<()> {
        self.put(&[value as u8], "write_i8").await
    }

    pub async fn write_bool(&mut self, value: bool) -> Result<()> {
        self.put(&[value as u8], "write_bool").await
    }

    pub async fn write_u16(&mut self, value: u16) -> Result<()> {
        let mut bytes = [0u8; 2];
        BigEndian::write_u16(&mut bytes, value);
        self.put(&bytes, "write_u16").await
    }

    pub async fn write_i16(&mut self, value: i16) -> Result<()> {
        let mut bytes = [0u8; 2];
        BigEndian::write_i16(&mut bytes, value);
        self.put(&bytes, "write_i16").await
    }

    pub async fn write_char_unit(&mut self, unit: u16) -> Result<()> {
        let mut bytes = [0u8; 2];
        BigEndian::write_u16(&mut bytes, unit);
        self.put(&bytes, "write_char_unit").await
    }

    pub async fn write_u32(&mut self, value: u32) -> Result<()> {
        let mut bytes = [0u8; 4];
        BigEndian::write_u32(&mut bytes, value);
        self.put(&bytes, "write_u32").await
    }

    pub async fn write_i32(&mut self, value: i32) -> Result<()> {
        let mut bytes = [0u8; 4];
        BigEndian::write_i32(&mut bytes, value);
        self.put(&bytes, "write_i32").await
    }

    pub async fn write_u64(&mut self, value: u64) -> Result<()> {
        let mut bytes = [0u8; 8];
        BigEndian::write_u64(&mut bytes, value);
        self.put(&bytes, "write_u64").await
    }

    pub async fn write_i64(&mut self, value: i64) -> Result<()> {
        let mut bytes = [0u8; 8];
        BigEndian::write_i64(&mut bytes, value);
        self.put(&bytes, "write_i64").await
    }

    pub async fn write_f32(&mut self, value: f32) -> Result<()> {
        let mut bytes = [0u8; 4];
        BigEndian::write_f32(&mut bytes, value);
        self.put(&bytes, "write_f32").await
    }

    pub async fn write_f64(&mut self, value: f64) -> Result<()> {
        let mut bytes = [0u8; 8];
        BigEndian::write_f64(&mut bytes, value);
        self.put(&bytes, "write_f64").await
    }

    /// Write each UTF-16 code unit of `text` as two bytes, high byte first.
    pub async fn write_chars(&mut self, text: &str) -> Result<()> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut bytes = vec![0u8; units.len() * 2];
        BigEndian::write_u16_into(&units, &mut bytes);
        self.put(&bytes, "write_chars").await
    }

    /// Write the low byte of each UTF-16 code unit of `text`.
    pub async fn write_bytes_str(&mut self, text: &str) -> Result<()> {
        let bytes: Vec<u8> = text.encode_utf16().map(|unit| unit as u8).collect();
        self.put(&bytes, "write_bytes_str").await
    }
}
