//! The cached slice of the backing store a handle works through.
//!
//! A window claims the bytes `[start, start + data.len())` of the store. Clean
//! bytes always equal the store's; bytes inside `dirty` are newer than the
//! store's and must be written back before the window moves.

use std::ops::Range;

#[derive(Debug, Default)]
pub(crate) struct Window {
    pub(crate) start: u64,
    pub(crate) data: Vec<u8>,
    pub(crate) dirty: Option<Range<usize>>,
}

impl Window {
    pub(crate) fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }

    pub(crate) fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.end()
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Whether `len` bytes written at `pos` can be staged in place: the write
    /// must start inside or directly after the claimed bytes and fit in
    /// `capacity`.
    pub(crate) fn can_stage(&self, pos: u64, len: usize, capacity: usize) -> bool {
        pos >= self.start
            && pos <= self.end()
            && pos + len as u64 <= self.start + capacity as u64
    }

    /// Copy `bytes` into the window at absolute offset `pos` and mark them
    /// dirty. Caller checked [`can_stage`](Self::can_stage).
    pub(crate) fn stage(&mut self, pos: u64, bytes: &[u8]) {
        let offset = (pos - self.start) as usize;
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        self.dirty = Some(match self.dirty.take() {
            Some(range) => range.start.min(offset)..range.end.max(end),
            None => offset..end,
        });
    }

    /// Drop the current contents and stage `bytes` as a fresh window at `pos`.
    pub(crate) fn restage(&mut self, pos: u64, bytes: &[u8]) {
        self.start = pos;
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.dirty = Some(0..bytes.len());
    }

    /// Overwrite whatever part of the window overlaps `[pos, pos + bytes.len())`
    /// with `bytes`, leaving dirtiness unchanged.
    pub(crate) fn patch(&mut self, pos: u64, bytes: &[u8]) {
        let lo = pos.max(self.start);
        let hi = (pos + bytes.len() as u64).min(self.end());
        if lo >= hi {
            return;
        }
        let dst = (lo - self.start) as usize..(hi - self.start) as usize;
        let src = (lo - pos) as usize..(hi - pos) as usize;
        self.data[dst].copy_from_slice(&bytes[src]);
    }

    /// Bytes available from `pos` to the end of the window.
    pub(crate) fn tail(&self, pos: u64) -> &[u8] {
        &self.data[(pos - self.start) as usize..]
    }
}
