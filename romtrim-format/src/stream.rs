use std::fs::File;
use std::io::{Cursor, Read, Result, Seek, Write};

/// A byte stream a header can be trimmed from: readable, writable, seekable,
/// with a known total length and support for truncating to a shorter length.
///
/// The trimmer depends only on this trait, never on whether the bytes come
/// from a plain file or from an archive entry held in memory.
pub trait TrimStream: Read + Write + Seek {
    /// Total length of the stream in bytes.
    fn byte_len(&mut self) -> Result<u64>;

    /// Truncate the stream to `len` bytes.
    fn truncate(&mut self, len: u64) -> Result<()>;
}

impl TrimStream for File {
    fn byte_len(&mut self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> Result<()> {
        self.set_len(len)
    }
}

impl TrimStream for Cursor<Vec<u8>> {
    fn byte_len(&mut self) -> Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn truncate(&mut self, len: u64) -> Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}
