//! Spill-to-disk buffer for encoded output.

use bytes::Bytes;
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;
use thumbra_error::{CodecError, CodecErrorKind, CodecResult};

/// Default in-memory ceiling before a scratch buffer rolls over to disk.
pub const DEFAULT_MEMORY_LIMIT: usize = 8 * 1024 * 1024;

/// Scratch space for one encoded thumbnail.
///
/// Held in memory up to its limit, then moved to an unnamed temp file.
/// Dropping the buffer releases both.
#[derive(Debug)]
pub struct Scratch {
    file: SpooledTempFile,
}

impl Scratch {
    /// Create an empty buffer that spills after `memory_limit` bytes.
    pub fn new(memory_limit: usize) -> Self {
        Self {
            file: SpooledTempFile::new(memory_limit),
        }
    }

    /// Whether the contents have spilled to disk.
    pub fn is_rolled(&self) -> bool {
        self.file.is_rolled()
    }

    /// Number of bytes written so far.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Scratch`] if the backing file cannot be sought.
    pub fn len(&mut self) -> CodecResult<u64> {
        let current = self.file.stream_position().map_err(scratch_error)?;
        let end = self.file.seek(SeekFrom::End(0)).map_err(scratch_error)?;
        self.file
            .seek(SeekFrom::Start(current))
            .map_err(scratch_error)?;
        Ok(end)
    }

    /// Whether nothing has been written.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Scratch`] if the backing file cannot be sought.
    pub fn is_empty(&mut self) -> CodecResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Read the full contents back, consuming the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Scratch`] if the contents cannot be read.
    pub fn into_bytes(mut self) -> CodecResult<Bytes> {
        self.file.seek(SeekFrom::Start(0)).map_err(scratch_error)?;
        let mut buffer = Vec::new();
        self.file.read_to_end(&mut buffer).map_err(scratch_error)?;
        Ok(Bytes::from(buffer))
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

impl Write for Scratch {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl Seek for Scratch {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

fn scratch_error(e: std::io::Error) -> CodecError {
    CodecError::new(CodecErrorKind::Scratch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_output_stays_in_memory() {
        let mut scratch = Scratch::new(1024);
        scratch.write_all(b"hello").unwrap();
        assert!(!scratch.is_rolled());
        assert_eq!(scratch.len().unwrap(), 5);
        assert_eq!(scratch.into_bytes().unwrap(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_large_output_spills_and_reads_back() {
        let payload = vec![7u8; 4096];
        let mut scratch = Scratch::new(16);
        scratch.write_all(&payload).unwrap();
        assert!(scratch.is_rolled());
        assert_eq!(scratch.into_bytes().unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_empty_buffer() {
        let mut scratch = Scratch::default();
        assert!(scratch.is_empty().unwrap());
        assert!(scratch.into_bytes().unwrap().is_empty());
    }
}
