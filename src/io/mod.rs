//! Archive sources.
//!
//! The walker works on an in-memory buffer. [`read_all`] loads that buffer
//! from any [`ReadAt`] source, reading it in bounded chunks.

mod local;

pub use local::LocalFileReader;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::Path;

/// Largest single read issued while loading a source.
const CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Open a local archive file.
pub fn open(path: &Path) -> Result<LocalFileReader> {
    LocalFileReader::new(path).with_context(|| format!("Cannot open {}", path.display()))
}

/// Load the whole source into memory.
pub async fn read_all<R: ReadAt + ?Sized>(reader: &R) -> Result<Vec<u8>> {
    let size = usize::try_from(reader.size()).context("Source too large for memory")?;
    let mut buf = vec![0u8; size];

    let mut offset = 0;
    while offset < size {
        let end = (offset + CHUNK_SIZE).min(size);
        let n = reader.read_at(offset as u64, &mut buf[offset..end]).await?;
        if n == 0 {
            bail!("Source ended at {offset:#x}, expected {size:#x} bytes");
        }
        offset += n;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that hands out at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        step: usize,
    }

    #[async_trait]
    impl ReadAt for Trickle {
        async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
            let start = (offset as usize).min(self.data.len());
            let n = buf.len().min(self.step).min(self.data.len() - start);
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            Ok(n)
        }

        fn size(&self) -> u64 {
            self.data.len() as u64
        }
    }

    #[tokio::test]
    async fn short_reads_are_resumed() {
        let source = Trickle {
            data: (0u8..=255).collect(),
            step: 7,
        };
        assert_eq!(read_all(&source).await.unwrap(), source.data);
    }

    #[tokio::test]
    async fn source_shorter_than_its_size_fails() {
        struct Liar;

        #[async_trait]
        impl ReadAt for Liar {
            async fn read_at(&self, _offset: u64, _buf: &mut [u8]) -> Result<usize> {
                Ok(0)
            }

            fn size(&self) -> u64 {
                16
            }
        }

        let err = read_all(&Liar).await.unwrap_err();
        assert!(err.to_string().contains("Source ended at 0x0"));
    }
}
