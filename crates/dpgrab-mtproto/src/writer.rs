use std::{io, path::Path};

use tokio::{fs::File, io::AsyncWriteExt};

/// Streams download chunks into a file.
///
/// The file is only complete once [`ChunkWriter::finish`] returns; readers
/// opening the path earlier may see a short file.
pub struct ChunkWriter {
    file: File,
    written: u64,
}

impl ChunkWriter {
    pub async fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: File::create(path).await?,
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush pending writes to disk and return the total byte count.
    pub async fn finish(mut self) -> io::Result<u64> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.written)
    }
}
