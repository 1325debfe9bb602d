//! Download-then-relay of a single photo through a transient local file.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tracing::{debug, warn};

use crate::{
    domain::{ChatId, PhotoRef},
    messaging::port::MessagingPort,
    ports::ProfilePhotoSource,
    Result,
};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A uniquely named temp file owned by one transfer.
///
/// The file (and any extra path tracked with [`TempPhotoFile::track`]) is
/// removed by [`TempPhotoFile::remove`], or on drop if that never ran.
#[derive(Debug)]
pub struct TempPhotoFile {
    paths: Vec<PathBuf>,
}

impl TempPhotoFile {
    pub fn allocate(dir: &Path) -> Self {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let pid = std::process::id();
        let n = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self {
            paths: vec![dir.join(format!("dp_{ts}_{pid}_{n}.jpg"))],
        }
    }

    pub fn path(&self) -> &Path {
        &self.paths[0]
    }

    /// Also delete `path` on cleanup (e.g. a download that landed elsewhere).
    pub fn track(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub async fn remove(mut self) {
        for path in std::mem::take(&mut self.paths) {
            log_removal(&path, tokio::fs::remove_file(&path).await);
        }
    }
}

impl Drop for TempPhotoFile {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            log_removal(&path, std::fs::remove_file(&path));
        }
    }
}

fn log_removal(path: &Path, res: io::Result<()>) {
    match res {
        Ok(()) => debug!(path = %path.display(), "removed temp photo"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp photo"),
    }
}

/// Moves one remote photo into a chat via a temp file.
pub struct MediaTransfer {
    source: Arc<dyn ProfilePhotoSource>,
    messenger: Arc<dyn MessagingPort>,
    temp_dir: PathBuf,
}

impl MediaTransfer {
    pub fn new(
        source: Arc<dyn ProfilePhotoSource>,
        messenger: Arc<dyn MessagingPort>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            messenger,
            temp_dir,
        }
    }

    /// Download `photo` and send it to `chat_id`. Never fails; returns whether
    /// the photo was delivered. The temp file is gone when this returns.
    pub async fn transfer(&self, photo: &PhotoRef, chat_id: ChatId, caption: Option<&str>) -> bool {
        let mut temp = TempPhotoFile::allocate(&self.temp_dir);
        let outcome = self
            .download_and_send(photo, chat_id, caption, &mut temp)
            .await;
        temp.remove().await;

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                warn!(chat_id = chat_id.0, file_id = %photo.file_id, "download not confirmed; photo skipped");
                false
            }
            Err(e) => {
                warn!(chat_id = chat_id.0, file_id = %photo.file_id, error = %e, "photo transfer failed");
                false
            }
        }
    }

    async fn download_and_send(
        &self,
        photo: &PhotoRef,
        chat_id: ChatId,
        caption: Option<&str>,
        temp: &mut TempPhotoFile,
    ) -> Result<bool> {
        let Some(downloaded) = self.source.download_photo(photo, temp.path()).await? else {
            return Ok(false);
        };
        temp.track(downloaded.clone());

        self.messenger
            .send_photo(chat_id, &downloaded, caption)
            .await?;
        Ok(true)
    }
}
