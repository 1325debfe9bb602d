//! In-memory port implementations for unit tests.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, Opaque, PhotoRef, ResolvedUser, UserId},
    errors::Error,
    messaging::port::MessagingPort,
    ports::ProfilePhotoSource,
    Result,
};

#[derive(Clone, Copy, Debug)]
pub enum DownloadBehavior {
    Ok,
    Unconfirmed,
    /// Write a partial file, then fail.
    Fail,
}

#[derive(Clone, Debug)]
pub enum ResolveBehavior {
    Found,
    NotFound,
    Network,
    Unexpected,
}

pub struct FakeSource {
    pub resolve: Mutex<ResolveBehavior>,
    pub photo_count: Mutex<usize>,
    pub downloads: Mutex<HashMap<String, DownloadBehavior>>,
    pub resolve_calls: Mutex<Vec<String>>,
    pub list_calls: Mutex<Vec<usize>>,
    pub download_paths: Mutex<Vec<PathBuf>>,
}

impl FakeSource {
    pub fn with_photos(count: usize) -> Self {
        Self {
            resolve: Mutex::new(ResolveBehavior::Found),
            photo_count: Mutex::new(count),
            downloads: Mutex::new(HashMap::new()),
            resolve_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            download_paths: Mutex::new(Vec::new()),
        }
    }

    pub fn set_resolve(&self, behavior: ResolveBehavior) {
        *self.resolve.lock().unwrap() = behavior;
    }

    pub fn set_download(&self, file_id: &str, behavior: DownloadBehavior) {
        self.downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string(), behavior);
    }

    pub fn resolve_calls(&self) -> Vec<String> {
        self.resolve_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<usize> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn download_paths(&self) -> Vec<PathBuf> {
        self.download_paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfilePhotoSource for FakeSource {
    async fn resolve_user(&self, handle: &str) -> Result<ResolvedUser> {
        self.resolve_calls.lock().unwrap().push(handle.to_string());
        let behavior = self.resolve.lock().unwrap().clone();
        match behavior {
            ResolveBehavior::Found => Ok(ResolvedUser {
                id: UserId(1000),
                handle: handle.to_string(),
                remote: Opaque::empty(),
            }),
            ResolveBehavior::NotFound => Err(Error::Resolution {
                handle: handle.to_string(),
                reason: "user not found".to_string(),
            }),
            ResolveBehavior::Network => Err(Error::Network("connection reset".to_string())),
            ResolveBehavior::Unexpected => Err(Error::unexpected("api", "internal detail 42")),
        }
    }

    async fn list_profile_photos(
        &self,
        _user: &ResolvedUser,
        limit: usize,
    ) -> Result<Vec<PhotoRef>> {
        self.list_calls.lock().unwrap().push(limit);
        let available = *self.photo_count.lock().unwrap();
        Ok((0..available.min(limit))
            .map(|i| PhotoRef::new(format!("photo-{i}"), Opaque::empty()))
            .collect())
    }

    async fn download_photo(&self, photo: &PhotoRef, dest: &Path) -> Result<Option<PathBuf>> {
        self.download_paths
            .lock()
            .unwrap()
            .push(dest.to_path_buf());
        let behavior = self
            .downloads
            .lock()
            .unwrap()
            .get(&photo.file_id)
            .copied()
            .unwrap_or(DownloadBehavior::Ok);
        match behavior {
            DownloadBehavior::Ok => {
                tokio::fs::write(dest, photo.file_id.as_bytes()).await?;
                Ok(Some(dest.to_path_buf()))
            }
            DownloadBehavior::Unconfirmed => Ok(None),
            DownloadBehavior::Fail => {
                tokio::fs::write(dest, b"partial").await?;
                Err(Error::Transfer("download interrupted".to_string()))
            }
        }
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    texts: Mutex<Vec<(ChatId, String)>>,
    photos: Mutex<Vec<(ChatId, String, Option<String>)>>,
    fail_photo_contents: Mutex<HashSet<String>>,
    fail_texts: Mutex<bool>,
}

impl FakeMessenger {
    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*id),
        }
    }

    /// Fail any photo upload whose file content equals `content`.
    pub fn fail_photo_with_content(&self, content: &str) {
        self.fail_photo_contents
            .lock()
            .unwrap()
            .insert(content.to_string());
    }

    pub fn fail_all_texts(&self) {
        *self.fail_texts.lock().unwrap() = true;
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// (file content, caption) of every successful photo upload.
    pub fn photos(&self) -> Vec<(String, Option<String>)> {
        self.photos
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c, cap)| (c.clone(), cap.clone()))
            .collect()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if *self.fail_texts.lock().unwrap() {
            return Err(Error::Network("send failed".to_string()));
        }
        self.texts
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<MessageRef> {
        let content = tokio::fs::read_to_string(path).await?;
        if self.fail_photo_contents.lock().unwrap().contains(&content) {
            return Err(Error::Transfer(format!("upload rejected: {content}")));
        }
        self.photos
            .lock()
            .unwrap()
            .push((chat_id, content, caption.map(str::to_string)));
        Ok(self.alloc(chat_id))
    }
}

/// Every regular file left under `dir`.
pub fn leftover_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|rd| rd.flatten().map(|e| e.path()).collect())
        .unwrap_or_default()
}
