//! MTProto photo source (grammers).
//!
//! The Bot API cannot resolve arbitrary user handles, so lookups, profile
//! photo listing and downloads go through an MTProto session authorized with
//! the bot token. Sending replies stays on the Bot API adapter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use grammers_client::client::chats::ProfilePhotoIter;
use grammers_client::{
    types::{Chat, Downloadable, Media, Photo},
    Client, InitParams, InvocationError,
};
use grammers_session::{PackedChat, Session};
use tracing::{debug, info};

use dpgrab_core::{
    config::{Config, MAX_PHOTOS_LIMIT},
    domain::{Opaque, PhotoRef, ResolvedUser, UserId},
    errors::Error,
    ports::ProfilePhotoSource,
    status::ConnectionStatus,
    Result,
};

mod failure;
mod writer;

pub use failure::{Failure, Stage};
pub use writer::ChunkWriter;

#[derive(Clone)]
pub struct MtprotoPhotoSource {
    client: Client,
    status: ConnectionStatus,
}

impl MtprotoPhotoSource {
    /// Connect and make sure the session is signed in as the bot.
    ///
    /// The session file is created on first run and reused afterwards.
    pub async fn connect(cfg: &Config, status: ConnectionStatus) -> Result<Self> {
        let session = Session::load_file_or_create(&cfg.session_file)?;

        let client = Client::connect(grammers_client::Config {
            session,
            api_id: cfg.api_id,
            api_hash: cfg.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| {
            status.set_connected(false);
            Error::Network(format!("mtproto connect failed: {e}"))
        })?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| failure::observe(&status, Failure::from(&e), Stage::Connect))?;

        if !authorized {
            client
                .bot_sign_in(&cfg.bot_token)
                .await
                .map_err(|e| Error::Config(format!("bot sign-in rejected: {e}")))?;
            client.session().save_to_file(&cfg.session_file)?;
            info!(session = %cfg.session_file.display(), "mtproto bot session created");
        }

        status.set_connected(true);
        Ok(Self { client, status })
    }

    fn fail(&self, e: &InvocationError, stage: Stage<'_>) -> Error {
        failure::observe(&self.status, Failure::from(e), stage)
    }
}

/// Number of photos to request for a caller-supplied cap.
pub fn page_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_PHOTOS_LIMIT)
}

/// A finished download only counts when it produced bytes.
pub fn confirmed_download(written: u64, dest: &Path) -> Option<PathBuf> {
    (written > 0).then(|| dest.to_path_buf())
}

fn remote_chat(user: &ResolvedUser) -> Result<PackedChat> {
    user.remote
        .downcast_ref::<PackedChat>()
        .copied()
        .ok_or_else(|| Error::unexpected("mtproto", format!("@{} has no mtproto peer", user.handle)))
}

fn remote_photo(photo: &PhotoRef) -> Result<Photo> {
    photo
        .remote
        .downcast_ref::<Photo>()
        .cloned()
        .ok_or_else(|| {
            Error::unexpected("mtproto", format!("photo {} has no mtproto media", photo.file_id))
        })
}

fn photo_ref(photo: Photo) -> PhotoRef {
    PhotoRef::new(photo.id().to_string(), Opaque::new(photo))
}

#[async_trait]
impl ProfilePhotoSource for MtprotoPhotoSource {
    async fn resolve_user(&self, handle: &str) -> Result<ResolvedUser> {
        let chat = self
            .client
            .resolve_username(handle)
            .await
            .map_err(|e| self.fail(&e, Stage::Resolve(handle)))?;
        self.status.set_connected(true);

        match chat {
            Some(chat @ Chat::User(_)) => {
                let packed = chat.pack();
                debug!(handle, id = packed.id, "resolved user");
                Ok(ResolvedUser {
                    id: UserId(packed.id),
                    handle: handle.to_string(),
                    remote: Opaque::new(packed),
                })
            }
            Some(_) => Err(Error::Resolution {
                handle: handle.to_string(),
                reason: "not a user account".to_string(),
            }),
            None => Err(Error::Resolution {
                handle: handle.to_string(),
                reason: "username not occupied".to_string(),
            }),
        }
    }

    async fn list_profile_photos(
        &self,
        user: &ResolvedUser,
        limit: usize,
    ) -> Result<Vec<PhotoRef>> {
        let limit = page_limit(limit);
        let chat = remote_chat(user)?;

        let mut photos = match self.client.iter_profile_photos(chat) {
            ProfilePhotoIter::User(iter) => ProfilePhotoIter::User(iter.limit(limit)),
            ProfilePhotoIter::Chat(iter) => ProfilePhotoIter::Chat(iter.limit(limit)),
        };
        let mut refs = Vec::with_capacity(limit);
        while refs.len() < limit {
            match photos.next().await {
                Ok(Some(photo)) => refs.push(photo_ref(photo)),
                Ok(None) => break,
                Err(e) => return Err(self.fail(&e, Stage::List)),
            }
        }
        self.status.set_connected(true);

        debug!(handle = %user.handle, count = refs.len(), "listed profile photos");
        Ok(refs)
    }

    async fn download_photo(&self, photo: &PhotoRef, dest: &Path) -> Result<Option<PathBuf>> {
        let media = Downloadable::Media(Media::Photo(remote_photo(photo)?));

        let mut chunks = self.client.iter_download(&media);
        let mut out = ChunkWriter::create(dest).await?;
        loop {
            match chunks.next().await {
                Ok(Some(chunk)) => out.write_chunk(&chunk).await?,
                Ok(None) => break,
                Err(e) => return Err(self.fail(&e, Stage::Download)),
            }
        }
        let written = out.finish().await?;
        self.status.set_connected(true);

        debug!(file_id = %photo.file_id, bytes = written, "photo downloaded");
        Ok(confirmed_download(written, dest))
    }
}
