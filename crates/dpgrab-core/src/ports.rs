use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    domain::{PhotoRef, ResolvedUser},
    Result,
};

/// Remote lookup side of the chat platform: handle resolution, photo listing
/// and media download.
#[async_trait]
pub trait ProfilePhotoSource: Send + Sync {
    /// Resolve a bare handle (no leading `@`) to a user identity.
    async fn resolve_user(&self, handle: &str) -> Result<ResolvedUser>;

    /// List at most `limit` public profile photos, in platform order.
    async fn list_profile_photos(
        &self,
        user: &ResolvedUser,
        limit: usize,
    ) -> Result<Vec<PhotoRef>>;

    /// Download a photo into `dest`.
    ///
    /// Returns the path actually written, or `None` when the platform did not
    /// confirm a download.
    async fn download_photo(&self, photo: &PhotoRef, dest: &Path) -> Result<Option<PathBuf>>;
}
