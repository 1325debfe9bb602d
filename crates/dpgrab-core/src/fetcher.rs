//! Username -> profile photos orchestration.
//!
//! One call handles one request end to end: normalize the handle, resolve it,
//! list at most `max_photos` photos, relay each through [`MediaTransfer`] and
//! report back. Nothing is cached between calls.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    domain::ChatId,
    errors::{Error, ErrorKind},
    messaging::port::MessagingPort,
    ports::ProfilePhotoSource,
    transfer::MediaTransfer,
    utils::normalize_handle,
};

/// What happened to a single username request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    InvalidHandle,
    NotFound { handle: String },
    NetworkError { handle: String },
    Failed { handle: String, category: String },
    NoPhotos { handle: String },
    Sent { handle: String, sent: usize, total: usize },
}

impl FetchOutcome {
    /// The reply sent back to the requester.
    pub fn reply_text(&self) -> String {
        match self {
            FetchOutcome::InvalidHandle => "Please provide a valid username.".to_string(),
            FetchOutcome::NotFound { handle } => format!(
                "Couldn't find a Telegram user named @{handle}. Check the username and try again."
            ),
            FetchOutcome::NetworkError { .. } => {
                "Network error while contacting Telegram. Please try again in a moment."
                    .to_string()
            }
            FetchOutcome::Failed { category, .. } => {
                format!("Sorry, couldn't fetch photos. Error: {category}")
            }
            FetchOutcome::NoPhotos { handle } => {
                format!("No public profile photos found for @{handle}.")
            }
            FetchOutcome::Sent { handle, sent, .. } if *sent > 0 => {
                format!("Sent {sent} profile photo(s) of @{handle}.")
            }
            FetchOutcome::Sent { handle, total, .. } => {
                format!("Couldn't send any of the {total} profile photo(s) of @{handle}.")
            }
        }
    }
}

pub struct PhotoFetcher {
    source: Arc<dyn ProfilePhotoSource>,
    messenger: Arc<dyn MessagingPort>,
    transfer: MediaTransfer,
    max_photos: usize,
}

impl PhotoFetcher {
    pub fn new(
        source: Arc<dyn ProfilePhotoSource>,
        messenger: Arc<dyn MessagingPort>,
        transfer: MediaTransfer,
        max_photos: usize,
    ) -> Self {
        Self {
            source,
            messenger,
            transfer,
            max_photos,
        }
    }

    /// Handle one username request and reply to `chat_id`.
    ///
    /// Never fails: every error becomes a reply. A failed reply is only logged.
    pub async fn fetch_and_relay(&self, chat_id: ChatId, raw: &str) -> FetchOutcome {
        let outcome = self.run(chat_id, raw).await;
        if let Err(e) = self
            .messenger
            .send_text(chat_id, &outcome.reply_text())
            .await
        {
            warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
        outcome
    }

    async fn run(&self, chat_id: ChatId, raw: &str) -> FetchOutcome {
        let Some(handle) = normalize_handle(raw) else {
            return FetchOutcome::InvalidHandle;
        };

        let photos = match self.lookup(&handle).await {
            Ok(photos) => photos,
            Err(e) => return classify(handle, chat_id, e),
        };

        if photos.is_empty() {
            return FetchOutcome::NoPhotos { handle };
        }

        let total = photos.len();
        info!(chat_id = chat_id.0, %handle, total, "relaying profile photos");

        let mut sent = 0usize;
        for (idx, photo) in photos.iter().enumerate() {
            let caption = format!("Photo {}/{} of @{}", idx + 1, total, handle);
            if self.transfer.transfer(photo, chat_id, Some(&caption)).await {
                sent += 1;
            }
        }

        info!(chat_id = chat_id.0, %handle, sent, total, "batch finished");
        FetchOutcome::Sent {
            handle,
            sent,
            total,
        }
    }

    async fn lookup(&self, handle: &str) -> crate::Result<Vec<crate::domain::PhotoRef>> {
        let user = self.source.resolve_user(handle).await?;
        self.source
            .list_profile_photos(&user, self.max_photos)
            .await
            .map(|mut photos| {
                photos.truncate(self.max_photos);
                photos
            })
    }
}

fn classify(handle: String, chat_id: ChatId, e: Error) -> FetchOutcome {
    match e.kind() {
        ErrorKind::Resolution => {
            info!(chat_id = chat_id.0, %handle, error = %e, "handle not resolved");
            FetchOutcome::NotFound { handle }
        }
        ErrorKind::Network => {
            warn!(chat_id = chat_id.0, %handle, error = %e, "network failure during lookup");
            FetchOutcome::NetworkError { handle }
        }
        _ => {
            error!(chat_id = chat_id.0, %handle, error = ?e, "unexpected lookup failure");
            FetchOutcome::Failed {
                handle,
                category: e.category().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{leftover_files, DownloadBehavior, FakeMessenger, FakeSource, ResolveBehavior};

    struct Harness {
        dir: tempfile::TempDir,
        source: Arc<FakeSource>,
        messenger: Arc<FakeMessenger>,
        fetcher: PhotoFetcher,
    }

    fn harness(photos: usize, max_photos: usize) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_photos(photos));
        let messenger = Arc::new(FakeMessenger::default());
        let transfer = MediaTransfer::new(
            source.clone(),
            messenger.clone(),
            dir.path().to_path_buf(),
        );
        let fetcher = PhotoFetcher::new(source.clone(), messenger.clone(), transfer, max_photos);
        Harness {
            dir,
            source,
            messenger,
            fetcher,
        }
    }

    #[tokio::test]
    async fn at_handle_with_three_photos_sends_all() {
        let h = harness(3, 10);

        let out = h.fetcher.fetch_and_relay(ChatId(1), "@alice").await;

        assert_eq!(
            out,
            FetchOutcome::Sent {
                handle: "alice".to_string(),
                sent: 3,
                total: 3
            }
        );
        assert_eq!(h.source.resolve_calls(), vec!["alice".to_string()]);
        assert_eq!(h.messenger.photos().len(), 3);
        assert_eq!(
            h.messenger.photos()[0].1.as_deref(),
            Some("Photo 1/3 of @alice")
        );
        assert_eq!(
            h.messenger.texts(),
            vec!["Sent 3 profile photo(s) of @alice.".to_string()]
        );
        assert!(leftover_files(h.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn empty_input_makes_no_remote_calls() {
        let h = harness(3, 10);

        for raw in ["", "   ", "@"] {
            let out = h.fetcher.fetch_and_relay(ChatId(1), raw).await;
            assert_eq!(out, FetchOutcome::InvalidHandle);
        }

        assert!(h.source.resolve_calls().is_empty());
        assert!(h.source.list_calls().is_empty());
        assert_eq!(h.messenger.texts().len(), 3);
        assert!(h.messenger.texts()[0].contains("valid username"));
    }

    #[tokio::test]
    async fn not_found_reply_names_handle_and_transfers_nothing() {
        let h = harness(3, 10);
        h.source.set_resolve(ResolveBehavior::NotFound);

        let out = h
            .fetcher
            .fetch_and_relay(ChatId(1), "nonexistent_handle_xyz")
            .await;

        assert!(matches!(out, FetchOutcome::NotFound { .. }));
        assert!(h.source.download_paths().is_empty());
        let texts = h.messenger.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("nonexistent_handle_xyz"));
        assert!(texts[0].contains("Couldn't find"));
    }

    #[tokio::test]
    async fn network_and_unexpected_errors_get_generic_replies() {
        let h = harness(3, 10);

        h.source.set_resolve(ResolveBehavior::Network);
        let out = h.fetcher.fetch_and_relay(ChatId(1), "bob").await;
        assert!(matches!(out, FetchOutcome::NetworkError { .. }));

        h.source.set_resolve(ResolveBehavior::Unexpected);
        let out = h.fetcher.fetch_and_relay(ChatId(1), "bob").await;
        assert_eq!(
            out,
            FetchOutcome::Failed {
                handle: "bob".to_string(),
                category: "api".to_string()
            }
        );

        let texts = h.messenger.texts();
        assert!(texts[0].contains("try again"));
        assert_eq!(texts[1], "Sorry, couldn't fetch photos. Error: api");
        assert!(!texts[1].contains("internal detail"));
    }

    #[tokio::test]
    async fn zero_photos_sends_one_reply_and_creates_no_files() {
        let h = harness(0, 10);

        let out = h.fetcher.fetch_and_relay(ChatId(1), "carol").await;

        assert_eq!(
            out,
            FetchOutcome::NoPhotos {
                handle: "carol".to_string()
            }
        );
        assert_eq!(
            h.messenger.texts(),
            vec!["No public profile photos found for @carol.".to_string()]
        );
        assert!(h.source.download_paths().is_empty());
        assert!(leftover_files(h.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn cap_bounds_transfer_attempts() {
        let h = harness(25, 10);

        let out = h.fetcher.fetch_and_relay(ChatId(1), "dave").await;

        assert_eq!(h.source.list_calls(), vec![10]);
        assert_eq!(h.source.download_paths().len(), 10);
        assert!(matches!(out, FetchOutcome::Sent { sent: 10, total: 10, .. }));
    }

    #[tokio::test]
    async fn failing_photo_is_skipped_and_later_photos_still_attempted() {
        let h = harness(3, 10);
        h.source.set_download("photo-1", DownloadBehavior::Fail);

        let out = h.fetcher.fetch_and_relay(ChatId(1), "erin").await;

        assert_eq!(
            out,
            FetchOutcome::Sent {
                handle: "erin".to_string(),
                sent: 2,
                total: 3
            }
        );
        let sent: Vec<String> = h.messenger.photos().into_iter().map(|(c, _)| c).collect();
        assert_eq!(sent, vec!["photo-0".to_string(), "photo-2".to_string()]);
        assert_eq!(h.source.download_paths().len(), 3);
        assert!(leftover_files(h.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn all_sends_failing_reports_none_sent() {
        let h = harness(2, 10);
        h.messenger.fail_photo_with_content("photo-0");
        h.messenger.fail_photo_with_content("photo-1");

        let out = h.fetcher.fetch_and_relay(ChatId(1), "frank").await;

        assert!(matches!(out, FetchOutcome::Sent { sent: 0, total: 2, .. }));
        assert_eq!(
            h.messenger.texts(),
            vec!["Couldn't send any of the 2 profile photo(s) of @frank.".to_string()]
        );
        assert!(leftover_files(h.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn repeated_requests_run_independent_batches() {
        let h = harness(2, 10);

        h.fetcher.fetch_and_relay(ChatId(1), "gina").await;
        h.fetcher.fetch_and_relay(ChatId(1), "@gina").await;

        assert_eq!(h.source.resolve_calls().len(), 2);
        assert_eq!(h.source.list_calls().len(), 2);
        assert_eq!(h.messenger.photos().len(), 4);

        let paths = h.source.download_paths();
        let unique: std::collections::HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), paths.len());
    }

    #[tokio::test]
    async fn reply_failure_does_not_panic() {
        let h = harness(1, 10);
        h.messenger.fail_all_texts();

        let out = h.fetcher.fetch_and_relay(ChatId(1), "hank").await;
        assert!(matches!(out, FetchOutcome::Sent { sent: 1, .. }));
    }
}
