use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

use dpgrab_core::{
    config::Config,
    dispatcher::{CommandDispatcher, InputMode},
    fetcher::PhotoFetcher,
    messaging::port::MessagingPort,
    ports::ProfilePhotoSource,
    status::ConnectionStatus,
    transfer::MediaTransfer,
};

use crate::handlers;
use crate::TelegramClient;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CommandDispatcher>,
    /// Our own user id, used to drop self-authored messages.
    pub bot_user_id: Option<u64>,
}

/// Wire the core services: replies go out through `client`, lookups and
/// downloads through `source`.
pub fn build_dispatcher(
    cfg: &Config,
    client: TelegramClient,
    source: Arc<dyn ProfilePhotoSource>,
) -> CommandDispatcher {
    let messenger: Arc<dyn MessagingPort> = Arc::new(client);

    let transfer = MediaTransfer::new(source.clone(), messenger.clone(), cfg.temp_dir.clone());
    let fetcher = Arc::new(PhotoFetcher::new(
        source,
        messenger.clone(),
        transfer,
        cfg.max_photos,
    ));

    let mode = if cfg.require_start {
        InputMode::AfterStart
    } else {
        InputMode::Unconditional
    };

    CommandDispatcher::new(messenger, fetcher, mode)
}

/// Long-poll Telegram until `shutdown` is cancelled.
pub async fn run_polling(
    cfg: Arc<Config>,
    status: ConnectionStatus,
    source: Arc<dyn ProfilePhotoSource>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    let bot_user_id = match bot.get_me().await {
        Ok(me) => {
            status.set_connected(true);
            tracing::info!(username = %me.username(), "bot started");
            Some(me.user.id.0)
        }
        Err(e) => {
            status.set_connected(false);
            tracing::warn!(error = %e, "get_me failed; continuing without self id");
            None
        }
    };
    tracing::info!(
        max_photos = cfg.max_photos,
        require_start = cfg.require_start,
        temp_dir = %cfg.temp_dir.display(),
        "dispatcher configured"
    );

    let client = TelegramClient::new(bot.clone(), status);
    let state = Arc::new(AppState {
        dispatcher: Arc::new(build_dispatcher(&cfg, client, source)),
        bot_user_id,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => tracing::debug!(error = %e, "dispatcher was idle at shutdown"),
        }
    });

    dispatcher.dispatch().await;
    tracing::info!("dispatcher stopped");

    Ok(())
}
