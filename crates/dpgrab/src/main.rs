use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use dpgrab_core::{config::Config, ports::ProfilePhotoSource, status::ConnectionStatus, Error};
use dpgrab_mtproto::MtprotoPhotoSource;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    dpgrab_core::logging::init("dpgrab")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(e);
        }
    };

    let status = ConnectionStatus::default();
    let source: Arc<dyn ProfilePhotoSource> =
        match MtprotoPhotoSource::connect(&cfg, status.clone()).await {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::error!(error = %e, "mtproto session unavailable");
                return Err(e);
            }
        };
    let shutdown = CancellationToken::new();

    let http = dpgrab_http::serve(cfg.port, status.clone(), shutdown.clone().cancelled_owned());
    let bot = dpgrab_telegram::router::run_polling(cfg.clone(), status, source, shutdown.clone());

    let signals = {
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        }
    };

    // Either half stopping on its own takes the other one down with it.
    let http = async {
        let res = http.await;
        shutdown.cancel();
        res
    };
    let bot = async {
        let res = bot.await;
        shutdown.cancel();
        res
    };

    let (http_res, bot_res, ()) = tokio::join!(http, bot, async {
        tokio::select! {
            _ = signals => {}
            _ = shutdown.cancelled() => {}
        }
    });

    http_res.map_err(|e| Error::unexpected("http", e))?;
    bot_res.map_err(|e| Error::unexpected("telegram", e))?;

    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
