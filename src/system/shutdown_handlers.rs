use tracing::info;
#[cfg(unix)]
use tracing::warn;

use crate::shutdown::ShutdownSender;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Forward Ctrl-C (and SIGTERM on unix) to the shutdown channel. The task
/// exits on its own once anything else signals shutdown.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping virtual users");
                    drop(shutdown_tx.send(()));
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("Terminated, stopping virtual users");
                    drop(shutdown_tx.send(()));
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping virtual users");
                    drop(shutdown_tx.send(()));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::shutdown::shutdown_channel;

    const SHUTDOWN_HANDLER_TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn signal_handler_exits_on_shutdown() -> AppResult<()> {
        let (shutdown_tx, _) = shutdown_channel();
        let handle = setup_signal_shutdown_handler(&shutdown_tx);

        if shutdown_tx.send(()).is_err() {
            return Err(AppError::validation("Failed to send shutdown"));
        }

        tokio::time::timeout(SHUTDOWN_HANDLER_TIMEOUT, handle)
            .await
            .map_err(|err| {
                AppError::validation(format!("Timed out waiting for shutdown handler: {}", err))
            })?
            .map_err(|err| AppError::validation(format!("Shutdown task join error: {}", err)))?;
        Ok(())
    }
}
