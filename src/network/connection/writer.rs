//! Outbound half of a connection.

use futures_util::SinkExt;
use relay_proto::LineWriter;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Upper bound on flushing leftovers once the connection is closed.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Drain a connection's queue into its socket until the connection closes.
///
/// Lines queued before the close signal are still written, so a
/// disconnect notice reaches the peer before the socket shuts down. A peer
/// that stops reading cannot hold the task past the close signal plus
/// [`CLOSE_FLUSH_TIMEOUT`].
pub(super) async fn drain(
    closed: CancellationToken,
    mut rx: mpsc::Receiver<String>,
    mut writer: LineWriter,
) {
    loop {
        tokio::select! {
            biased;
            line = rx.recv() => match line {
                Some(line) => {
                    let sent = tokio::select! {
                        res = writer.send(line) => res,
                        _ = closed.cancelled() => break,
                    };
                    if let Err(e) = sent {
                        debug!(error = %e, "Write failed");
                        closed.cancel();
                        return;
                    }
                }
                None => break,
            },
            _ = closed.cancelled() => break,
        }
    }

    let flush = async {
        while let Ok(line) = rx.try_recv() {
            writer.feed(line).await?;
        }
        // Flushes pending lines and shuts the write half down.
        writer.close().await
    };
    match tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, flush).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "Final flush failed"),
        Err(_) => debug!("Final flush timed out"),
    }
}
