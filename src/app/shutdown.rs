//! Ctrl-C handling.

use log::{info, warn};
use tokio_util::sync::CancellationToken;

/// Returns a token that is cancelled on the first Ctrl-C.
///
/// The listener task lives until the signal arrives or the runtime shuts down.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    info!("Interrupted, stopping probes");
                    token.cancel();
                }
                Err(e) => warn!("Cannot listen for Ctrl-C: {e}"),
            },
        }
    });
    cancel
}
