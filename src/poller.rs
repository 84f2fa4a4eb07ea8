//! Transaction status polling
//!
//! One task per open button. The first request goes out immediately, then one per
//! interval. Each request is awaited before the next tick, so a button never has
//! more than one request in flight; a slow response delays the following tick
//! instead of stacking requests.

use crate::button::ButtonInner;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What the poll loop does after a snapshot was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    /// Keep polling
    Continue,
    /// Stop polling (payment accepted or overlay closed)
    Stop,
}

/// Spawn the poll loop of a button on the given runtime
pub(crate) fn spawn(runtime: &Handle, button: Arc<ButtonInner>) -> JoinHandle<()> {
    runtime.spawn(run(button))
}

async fn run(button: Arc<ButtonInner>) {
    let reference = button.config.reference().to_string();
    let mut ticker = time::interval(button.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(reference = %reference, "Status polling started");

    loop {
        ticker.tick().await;

        if !button.host.is_attached() {
            info!(reference = %reference, "Container left the page, stopping status polling");
            break;
        }

        match button
            .source
            .fetch_status(&reference, button.config.embed_token())
            .await
        {
            Ok(status) => {
                if button.apply_status(status) == PollOutcome::Stop {
                    break;
                }
            }
            Err(e) => {
                warn!(reference = %reference, "Failed to fetch transaction status: {}", e);
            }
        }
    }

    debug!(reference = %reference, "Status polling stopped");
}
