//! Heartbeat task
//!
//! Runs alongside the read loop once the connection is ready. The first
//! heartbeat goes out immediately, then one per interval. The task ends
//! quietly when the outbound queue is gone.

use crate::protocol::GatewayFrame;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Spawn the heartbeat loop feeding the writer queue
pub(crate) fn spawn_heartbeat(period: Duration, outbound: mpsc::Sender<GatewayFrame>) -> JoinHandle<()> {
    tokio::spawn(run_heartbeat(period, outbound))
}

/// Send a HEARTBEAT frame every `period` until the queue closes
pub(crate) async fn run_heartbeat(period: Duration, outbound: mpsc::Sender<GatewayFrame>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(interval_ms = period.as_millis() as u64, "Heartbeat task started");

    loop {
        ticker.tick().await;
        if outbound.send(GatewayFrame::heartbeat()).await.is_err() {
            debug!("Heartbeat task stopped");
            return;
        }
        trace!("Heartbeat sent");
    }
}
