use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{services::booking_service, state::AppState};

/// Spawns the periodic expiry of abandoned checkouts. Returns `None` when the
/// pending TTL is disabled.
pub fn spawn(state: AppState) -> Option<JoinHandle<()>> {
    let ttl = state.config.booking.pending_ttl?;
    let period = state.config.booking.sweep_interval;

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(every_secs = period.as_secs(), ttl_minutes = ttl.num_minutes(), "booking sweep started");

        loop {
            ticker.tick().await;
            if let Err(err) = booking_service::expire_stale_bookings(&state, ttl).await {
                tracing::warn!(error = %err, "booking sweep failed");
            }
        }
    }))
}
