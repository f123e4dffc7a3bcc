//! Heartbeat driver: runs [`HeartbeatUseCase::sweep`] on a fixed period.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::usecase::HeartbeatUseCase;

/// Spawn the periodic sweep. The first sweep happens one full period after
/// start. Abort the returned handle to stop it.
pub fn spawn_heartbeat(usecase: Arc<HeartbeatUseCase>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            usecase.sweep().await;
        }
    })
}
