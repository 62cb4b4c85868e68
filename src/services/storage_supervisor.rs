use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{result_store::ResultStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Exponential backoff between `INITIAL_DELAY` and `MAX_DELAY`.
struct Backoff {
    next: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            next: INITIAL_DELAY,
        }
    }

    fn reset(&mut self) {
        self.next = INITIAL_DELAY;
    }

    async fn wait(&mut self) {
        sleep(self.next).await;
        self.next = (self.next * 2).min(MAX_DELAY);
    }
}

/// Connect to the result store, poll its health and fall back to degraded mode
/// while it is unreachable. Never returns.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn ResultStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new();

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "result store connection attempt failed");
                backoff.wait().await;
                continue;
            }
        };

        state.set_result_store(store.clone()).await;
        info!("result store connected; leaving degraded mode");
        backoff.reset();

        watch_health(&state, store.as_ref()).await;

        warn!("exhausted result store reconnect attempts; reconnecting from scratch");
        state.clear_result_store().await;
        backoff.wait().await;
    }
}

/// Poll `store` until it stays unreachable through every reconnect attempt.
async fn watch_health(state: &SharedState, store: &dyn ResultStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("result store healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "result store health check failed; entering degraded mode");
                state.update_degraded(true).await;
                if !reconnect(store).await {
                    return;
                }
                state.update_degraded(false).await;
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(store: &dyn ResultStore) -> bool {
    let mut backoff = Backoff::new();
    for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "result store reconnected");
                return true;
            }
            Err(err) => {
                warn!(attempt, error = %err, "result store reconnect attempt failed");
                backoff.wait().await;
            }
        }
    }
    false
}
