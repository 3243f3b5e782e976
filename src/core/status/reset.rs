use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, error};

use crate::core::{status::StatusStore, store::KeyValueStore};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Time left until the next midnight in `now`'s offset.
pub fn duration_until_next_midnight(now: OffsetDateTime) -> Duration {
    let next_midnight = now
        .date()
        .next_day()
        .map(|date| date.midnight().assume_offset(now.offset()));
    match next_midnight {
        Some(midnight) => {
            let left = midnight - now;
            Duration::try_from(left).unwrap_or(Duration::ZERO)
        }
        None => DAY,
    }
}

/// Apply the daily reset at the next midnight and every 24 hours after.
///
/// Runs until the surrounding task is dropped. Storage failures are logged
/// and retried on the next tick.
pub async fn run_daily_reset<S, C>(store: &StatusStore<S>, clock: C)
where
    S: KeyValueStore,
    C: Fn() -> OffsetDateTime,
{
    let first = duration_until_next_midnight(clock());
    debug!("Next daily reset check in {:?}", first);
    tokio::time::sleep(first).await;

    loop {
        let today = clock().date();
        if let Err(e) = store.check_and_apply_daily_reset(today).await {
            error!("Daily reset failed: {:#}", e);
        }
        tokio::time::sleep(DAY).await;
    }
}
