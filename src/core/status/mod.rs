mod reset;
mod timestamp;

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::Date;
use tracing::{debug, info, warn};

use crate::{core::store::KeyValueStore, error::RouteError};

pub use reset::{duration_until_next_midnight, run_daily_reset};
pub use timestamp::{elapsed_millis, format_date, format_duration, format_timestamp, now_local};

const DELIVERED_KEY: &str = "deliveredAddresses";
const CIRCUIT_STATUS_KEY: &str = "circuitStatus";
const LAST_RESET_KEY: &str = "lastResetDate";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteStatus::NotStarted => "not-started",
            RouteStatus::InProgress => "in-progress",
            RouteStatus::Completed => "completed",
        })
    }
}

/// Route progress of one circuit for the current day.
///
/// `start_time` is only set once the route is in progress and `end_time`
/// only once it is completed. Values come from [`StatusStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitStatus {
    pub status: RouteStatus,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(skip)]
    pub(crate) _guard: (),
}

impl CircuitStatus {
    /// Elapsed route time, e.g. "2h 30min". `None` until the route is completed.
    pub fn duration(&self) -> Option<String> {
        let start = self.start_time.as_deref()?;
        let end = self.end_time.as_deref()?;
        elapsed_millis(start, end).map(format_duration)
    }
}

fn delivery_key(circuit: &str, index: usize) -> String {
    format!("{circuit}-{index}")
}

type DeliveredMap = BTreeMap<String, bool>;
type StatusMap = BTreeMap<String, CircuitStatus>;

/// Delivered flags and route lifecycle, persisted through a [`KeyValueStore`].
#[derive(Debug)]
pub struct StatusStore<S> {
    kv: S,
}

impl<S: KeyValueStore> StatusStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    pub fn into_backend(self) -> S {
        self.kv
    }

    /// Read a JSON document; absent or unparseable values read as empty.
    async fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> anyhow::Result<T> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Ignoring corrupt stored value for {}: {}", key, e);
                Ok(T::default())
            }
        }
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        self.kv.set(key, serde_json::to_string(value)?).await
    }

    pub async fn get_delivery_state(&self, circuit: &str, index: usize) -> anyhow::Result<bool> {
        let delivered: DeliveredMap = self.read_json(DELIVERED_KEY).await?;
        Ok(delivered
            .get(&delivery_key(circuit, index))
            .copied()
            .unwrap_or(false))
    }

    pub async fn set_delivery_state(
        &self,
        circuit: &str,
        index: usize,
        delivered: bool,
    ) -> anyhow::Result<()> {
        let mut map: DeliveredMap = self.read_json(DELIVERED_KEY).await?;
        map.insert(delivery_key(circuit, index), delivered);
        self.write_json(DELIVERED_KEY, &map).await
    }

    /// Number of delivered stops among the first `len` indices of a circuit.
    pub async fn delivered_count(&self, circuit: &str, len: usize) -> anyhow::Result<usize> {
        let map: DeliveredMap = self.read_json(DELIVERED_KEY).await?;
        Ok((0..len)
            .filter(|index| map.get(&delivery_key(circuit, *index)) == Some(&true))
            .count())
    }

    pub async fn get_circuit_status(&self, code: &str) -> anyhow::Result<CircuitStatus> {
        let map: StatusMap = self.read_json(CIRCUIT_STATUS_KEY).await?;
        Ok(map.get(code).cloned().unwrap_or_default())
    }

    /// Move a not-started route to in-progress.
    pub async fn start_route(&self, code: &str, timestamp: &str) -> anyhow::Result<CircuitStatus> {
        let mut map: StatusMap = self.read_json(CIRCUIT_STATUS_KEY).await?;
        let current = map.get(code).map(|s| s.status).unwrap_or_default();
        if current != RouteStatus::NotStarted {
            return Err(RouteError::CannotStart {
                code: code.to_string(),
                status: current,
            }
            .into());
        }

        let status = CircuitStatus {
            status: RouteStatus::InProgress,
            start_time: Some(timestamp.to_string()),
            end_time: None,
            _guard: (),
        };
        map.insert(code.to_string(), status.clone());
        self.write_json(CIRCUIT_STATUS_KEY, &map).await?;
        info!("Route {} started at {}", code, timestamp);
        Ok(status)
    }

    /// Move an in-progress route to completed, keeping its start time.
    ///
    /// Ending a route that was never started is rejected.
    pub async fn end_route(&self, code: &str, timestamp: &str) -> anyhow::Result<CircuitStatus> {
        let mut map: StatusMap = self.read_json(CIRCUIT_STATUS_KEY).await?;
        let current = map.get(code).cloned().unwrap_or_default();
        if current.status != RouteStatus::InProgress {
            return Err(RouteError::CannotEnd {
                code: code.to_string(),
                status: current.status,
            }
            .into());
        }

        let status = CircuitStatus {
            status: RouteStatus::Completed,
            start_time: current.start_time,
            end_time: Some(timestamp.to_string()),
            _guard: (),
        };
        map.insert(code.to_string(), status.clone());
        self.write_json(CIRCUIT_STATUS_KEY, &map).await?;
        info!(
            "Route {} completed at {} ({})",
            code,
            timestamp,
            status.duration().as_deref().unwrap_or("unknown duration")
        );
        Ok(status)
    }

    /// Put one circuit back to not-started and clear its delivered flags.
    pub async fn reset_route(&self, code: &str) -> anyhow::Result<()> {
        let mut statuses: StatusMap = self.read_json(CIRCUIT_STATUS_KEY).await?;
        let mut delivered: DeliveredMap = self.read_json(DELIVERED_KEY).await?;
        statuses.remove(code);
        let prefix = format!("{code}-");
        delivered.retain(|key, _| !key.starts_with(&prefix));

        self.kv
            .write_batch(vec![
                (CIRCUIT_STATUS_KEY, Some(serde_json::to_string(&statuses)?)),
                (DELIVERED_KEY, Some(serde_json::to_string(&delivered)?)),
            ])
            .await?;
        info!("Route {} reset", code);
        Ok(())
    }

    pub async fn last_reset_date(&self) -> anyhow::Result<Option<String>> {
        self.kv.get(LAST_RESET_KEY).await
    }

    /// Clear all delivery and route state when the stored reset date is not
    /// `today`. Returns whether a reset happened.
    pub async fn check_and_apply_daily_reset(&self, today: Date) -> anyhow::Result<bool> {
        let today = format_date(today)?;
        let last = self.kv.get(LAST_RESET_KEY).await?;
        if last.as_deref() == Some(today.as_str()) {
            debug!("Daily reset already applied for {}", today);
            return Ok(false);
        }

        self.kv
            .write_batch(vec![
                (DELIVERED_KEY, None),
                (CIRCUIT_STATUS_KEY, None),
                (LAST_RESET_KEY, Some(today.clone())),
            ])
            .await?;
        info!(
            "Daily reset applied for {} (previous: {})",
            today,
            last.as_deref().unwrap_or("never")
        );
        Ok(true)
    }
}
