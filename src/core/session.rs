use tracing::debug;

use crate::{
    core::{
        circuit::{Circuit, Subscriber},
        product::{product_counts, visible_subscribers},
        status::{CircuitStatus, StatusStore},
        store::KeyValueStore,
    },
    error::RouteError,
};

/// Everything a front end works with: the loaded circuits, the circuit the
/// carrier picked, the STF filter preference and the status store.
#[derive(Debug)]
pub struct RouteSession<S> {
    /// Loaded circuits in catalog order.
    circuits: Vec<Circuit>,
    selected: Option<String>,
    pub hide_stf: bool,
    store: StatusStore<S>,
}

impl<S: KeyValueStore> RouteSession<S> {
    pub fn new(circuits: Vec<Circuit>, store: StatusStore<S>) -> Self {
        Self {
            circuits,
            selected: None,
            hide_stf: false,
            store,
        }
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn circuit(&self, code: &str) -> Option<&Circuit> {
        self.circuits.iter().find(|circuit| circuit.code == code)
    }

    pub fn store(&self) -> &StatusStore<S> {
        &self.store
    }

    pub fn into_store(self) -> StatusStore<S> {
        self.store
    }

    pub fn select(&mut self, code: &str) -> Result<&Circuit, RouteError> {
        let position = self
            .circuits
            .iter()
            .position(|circuit| circuit.code == code)
            .ok_or_else(|| RouteError::UnknownCircuit(code.to_string()))?;
        self.selected = Some(code.to_string());
        Ok(&self.circuits[position])
    }

    pub fn selected(&self) -> Option<&Circuit> {
        self.selected
            .as_deref()
            .and_then(|code| self.circuit(code))
    }

    /// Product counts of the selected circuit, sorted by tag.
    pub fn cover_sheet(&self) -> Option<Vec<(String, usize)>> {
        self.selected()
            .map(|circuit| product_counts(&circuit.subscribers))
    }

    /// Stops of the selected circuit that pass the STF filter.
    pub fn visible_stops(&self) -> Vec<(usize, &Subscriber)> {
        self.selected()
            .map(|circuit| visible_subscribers(&circuit.subscribers, self.hide_stf))
            .unwrap_or_default()
    }

    fn checked_stop(&self, index: usize) -> Result<Option<&Circuit>, RouteError> {
        let Some(circuit) = self.selected() else {
            return Ok(None);
        };
        if index >= circuit.len() {
            return Err(RouteError::StopOutOfRange {
                code: circuit.code.clone(),
                index,
                len: circuit.len(),
            });
        }
        Ok(Some(circuit))
    }

    /// Mark a stop of the selected circuit delivered or not.
    ///
    /// Returns `false` without writing when no circuit is selected.
    pub async fn set_delivered(&self, index: usize, delivered: bool) -> anyhow::Result<bool> {
        let Some(circuit) = self.checked_stop(index)? else {
            debug!("No circuit selected, ignoring delivery update");
            return Ok(false);
        };
        self.store
            .set_delivery_state(&circuit.code, index, delivered)
            .await?;
        Ok(true)
    }

    /// Flip the delivered flag of a stop in the selected circuit.
    ///
    /// Returns the new flag, or `None` when no circuit is selected.
    pub async fn toggle_delivered(&self, index: usize) -> anyhow::Result<Option<bool>> {
        let Some(circuit) = self.checked_stop(index)? else {
            debug!("No circuit selected, ignoring delivery toggle");
            return Ok(None);
        };
        let delivered = !self.store.get_delivery_state(&circuit.code, index).await?;
        self.store
            .set_delivery_state(&circuit.code, index, delivered)
            .await?;
        Ok(Some(delivered))
    }

    /// Start the selected route. A no-op when nothing is selected.
    pub async fn start_route(&self, timestamp: &str) -> anyhow::Result<Option<CircuitStatus>> {
        let Some(code) = self.selected.as_deref() else {
            debug!("No circuit selected, ignoring route start");
            return Ok(None);
        };
        self.store.start_route(code, timestamp).await.map(Some)
    }

    /// End the selected route. A no-op when nothing is selected.
    pub async fn end_route(&self, timestamp: &str) -> anyhow::Result<Option<CircuitStatus>> {
        let Some(code) = self.selected.as_deref() else {
            debug!("No circuit selected, ignoring route end");
            return Ok(None);
        };
        self.store.end_route(code, timestamp).await.map(Some)
    }

    pub async fn selected_status(&self) -> anyhow::Result<Option<CircuitStatus>> {
        match self.selected.as_deref() {
            Some(code) => self.store.get_circuit_status(code).await.map(Some),
            None => Ok(None),
        }
    }
}
