use std::{
    borrow::Cow,
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tokio::fs as async_fs;
use tracing::{debug, warn};

use crate::core::circuit::{Circuit, parse_circuit_data};

const DATA_FILE_EXTENSION: &str = "txt";

/// The set of circuits available in a data directory.
#[derive(Debug, Clone)]
pub struct CircuitCatalog {
    data_dir: PathBuf,
    codes: Vec<String>,
    /// Files found by [`CircuitCatalog::discover`], keyed by code.
    files: HashMap<String, PathBuf>,
    display_names: HashMap<String, String>,
}

impl CircuitCatalog {
    pub fn new<P: AsRef<Path>>(data_dir: P, codes: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            codes,
            files: HashMap::new(),
            display_names: HashMap::new(),
        }
    }

    /// Derive circuit codes from the `*.txt` files in `data_dir`.
    ///
    /// File stems are uppercased, de-duplicated and sorted. When two files
    /// differ only in case, the first one listed wins.
    pub async fn discover<P: AsRef<Path>>(data_dir: P) -> anyhow::Result<Self> {
        let data_dir = data_dir.as_ref();
        let mut entries = async_fs::read_dir(data_dir)
            .await
            .with_context(|| format!("Failed to read data directory {:?}", data_dir))?;

        let mut files = HashMap::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_data_file = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION));
            if !is_data_file {
                continue;
            }
            let Some(code) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_uppercase)
            else {
                continue;
            };
            files.entry(code).or_insert(path);
        }
        let mut codes: Vec<String> = files.keys().cloned().collect();
        codes.sort();
        debug!("Discovered {} circuits in {:?}", codes.len(), data_dir);

        let mut catalog = Self::new(data_dir, codes);
        catalog.files = files;
        Ok(catalog)
    }

    pub fn with_display_names(mut self, names: HashMap<String, String>) -> Self {
        self.display_names = names
            .into_iter()
            .map(|(code, name)| (code.to_uppercase(), name))
            .collect();
        self
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.display_names.get(&code.to_uppercase()).map(String::as_str)
    }

    /// The discovered file of a circuit, or the conventional
    /// `<data_dir>/<lowercased code>.txt`.
    pub fn file_path(&self, code: &str) -> PathBuf {
        if let Some(path) = self.files.get(&code.to_uppercase()) {
            return path.clone();
        }
        self.data_dir
            .join(format!("{}.{}", code.to_lowercase(), DATA_FILE_EXTENSION))
    }
}

/// Read and parse a single circuit file.
pub async fn load_circuit(catalog: &CircuitCatalog, code: &str) -> anyhow::Result<Circuit> {
    let path = catalog.file_path(code);
    let bytes = async_fs::read(&path)
        .await
        .with_context(|| format!("Failed to read circuit file {:?}", path))?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!("Circuit file {:?} is not valid UTF-8, invalid bytes replaced", path);
    }
    Ok(Circuit {
        code: code.to_string(),
        display_name: catalog.display_name(code).map(str::to_string),
        subscribers: parse_circuit_data(&text),
    })
}

/// Load every circuit in the catalog, one file after another.
///
/// Circuits come back in catalog order. A circuit whose file cannot be read
/// is logged and left out; the remaining circuits still load.
pub async fn load_circuits(catalog: &CircuitCatalog) -> Vec<Circuit> {
    let mut circuits = Vec::with_capacity(catalog.codes().len());
    for code in catalog.codes() {
        match load_circuit(catalog, code).await {
            Ok(circuit) => {
                debug!("Loaded circuit {} with {} stops", code, circuit.len());
                circuits.push(circuit);
            }
            Err(e) => warn!("Skipping circuit {}: {:#}", code, e),
        }
    }
    circuits
}
