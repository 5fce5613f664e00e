//! File inputs and outputs of the advisor.
//!
//! Everything the decision core consumes arrives as JSON files: an optional pricing
//! catalog and family table, a usage snapshot per location and the hardware facts of
//! the offered sizes.

use domain_provisioning::{FamilyTable, HardwareFacts, PricingCatalog, UsageRecord};
use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {} from {}", what, path.display()))?;
    serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Failed to parse {} in {}", what, path.display()))
}

/// Load a pricing catalog, or the built-in reference catalog when no path is configured
pub fn load_catalog(path: Option<&Path>) -> Result<PricingCatalog> {
    let Some(path) = path else {
        debug!("Using built-in reference pricing catalog");
        return Ok(PricingCatalog::reference());
    };

    let catalog: PricingCatalog = read_json(path, "pricing catalog")?;
    catalog
        .validate()
        .map_err(|e| eyre!("Invalid pricing catalog {}: {}", path.display(), e))?;

    info!(
        path = %path.display(),
        region = %catalog.region,
        vm_sizes = catalog.vm_hourly.len(),
        storage_skus = catalog.storage_per_gb_month.len(),
        "Loaded pricing catalog"
    );
    Ok(catalog)
}

/// Load a family table, or the built-in reference table when no path is configured
pub fn load_families(path: Option<&Path>) -> Result<FamilyTable> {
    match path {
        Some(path) => {
            let table: FamilyTable = read_json(path, "family table")?;
            info!(path = %path.display(), prefixes = table.prefixes.len(), "Loaded family table");
            Ok(table)
        }
        None => Ok(FamilyTable::reference()),
    }
}

/// Usage snapshot: a bare list of records or a provider-style `{"value": [...]}` envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsageFile {
    Records(Vec<UsageRecord>),
    Envelope { value: Vec<UsageRecord> },
}

pub fn load_usage(path: &Path) -> Result<Vec<UsageRecord>> {
    let usage = match read_json::<UsageFile>(path, "usage snapshot")? {
        UsageFile::Records(records) => records,
        UsageFile::Envelope { value } => value,
    };
    debug!(path = %path.display(), records = usage.len(), "Loaded usage snapshot");
    Ok(usage)
}

/// One entry of a hardware facts file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareEntry {
    pub name: String,
    #[serde(flatten)]
    pub facts: HardwareFacts,
}

/// Hardware facts of the sizes offered in one location
#[derive(Debug, Clone, Default)]
pub struct HardwareCatalog {
    sizes: BTreeMap<String, HardwareFacts>,
}

impl HardwareCatalog {
    pub fn get(&self, vm_size: &str) -> Option<&HardwareFacts> {
        self.sizes.get(vm_size)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }
}

impl FromIterator<HardwareEntry> for HardwareCatalog {
    fn from_iter<I: IntoIterator<Item = HardwareEntry>>(entries: I) -> Self {
        let mut sizes = BTreeMap::new();
        for entry in entries {
            // First entry wins, as with usage records
            sizes.entry(entry.name).or_insert(entry.facts);
        }
        Self { sizes }
    }
}

pub fn load_hardware(path: &Path) -> Result<HardwareCatalog> {
    let entries: Vec<HardwareEntry> = read_json(path, "hardware facts")?;
    let catalog: HardwareCatalog = entries.into_iter().collect();
    debug!(path = %path.display(), sizes = catalog.len(), "Loaded hardware facts");
    Ok(catalog)
}

/// Write a document as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document).wrap_err("Failed to serialize report")?;
    fs::write(path, json)
        .wrap_err_with(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
