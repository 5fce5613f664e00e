//! Static, versioned price tables.
//!
//! A [`PricingCatalog`] is an immutable value injected into the estimator. Prices are
//! changed by shipping a new catalog (or a catalog file), never by mutating one at runtime.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::{ProvisioningError, ProvisioningResult};
use crate::money::Currency;

/// Category of a priced resource
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RateCategory {
    /// VM size, priced per hour
    Compute,
    /// Storage SKU, priced per GB-month
    Storage,
}

/// Where a resolved rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RateSource {
    Catalog,
    /// Identifier missing from the catalog; the category default was used
    Fallback,
}

/// Unit price resolved for an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRate {
    pub category: RateCategory,
    pub identifier: String,
    pub unit_price: Decimal,
    pub source: RateSource,
}

impl ResourceRate {
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

/// Backup vault pricing (per month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRates {
    pub per_protected_instance: Decimal,
    pub per_gb: Decimal,
}

/// Network pricing (per month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRates {
    pub public_ip_monthly: Decimal,
    pub egress_per_gb: Decimal,
    /// Outbound volume that is never billed
    pub free_egress_gb: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    /// Region the prices apply to (display name)
    pub region: String,
    #[serde(default)]
    pub currency: Currency,
    /// VM size -> hourly rate
    pub vm_hourly: BTreeMap<String, Decimal>,
    /// Storage SKU -> rate per GB-month
    pub storage_per_gb_month: BTreeMap<String, Decimal>,
    /// Rate used for VM sizes missing from `vm_hourly`
    pub default_vm_hourly: Decimal,
    /// Rate used for SKUs missing from `storage_per_gb_month`
    pub default_storage_per_gb: Decimal,
    pub backup: BackupRates,
    pub network: NetworkRates,
}

impl PricingCatalog {
    /// Built-in West Europe pay-as-you-go prices in USD
    pub fn reference() -> Self {
        let vm_hourly = [
            // B-series (burstable)
            ("Standard_B2s", dec!(0.0416)),
            ("Standard_B2ms", dec!(0.0832)),
            ("Standard_B4ms", dec!(0.1664)),
            // Dsv3 (general purpose)
            ("Standard_D2s_v3", dec!(0.113)),
            ("Standard_D4s_v3", dec!(0.226)),
            ("Standard_D8s_v3", dec!(0.452)),
            ("Standard_D16s_v3", dec!(0.904)),
            ("Standard_D32s_v3", dec!(1.808)),
            // Esv3 (memory optimized)
            ("Standard_E2s_v3", dec!(0.128)),
            ("Standard_E4s_v3", dec!(0.256)),
            ("Standard_E8s_v3", dec!(0.512)),
            ("Standard_E16s_v3", dec!(1.024)),
            ("Standard_E32s_v3", dec!(2.048)),
            // Fsv2 (compute optimized)
            ("Standard_F2s_v2", dec!(0.099)),
            ("Standard_F4s_v2", dec!(0.198)),
            ("Standard_F8s_v2", dec!(0.396)),
            ("Standard_F16s_v2", dec!(0.792)),
        ];

        let storage_per_gb_month = [
            ("Standard_LRS", dec!(0.05)),
            ("StandardSSD_LRS", dec!(0.10)),
            ("Premium_LRS", dec!(0.15)),
            ("PremiumV2_LRS", dec!(0.20)),
            ("UltraSSD_LRS", dec!(0.25)),
        ];

        Self {
            region: "West Europe".to_string(),
            currency: Currency::Usd,
            vm_hourly: vm_hourly
                .into_iter()
                .map(|(size, rate)| (size.to_string(), rate))
                .collect(),
            storage_per_gb_month: storage_per_gb_month
                .into_iter()
                .map(|(sku, rate)| (sku.to_string(), rate))
                .collect(),
            default_vm_hourly: dec!(0.10),
            default_storage_per_gb: dec!(0.15),
            backup: BackupRates {
                per_protected_instance: dec!(10.00),
                per_gb: dec!(0.10),
            },
            network: NetworkRates {
                public_ip_monthly: dec!(3.65),
                egress_per_gb: dec!(0.087),
                free_egress_gb: dec!(5),
            },
        }
    }

    /// Resolve the unit price for an identifier.
    ///
    /// Never fails: identifiers missing from the table resolve to the category default
    /// with [`RateSource::Fallback`], and callers are expected to surface that.
    pub fn rate_for(&self, category: RateCategory, identifier: &str) -> ResourceRate {
        let (table, default_rate) = match category {
            RateCategory::Compute => (&self.vm_hourly, self.default_vm_hourly),
            RateCategory::Storage => (&self.storage_per_gb_month, self.default_storage_per_gb),
        };

        match table.get(identifier) {
            Some(unit_price) => ResourceRate {
                category,
                identifier: identifier.to_string(),
                unit_price: *unit_price,
                source: RateSource::Catalog,
            },
            None => {
                debug!(%category, identifier, %default_rate, "Catalog miss, using default rate");
                ResourceRate {
                    category,
                    identifier: identifier.to_string(),
                    unit_price: default_rate,
                    source: RateSource::Fallback,
                }
            }
        }
    }

    /// Reject catalogs with empty identifiers or negative rates
    pub fn validate(&self) -> ProvisioningResult<()> {
        if self.region.trim().is_empty() {
            return Err(ProvisioningError::invalid("region", "must not be empty"));
        }

        let tables = [
            ("vm_hourly", &self.vm_hourly),
            ("storage_per_gb_month", &self.storage_per_gb_month),
        ];
        for (table_name, table) in tables {
            for (identifier, rate) in table {
                if identifier.trim().is_empty() {
                    return Err(ProvisioningError::invalid(
                        table_name,
                        "contains an empty identifier",
                    ));
                }
                check_rate(&format!("{table_name}.{identifier}"), *rate)?;
            }
        }

        check_rate("default_vm_hourly", self.default_vm_hourly)?;
        check_rate("default_storage_per_gb", self.default_storage_per_gb)?;
        check_rate("backup.per_protected_instance", self.backup.per_protected_instance)?;
        check_rate("backup.per_gb", self.backup.per_gb)?;
        check_rate("network.public_ip_monthly", self.network.public_ip_monthly)?;
        check_rate("network.egress_per_gb", self.network.egress_per_gb)?;
        check_rate("network.free_egress_gb", self.network.free_egress_gb)?;

        Ok(())
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

fn check_rate(field: &str, rate: Decimal) -> ProvisioningResult<()> {
    crate::error::ensure_non_negative(field, rate)
}
