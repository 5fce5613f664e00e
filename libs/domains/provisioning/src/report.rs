//! Result documents returned to callers.
//!
//! Assembly is structural: the documents copy values out of a [`CostBreakdown`] or
//! [`QuotaReport`] without recomputing any decision. The timestamp is always supplied
//! by the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::catalog::PricingCatalog;
use crate::models::{
    CostBreakdown, CostComponentKind, QuotaReport, QuotaStatus, QuotaVerdict, VmRequestSpec,
};
use crate::money::{Currency, serialize_rounded};

/// Request parameters echoed into a cost report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfiguration {
    #[serde(with = "rust_decimal::serde::float")]
    pub os_disk_gb: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub data_disk_gb: Decimal,
    pub storage_type: String,
    pub backup_enabled: bool,
    pub public_ip: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub outbound_data_gb: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub hours_per_month: Decimal,
    pub quantity: u32,
}

impl From<&VmRequestSpec> for CostConfiguration {
    fn from(spec: &VmRequestSpec) -> Self {
        Self {
            os_disk_gb: spec.os_disk_gb,
            data_disk_gb: spec.data_disk_gb,
            storage_type: spec.storage_sku.clone(),
            backup_enabled: spec.backup_enabled,
            public_ip: spec.public_ip_enabled,
            outbound_data_gb: spec.outbound_data_gb,
            hours_per_month: spec.hours_per_month,
            quantity: spec.quantity,
        }
    }
}

/// Monthly amount per component, unrounded.
///
/// Amounts are exact decimal strings, so summing them reproduces the stated total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdownDocument {
    #[serde(with = "rust_decimal::serde::str")]
    pub compute: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub os_disk: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub data_disk: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub backup: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub network: Decimal,
}

impl CostBreakdownDocument {
    pub fn sum(&self) -> Decimal {
        self.compute + self.os_disk + self.data_disk + self.backup + self.network
    }
}

impl From<&CostBreakdown> for CostBreakdownDocument {
    fn from(breakdown: &CostBreakdown) -> Self {
        Self {
            compute: breakdown.amount_of(CostComponentKind::Compute),
            os_disk: breakdown.amount_of(CostComponentKind::OsDisk),
            data_disk: breakdown.amount_of(CostComponentKind::DataDisk),
            backup: breakdown.amount_of(CostComponentKind::Backup),
            network: breakdown.amount_of(CostComponentKind::Network),
        }
    }
}

/// Cost estimate for one VM configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub vm_size: String,
    pub configuration: CostConfiguration,
    pub cost_breakdown: CostBreakdownDocument,
    /// Rounded to minor units on serialization
    #[serde(serialize_with = "serialize_rounded")]
    pub total_monthly_cost: Decimal,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_annual_cost: Decimal,
    pub currency: Currency,
    pub region: String,
    /// Catalog entries that fell back to a default rate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// One quota dimension as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDimensionDocument {
    pub name: String,
    pub quota_name: String,
    pub current: Option<i64>,
    pub limit: Option<i64>,
    pub available: Option<i64>,
    pub required: i64,
    pub status: QuotaStatus,
    /// `null` when the dimension could not be verified
    pub sufficient: Option<bool>,
}

impl From<&QuotaVerdict> for QuotaDimensionDocument {
    fn from(verdict: &QuotaVerdict) -> Self {
        Self {
            name: verdict.name.clone(),
            quota_name: verdict.dimension_name.clone(),
            current: verdict.current,
            limit: verdict.limit,
            available: verdict.available,
            required: verdict.required,
            status: verdict.status,
            sufficient: verdict.sufficient(),
        }
    }
}

/// Verdicts keyed by dimension, kept in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, QuotaDimensionDocument>")]
pub struct QuotaDimensions(pub Vec<(String, QuotaDimensionDocument)>);

impl QuotaDimensions {
    pub fn get(&self, key: &str) -> Option<&QuotaDimensionDocument> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuotaDimensionDocument)> {
        self.0.iter().map(|(k, d)| (k.as_str(), d))
    }
}

impl From<&QuotaReport> for QuotaDimensions {
    fn from(report: &QuotaReport) -> Self {
        Self(
            report
                .verdicts
                .iter()
                .map(|v| (v.key.clone(), QuotaDimensionDocument::from(v)))
                .collect(),
        )
    }
}

impl From<std::collections::BTreeMap<String, QuotaDimensionDocument>> for QuotaDimensions {
    fn from(map: std::collections::BTreeMap<String, QuotaDimensionDocument>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl Serialize for QuotaDimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, d)| (k, d)))
    }
}

/// Network quota section of a quota report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkQuotaDocument {
    pub required: i64,
    pub quotas: QuotaDimensions,
    pub overall_status: QuotaStatus,
    pub overall_sufficient: bool,
}

/// Where a quota report applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaScope {
    pub subscription_id: Option<String>,
    pub location: String,
}

/// Quota sufficiency of one request.
///
/// `overall_*` reflect the compute dimensions; the network section carries its own
/// overall verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaReportDocument {
    pub subscription_id: Option<String>,
    pub location: String,
    pub vm_size: String,
    pub quantity: u32,
    pub family: Option<String>,
    pub cores_required: Option<i64>,
    pub memory_required_mb: Option<i64>,
    pub hardware_facts_missing: bool,
    pub quotas: QuotaDimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkQuotaDocument>,
    pub overall_status: QuotaStatus,
    pub overall_sufficient: bool,
    pub unverified_dimensions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Cost and/or quota outcome of one provisioning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningReport {
    pub timestamp: DateTime<Utc>,
    pub request: VmRequestSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaReportDocument>,
}

impl ProvisioningReport {
    /// True when the quota section exists and was verified sufficient
    pub fn quota_cleared(&self) -> bool {
        self.quota.as_ref().is_some_and(|q| q.overall_sufficient)
    }
}

/// Builds result documents stamped with a fixed, caller-supplied time
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    timestamp: DateTime<Utc>,
}

impl ReportAssembler {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn cost_report(
        &self,
        spec: &VmRequestSpec,
        breakdown: &CostBreakdown,
        catalog: &PricingCatalog,
    ) -> CostReport {
        CostReport {
            vm_size: breakdown.vm_size.clone(),
            configuration: CostConfiguration::from(spec),
            cost_breakdown: CostBreakdownDocument::from(breakdown),
            total_monthly_cost: breakdown.total_monthly(),
            total_annual_cost: breakdown.total_annual(),
            currency: breakdown.currency,
            region: catalog.region.clone(),
            warnings: breakdown.warnings.iter().map(ToString::to_string).collect(),
            timestamp: self.timestamp,
        }
    }

    pub fn quota_report(
        &self,
        scope: &QuotaScope,
        vm_size: &str,
        quantity: u32,
        compute: &QuotaReport,
        network: Option<(&QuotaReport, u32)>,
    ) -> QuotaReportDocument {
        let requirement = compute.requirement.as_ref();

        QuotaReportDocument {
            subscription_id: scope.subscription_id.clone(),
            location: scope.location.clone(),
            vm_size: vm_size.to_string(),
            quantity,
            family: compute.family.clone(),
            cores_required: requirement.map(|r| r.cores_required),
            memory_required_mb: requirement.map(|r| r.memory_required_mb),
            hardware_facts_missing: compute.hardware_facts_missing,
            quotas: QuotaDimensions::from(compute),
            network: network.map(|(report, required)| NetworkQuotaDocument {
                required: i64::from(required),
                quotas: QuotaDimensions::from(report),
                overall_status: report.overall_status(),
                overall_sufficient: report.overall_sufficient(),
            }),
            overall_status: compute.overall_status(),
            overall_sufficient: compute.overall_sufficient(),
            unverified_dimensions: compute.unverified_dimensions(),
            timestamp: self.timestamp,
        }
    }

    pub fn combine(
        &self,
        request: &VmRequestSpec,
        cost: Option<CostReport>,
        quota: Option<QuotaReportDocument>,
    ) -> ProvisioningReport {
        ProvisioningReport {
            timestamp: self.timestamp,
            request: request.clone(),
            cost,
            quota,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuotaRequirement, UsageRecord};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn verdict(key: &str, record: Option<UsageRecord>) -> QuotaVerdict {
        let requirement = QuotaRequirement {
            dimension_name: key.to_string(),
            required_amount: 4,
        };
        QuotaVerdict::judge(key, key, &requirement, record.as_ref())
    }

    #[test]
    fn test_dimensions_serialize_in_evaluation_order() {
        let report = QuotaReport {
            requirement: None,
            family: None,
            hardware_facts_missing: false,
            verdicts: vec![
                verdict("zeta", Some(UsageRecord::new("zeta", 0, 10))),
                verdict("alpha", None),
            ],
        };

        let json = serde_json::to_string(&QuotaDimensions::from(&report)).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_cost_breakdown_document_sums_components() {
        let document = CostBreakdownDocument {
            compute: dec!(82.49),
            os_disk: dec!(19.20),
            data_disk: Decimal::ZERO,
            backup: Decimal::ZERO,
            network: dec!(8.265),
        };
        assert_eq!(document.sum(), dec!(109.955));
    }

    #[test]
    fn test_quota_cleared_requires_quota_section() {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let assembler = ReportAssembler::new(timestamp);
        let request = VmRequestSpec::new("Standard_B2s");

        let report = assembler.combine(&request, None, None);
        assert_eq!(report.timestamp, timestamp);
        assert!(!report.quota_cleared());
    }
}
