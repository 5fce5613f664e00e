//! Quota sufficiency evaluation.
//!
//! The evaluator never fetches usage itself. Callers pass the usage snapshot for a
//! location and the hardware facts of the requested size; the evaluator turns them into
//! per-dimension verdicts. A dimension with no usage record is reported as
//! [`QuotaStatus::Unknown`], never as sufficient.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{ProvisioningError, ProvisioningResult, ensure_identifier};
use crate::models::{
    ComputeRequirement, HardwareFacts, IncreaseRequestStatus, QuotaIncreaseRequest, QuotaReport,
    QuotaRequirement, QuotaStatus, QuotaVerdict, UsageRecord,
};

/// Quota name of the regional vCPU total
pub const TOTAL_CORES_QUOTA: &str = "cores";

/// Family used when no prefix of the size matches
pub const DEFAULT_FAMILY: &str = "standardDSv3Family";

/// Report key of the regional vCPU dimension
pub const TOTAL_CORES_KEY: &str = "total_cores";

/// Report key of the VM family vCPU dimension
pub const FAMILY_CORES_KEY: &str = "family_cores";

/// Size-prefix to quota-family mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTable {
    pub prefixes: BTreeMap<String, String>,
    #[serde(default = "default_family")]
    pub default_family: String,
}

fn default_family() -> String {
    DEFAULT_FAMILY.to_string()
}

impl FamilyTable {
    pub fn reference() -> Self {
        let prefixes = [
            ("Standard_B", "standardBSFamily"),
            ("Standard_D2", "standardDSv3Family"),
            ("Standard_D4", "standardDSv3Family"),
            ("Standard_D8", "standardDSv3Family"),
            ("Standard_D16", "standardDSv3Family"),
            ("Standard_E2", "standardESv3Family"),
            ("Standard_E4", "standardESv3Family"),
            ("Standard_E8", "standardESv3Family"),
            ("Standard_E16", "standardESv3Family"),
            ("Standard_F2", "standardFSv2Family"),
            ("Standard_F4", "standardFSv2Family"),
            ("Standard_F8", "standardFSv2Family"),
        ];

        Self {
            prefixes: prefixes
                .into_iter()
                .map(|(prefix, family)| (prefix.to_string(), family.to_string()))
                .collect(),
            default_family: default_family(),
        }
    }

    /// Longest matching prefix wins; sizes matching nothing get the default family
    pub fn resolve(&self, vm_size: &str) -> &str {
        self.prefixes
            .iter()
            .filter(|(prefix, _)| vm_size.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, family)| family.as_str())
            .unwrap_or(self.default_family.as_str())
    }
}

impl Default for FamilyTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Stateless evaluator bound to a family table
#[derive(Debug, Clone)]
pub struct QuotaEvaluator {
    families: FamilyTable,
}

impl QuotaEvaluator {
    pub fn new(families: FamilyTable) -> Self {
        Self { families }
    }

    pub fn families(&self) -> &FamilyTable {
        &self.families
    }

    pub fn resolve_family(&self, vm_size: &str) -> &str {
        self.families.resolve(vm_size)
    }

    /// Total demand of `quantity` VMs with the given per-unit hardware facts
    pub fn build_requirement(
        &self,
        vm_size: &str,
        cores: u32,
        memory_mb: u64,
        quantity: u32,
    ) -> ProvisioningResult<ComputeRequirement> {
        ensure_identifier("vm_size", vm_size)?;
        ensure_quantity(quantity)?;

        let memory_mb = i64::try_from(memory_mb)
            .map_err(|_| ProvisioningError::invalid("memory_mb", "out of range"))?;

        Ok(ComputeRequirement {
            vm_size: vm_size.to_string(),
            quantity,
            cores_required: i64::from(cores) * i64::from(quantity),
            memory_required_mb: memory_mb.saturating_mul(i64::from(quantity)),
        })
    }

    /// Check regional and family vCPU quota for `quantity` VMs of `vm_size`
    pub fn evaluate(
        &self,
        usage: &[UsageRecord],
        vm_size: &str,
        cores: u32,
        memory_mb: u64,
        quantity: u32,
    ) -> ProvisioningResult<QuotaReport> {
        let requirement = self.build_requirement(vm_size, cores, memory_mb, quantity)?;
        let family = self.resolve_family(vm_size).to_string();

        let verdicts = compute_dimensions(&family)
            .into_iter()
            .map(|(key, name, dimension_name)| {
                let required = QuotaRequirement {
                    dimension_name,
                    required_amount: requirement.cores_required,
                };
                let verdict = QuotaVerdict::judge(key, name, &required, find(usage, &required));
                log_verdict(&verdict);
                verdict
            })
            .collect();

        let report = QuotaReport {
            requirement: Some(requirement),
            family: Some(family),
            hardware_facts_missing: false,
            verdicts,
        };

        info!(
            vm_size,
            quantity,
            overall = %report.overall_status(),
            "Evaluated compute quota"
        );

        Ok(report)
    }

    /// Like [`evaluate`](Self::evaluate), but tolerates a size the hardware catalog did
    /// not know. Without facts nothing can be verified, so every dimension is unknown.
    pub fn evaluate_with_facts(
        &self,
        usage: &[UsageRecord],
        vm_size: &str,
        facts: Option<&HardwareFacts>,
        quantity: u32,
    ) -> ProvisioningResult<QuotaReport> {
        if let Some(facts) = facts {
            return self.evaluate(usage, vm_size, facts.cores, facts.memory_mb, quantity);
        }

        ensure_identifier("vm_size", vm_size)?;
        ensure_quantity(quantity)?;

        warn!(vm_size, "No hardware facts for size, quota cannot be verified");

        let family = self.resolve_family(vm_size).to_string();
        let verdicts = compute_dimensions(&family)
            .into_iter()
            .map(|(key, name, dimension_name)| {
                let required = QuotaRequirement {
                    dimension_name,
                    required_amount: 0,
                };
                QuotaVerdict::judge(key, name, &required, None)
            })
            .collect();

        Ok(QuotaReport {
            requirement: None,
            family: Some(family),
            hardware_facts_missing: true,
            verdicts,
        })
    }

    /// Check every network dimension in the snapshot against `required_count`.
    ///
    /// Network dimensions are keyed by their quota name; an empty snapshot yields an
    /// overall `unknown`.
    pub fn evaluate_network(&self, usage: &[UsageRecord], required_count: u32) -> QuotaReport {
        let verdicts: Vec<QuotaVerdict> = usage
            .iter()
            .filter(|record| !record.quota_name.trim().is_empty())
            .map(|record| {
                let required = QuotaRequirement {
                    dimension_name: record.quota_name.clone(),
                    required_amount: i64::from(required_count),
                };
                let verdict = QuotaVerdict::judge(
                    record.quota_name.clone(),
                    record.quota_name.clone(),
                    &required,
                    Some(record),
                );
                log_verdict(&verdict);
                verdict
            })
            .collect();

        let report = QuotaReport {
            requirement: None,
            family: None,
            hardware_facts_missing: false,
            verdicts,
        };

        info!(
            dimensions = report.verdicts.len(),
            overall = %report.overall_status(),
            "Evaluated network quota"
        );

        report
    }
}

impl Default for QuotaEvaluator {
    fn default() -> Self {
        Self::new(FamilyTable::reference())
    }
}

/// Draft an increase for every insufficient dimension of `report`.
///
/// The requested limit is the smallest one that makes the dimension sufficient:
/// current usage plus the requirement.
pub fn draft_increase_requests(
    report: &QuotaReport,
    location: &str,
    justification: &str,
) -> Vec<QuotaIncreaseRequest> {
    report
        .insufficient()
        .filter_map(|verdict| {
            let current = verdict.current?;
            let limit = verdict.limit?;
            let request = QuotaIncreaseRequest {
                quota_name: verdict.dimension_name.clone(),
                location: location.to_string(),
                current_limit: limit,
                requested_limit: current.saturating_add(verdict.required),
                justification: justification.to_string(),
                status: IncreaseRequestStatus::Pending,
            };
            info!(
                quota = %request.quota_name,
                location,
                requested_limit = request.requested_limit,
                "Drafted quota increase"
            );
            Some(request)
        })
        .collect()
}

/// Report key, display name and quota name of the compute dimensions
fn compute_dimensions(family: &str) -> [(&'static str, String, String); 2] {
    [
        (
            TOTAL_CORES_KEY,
            "Total Regional vCPUs".to_string(),
            TOTAL_CORES_QUOTA.to_string(),
        ),
        (
            FAMILY_CORES_KEY,
            format!("VM Family ({family})"),
            family.to_string(),
        ),
    ]
}

/// Exact quota-name match; the first record wins when a snapshot repeats a name
fn find<'u>(usage: &'u [UsageRecord], requirement: &QuotaRequirement) -> Option<&'u UsageRecord> {
    usage
        .iter()
        .find(|record| record.quota_name == requirement.dimension_name)
}

fn ensure_quantity(quantity: u32) -> ProvisioningResult<()> {
    if quantity == 0 {
        return Err(ProvisioningError::invalid("quantity", "must be at least 1"));
    }
    Ok(())
}

fn log_verdict(verdict: &QuotaVerdict) {
    match verdict.status {
        QuotaStatus::Insufficient => warn!(
            dimension = %verdict.dimension_name,
            available = verdict.available,
            required = verdict.required,
            "Insufficient quota"
        ),
        QuotaStatus::Unknown => warn!(
            dimension = %verdict.dimension_name,
            "No usage record for quota dimension"
        ),
        QuotaStatus::Sufficient => {}
    }
}
