use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

use crate::catalog::RateCategory;
use crate::money::{Currency, MONTHS_PER_YEAR};

fn default_os_disk_gb() -> Decimal {
    dec!(128)
}

fn default_storage_sku() -> String {
    "Premium_LRS".to_string()
}

fn default_outbound_data_gb() -> Decimal {
    dec!(100)
}

fn default_hours_per_month() -> Decimal {
    crate::estimator::DEFAULT_HOURS_PER_MONTH
}

fn default_quantity() -> u32 {
    1
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be empty".into()));
    }
    Ok(())
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative").with_message("must not be negative".into()));
    }
    Ok(())
}

// ============================================================================
// Requests and external inputs
// ============================================================================

/// A proposed VM configuration.
///
/// Sizes are in GB, `outbound_data_gb` is monthly egress per VM and `quantity`
/// is the number of identical VMs requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VmRequestSpec {
    #[validate(custom(function = "not_blank"))]
    pub vm_size: String,
    #[serde(default = "default_os_disk_gb")]
    #[validate(custom(function = "non_negative"))]
    pub os_disk_gb: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub data_disk_gb: Decimal,
    #[serde(default = "default_storage_sku")]
    #[validate(custom(function = "not_blank"))]
    pub storage_sku: String,
    #[serde(default)]
    pub backup_enabled: bool,
    #[serde(default)]
    pub public_ip_enabled: bool,
    #[serde(default = "default_outbound_data_gb")]
    #[validate(custom(function = "non_negative"))]
    pub outbound_data_gb: Decimal,
    #[serde(default = "default_hours_per_month")]
    #[validate(custom(function = "non_negative"))]
    pub hours_per_month: Decimal,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: u32,
}

impl VmRequestSpec {
    /// A request for one VM of `vm_size` with every other field at its default
    pub fn new(vm_size: impl Into<String>) -> Self {
        Self {
            vm_size: vm_size.into(),
            os_disk_gb: default_os_disk_gb(),
            data_disk_gb: Decimal::ZERO,
            storage_sku: default_storage_sku(),
            backup_enabled: false,
            public_ip_enabled: false,
            outbound_data_gb: default_outbound_data_gb(),
            hours_per_month: default_hours_per_month(),
            quantity: default_quantity(),
        }
    }

    /// Same configuration with a different VM size
    pub fn with_vm_size(&self, vm_size: impl Into<String>) -> Self {
        Self {
            vm_size: vm_size.into(),
            ..self.clone()
        }
    }

    /// Disk space protected by backup (OS + data disk)
    pub fn protected_storage_gb(&self) -> Decimal {
        self.os_disk_gb + self.data_disk_gb
    }
}

/// Per-size hardware facts supplied by an external size catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareFacts {
    pub cores: u32,
    pub memory_mb: u64,
    #[serde(default)]
    pub max_data_disks: Option<u32>,
}

/// Snapshot of a single quota dimension for a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(alias = "name")]
    pub quota_name: String,
    #[serde(alias = "currentValue", alias = "current")]
    pub current_value: i64,
    pub limit: i64,
}

impl UsageRecord {
    pub fn new(quota_name: impl Into<String>, current_value: i64, limit: i64) -> Self {
        Self {
            quota_name: quota_name.into(),
            current_value,
            limit,
        }
    }

    /// Headroom left under the limit; negative when the dimension is over-committed.
    /// Saturates at the `i64` bounds for out-of-range provider values.
    pub fn available(&self) -> i64 {
        self.limit.saturating_sub(self.current_value)
    }
}

// ============================================================================
// Cost results
// ============================================================================

/// Named cost component of a breakdown
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CostComponentKind {
    Compute,
    /// Storage priced on its own, before it is attributed to a disk
    Storage,
    OsDisk,
    DataDisk,
    Backup,
    Network,
}

impl CostComponentKind {
    /// Components of a full estimate, in presentation order
    pub const BREAKDOWN: [CostComponentKind; 5] = [
        CostComponentKind::Compute,
        CostComponentKind::OsDisk,
        CostComponentKind::DataDisk,
        CostComponentKind::Backup,
        CostComponentKind::Network,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    pub name: CostComponentKind,
    pub monthly_amount: Decimal,
}

impl CostComponent {
    pub fn new(name: CostComponentKind, monthly_amount: Decimal) -> Self {
        Self {
            name,
            monthly_amount,
        }
    }

    /// A component that was not requested still contributes an explicit zero
    pub fn zero(name: CostComponentKind) -> Self {
        Self::new(name, Decimal::ZERO)
    }

    pub fn named(self, name: CostComponentKind) -> Self {
        Self { name, ..self }
    }

    /// `None` when the scaled amount does not fit in a `Decimal`
    pub fn checked_scaled(self, factor: Decimal) -> Option<Self> {
        Some(Self {
            monthly_amount: self.monthly_amount.checked_mul(factor)?,
            ..self
        })
    }
}

/// Note attached to an estimate when a catalog entry was missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogWarning {
    pub category: RateCategory,
    pub identifier: String,
    pub fallback_rate: Decimal,
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no {} rate for '{}', using fallback rate {}",
            self.category, self.identifier, self.fallback_rate
        )
    }
}

/// Ordered cost components for one VM configuration.
///
/// Totals are never stored; they are summed from `components` on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub vm_size: String,
    pub currency: Currency,
    pub components: Vec<CostComponent>,
    #[serde(default)]
    pub warnings: Vec<CatalogWarning>,
}

impl CostBreakdown {
    pub fn total_monthly(&self) -> Decimal {
        self.components.iter().map(|c| c.monthly_amount).sum()
    }

    pub fn total_annual(&self) -> Decimal {
        self.total_monthly() * MONTHS_PER_YEAR
    }

    /// Amount of a named component, zero when absent
    pub fn amount_of(&self, name: CostComponentKind) -> Decimal {
        self.components
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.monthly_amount)
            .sum()
    }

    pub fn used_fallback_rates(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// ============================================================================
// Quota results
// ============================================================================

/// Tri-state outcome of a quota check
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotaStatus {
    Sufficient,
    Insufficient,
    /// No usage record was available, so the dimension could not be verified
    Unknown,
}

/// Compute demand of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequirement {
    pub vm_size: String,
    pub quantity: u32,
    pub cores_required: i64,
    pub memory_required_mb: i64,
}

/// Demand placed on a single quota dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRequirement {
    pub dimension_name: String,
    pub required_amount: i64,
}

/// Verdict for one quota dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaVerdict {
    /// Stable report key, e.g. `total_cores`
    pub key: String,
    /// Human-readable dimension name
    pub name: String,
    /// Quota name matched against the usage snapshot
    pub dimension_name: String,
    pub current: Option<i64>,
    pub limit: Option<i64>,
    pub available: Option<i64>,
    pub required: i64,
    pub status: QuotaStatus,
}

impl QuotaVerdict {
    /// Judge `requirement` against the matching usage record, if any
    pub fn judge(
        key: impl Into<String>,
        name: impl Into<String>,
        requirement: &QuotaRequirement,
        record: Option<&UsageRecord>,
    ) -> Self {
        let (current, limit, available, status) = match record {
            Some(record) => {
                let available = record.available();
                let status = if available >= requirement.required_amount {
                    QuotaStatus::Sufficient
                } else {
                    QuotaStatus::Insufficient
                };
                (
                    Some(record.current_value),
                    Some(record.limit),
                    Some(available),
                    status,
                )
            }
            None => (None, None, None, QuotaStatus::Unknown),
        };

        Self {
            key: key.into(),
            name: name.into(),
            dimension_name: requirement.dimension_name.clone(),
            current,
            limit,
            available,
            required: requirement.required_amount,
            status,
        }
    }

    /// `Some(true|false)` for verified dimensions, `None` when unknown
    pub fn sufficient(&self) -> Option<bool> {
        match self.status {
            QuotaStatus::Sufficient => Some(true),
            QuotaStatus::Insufficient => Some(false),
            QuotaStatus::Unknown => None,
        }
    }

    /// Shortfall against the requirement for insufficient dimensions
    pub fn shortfall(&self) -> Option<i64> {
        match (self.status, self.available) {
            (QuotaStatus::Insufficient, Some(available)) => {
                Some(self.required.saturating_sub(available))
            }
            _ => None,
        }
    }
}

/// Ordered verdicts of one evaluation; the overall outcome is derived, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaReport {
    /// Present for compute evaluations, absent for network evaluations
    pub requirement: Option<ComputeRequirement>,
    /// Resolved VM family for compute evaluations
    pub family: Option<String>,
    /// Hardware facts for the size were not available
    #[serde(default)]
    pub hardware_facts_missing: bool,
    pub verdicts: Vec<QuotaVerdict>,
}

impl QuotaReport {
    /// `insufficient` if any verified dimension falls short, `unknown` if nothing
    /// could be verified, `sufficient` otherwise
    pub fn overall_status(&self) -> QuotaStatus {
        let mut any_known = false;
        for verdict in &self.verdicts {
            match verdict.status {
                QuotaStatus::Insufficient => return QuotaStatus::Insufficient,
                QuotaStatus::Sufficient => any_known = true,
                QuotaStatus::Unknown => {}
            }
        }

        if any_known && !self.hardware_facts_missing {
            QuotaStatus::Sufficient
        } else {
            QuotaStatus::Unknown
        }
    }

    pub fn overall_sufficient(&self) -> bool {
        self.overall_status() == QuotaStatus::Sufficient
    }

    /// Keys of the dimensions that could not be verified
    pub fn unverified_dimensions(&self) -> Vec<String> {
        self.verdicts
            .iter()
            .filter(|v| v.status == QuotaStatus::Unknown)
            .map(|v| v.key.clone())
            .collect()
    }

    pub fn verdict(&self, key: &str) -> Option<&QuotaVerdict> {
        self.verdicts.iter().find(|v| v.key == key)
    }

    pub fn insufficient(&self) -> impl Iterator<Item = &QuotaVerdict> {
        self.verdicts
            .iter()
            .filter(|v| v.status == QuotaStatus::Insufficient)
    }
}

/// Lifecycle of a drafted quota increase
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncreaseRequestStatus {
    /// Drafted, not yet submitted to the provider
    Pending,
}

/// Draft of a quota increase for an insufficient dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaIncreaseRequest {
    pub quota_name: String,
    pub location: String,
    pub current_limit: i64,
    pub requested_limit: i64,
    pub justification: String,
    pub status: IncreaseRequestStatus,
}
