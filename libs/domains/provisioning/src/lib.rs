//! Provisioning Domain
//!
//! Pure decision layer for virtual-machine requests: what a configuration will cost,
//! and whether a location has the quota to run it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐
//! │ CostEstimator  │   │ QuotaEvaluator │  ← decisions (pure, synchronous)
//! └───────┬────────┘   └───────┬────────┘
//!         │                    │
//! ┌───────▼────────┐           │
//! │     ranker     │           │
//! └───────┬────────┘           │
//!         │                    │
//! ┌───────▼────────────────────▼───────┐
//! │           ReportAssembler          │  ← result documents
//! └────────────────────────────────────┘
//! ```
//!
//! Prices, usage snapshots and hardware facts are passed in as already-fetched values.
//! Nothing here performs I/O or reads the clock, so independent evaluations can run in
//! parallel without coordination.
//!
//! # Example
//!
//! ```
//! use domain_provisioning::{CostEstimator, PricingCatalog, VmRequestSpec};
//! use rust_decimal_macros::dec;
//!
//! let catalog = PricingCatalog::reference();
//! let estimator = CostEstimator::new(&catalog);
//!
//! let breakdown = estimator.estimate_total(&VmRequestSpec::new("Standard_D2s_v3")).unwrap();
//! assert_eq!(breakdown.total_monthly(), dec!(109.955));
//! ```

pub mod catalog;
pub mod error;
pub mod estimator;
pub mod models;
pub mod money;
pub mod quota;
pub mod ranker;
pub mod report;

// Re-export commonly used types
pub use catalog::{BackupRates, NetworkRates, PricingCatalog, RateCategory, RateSource, ResourceRate};
pub use error::{ProvisioningError, ProvisioningResult};
pub use estimator::{CostEstimator, DEFAULT_HOURS_PER_MONTH};
pub use models::{
    CatalogWarning, ComputeRequirement, CostBreakdown, CostComponent, CostComponentKind,
    HardwareFacts, IncreaseRequestStatus, QuotaIncreaseRequest, QuotaReport, QuotaRequirement,
    QuotaStatus, QuotaVerdict, UsageRecord, VmRequestSpec,
};
pub use money::{Currency, format_amount, round_currency};
pub use quota::{FamilyTable, QuotaEvaluator, draft_increase_requests};
pub use ranker::{compare_sizes, rank};
pub use report::{
    CostReport, ProvisioningReport, QuotaDimensionDocument, QuotaReportDocument, QuotaScope,
    ReportAssembler,
};
