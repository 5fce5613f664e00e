//! Monthly cost estimation for a VM configuration.
//!
//! Every operation is pure: it reads the injected [`PricingCatalog`] and its arguments
//! and returns a new value. Negative inputs are rejected before any arithmetic, and
//! amounts too large for a `Decimal` are rejected as out of range instead of panicking.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::catalog::{PricingCatalog, RateCategory, ResourceRate};
use crate::error::{ProvisioningResult, ensure_identifier, ensure_non_negative, in_range};
use crate::money::MONTHS_PER_YEAR;
use crate::models::{CatalogWarning, CostBreakdown, CostComponent, CostComponentKind, VmRequestSpec};

/// Average hours in a month (8760 / 12)
pub const DEFAULT_HOURS_PER_MONTH: Decimal = dec!(730);

/// Cost estimator bound to one pricing catalog
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator<'a> {
    catalog: &'a PricingCatalog,
}

impl<'a> CostEstimator<'a> {
    pub fn new(catalog: &'a PricingCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a PricingCatalog {
        self.catalog
    }

    /// Compute cost: hourly rate of the size times hours run per month
    pub fn compute_cost(
        &self,
        vm_size: &str,
        hours_per_month: Decimal,
    ) -> ProvisioningResult<CostComponent> {
        self.price_compute(vm_size, hours_per_month, &mut Vec::new())
    }

    /// Managed disk cost: size times the per-GB rate of the SKU.
    ///
    /// A zero-sized disk yields a zero-amount component, not an absent one.
    pub fn compute_storage_cost(
        &self,
        size_gb: Decimal,
        storage_sku: &str,
    ) -> ProvisioningResult<CostComponent> {
        self.price_storage(size_gb, storage_sku, &mut Vec::new())
    }

    /// Backup cost: per protected instance plus per GB of backup storage
    pub fn compute_backup_cost(
        &self,
        protected_instance_count: u32,
        backup_storage_gb: Decimal,
    ) -> ProvisioningResult<CostComponent> {
        ensure_non_negative("backup_storage_gb", backup_storage_gb)?;

        let rates = &self.catalog.backup;
        let instance_cost = in_range(
            "protected_instance_count",
            Decimal::from(protected_instance_count).checked_mul(rates.per_protected_instance),
        )?;
        let storage_cost = in_range(
            "backup_storage_gb",
            backup_storage_gb.checked_mul(rates.per_gb),
        )?;
        let amount = in_range(
            "backup_storage_gb",
            instance_cost.checked_add(storage_cost),
        )?;

        debug!(
            protected_instance_count,
            %backup_storage_gb,
            %instance_cost,
            %storage_cost,
            "Priced backup"
        );

        Ok(CostComponent::new(CostComponentKind::Backup, amount))
    }

    /// Network cost: public IPs plus egress above the free allowance.
    ///
    /// Billable egress is clamped at zero, so any volume within the allowance is free.
    pub fn compute_network_cost(
        &self,
        public_ip_count: u32,
        outbound_data_gb: Decimal,
    ) -> ProvisioningResult<CostComponent> {
        ensure_non_negative("outbound_data_gb", outbound_data_gb)?;

        let rates = &self.catalog.network;
        let ip_cost = in_range(
            "public_ip_count",
            Decimal::from(public_ip_count).checked_mul(rates.public_ip_monthly),
        )?;
        let billable_gb = in_range(
            "outbound_data_gb",
            outbound_data_gb.checked_sub(rates.free_egress_gb),
        )?
        .max(Decimal::ZERO);
        let egress_cost = in_range(
            "outbound_data_gb",
            billable_gb.checked_mul(rates.egress_per_gb),
        )?;
        let amount = in_range("outbound_data_gb", ip_cost.checked_add(egress_cost))?;

        debug!(
            public_ip_count,
            %outbound_data_gb,
            %billable_gb,
            %ip_cost,
            %egress_cost,
            "Priced network"
        );

        Ok(CostComponent::new(CostComponentKind::Network, amount))
    }

    /// Full breakdown for a request.
    ///
    /// The request is validated first; nothing is priced when any field is invalid.
    /// Every breakdown carries the five components `compute`, `os_disk`, `data_disk`,
    /// `backup` and `network` in that order, with excluded ones at zero. Amounts are
    /// for all `quantity` VMs together; a request whose monthly or annual total would
    /// not fit in a `Decimal` is rejected on the `quantity` field.
    pub fn estimate_total(&self, spec: &VmRequestSpec) -> ProvisioningResult<CostBreakdown> {
        spec.validate()?;

        let mut warnings = Vec::new();

        let compute = self.price_compute(&spec.vm_size, spec.hours_per_month, &mut warnings)?;

        let os_disk = self
            .price_storage(spec.os_disk_gb, &spec.storage_sku, &mut warnings)?
            .named(CostComponentKind::OsDisk);

        let data_disk = if spec.data_disk_gb > Decimal::ZERO {
            self.price_storage(spec.data_disk_gb, &spec.storage_sku, &mut warnings)?
                .named(CostComponentKind::DataDisk)
        } else {
            CostComponent::zero(CostComponentKind::DataDisk)
        };

        let backup = if spec.backup_enabled {
            self.compute_backup_cost(1, spec.protected_storage_gb())?
        } else {
            CostComponent::zero(CostComponentKind::Backup)
        };

        let network =
            self.compute_network_cost(u32::from(spec.public_ip_enabled), spec.outbound_data_gb)?;

        let quantity = Decimal::from(spec.quantity);
        let components: Vec<CostComponent> = in_range(
            "quantity",
            [compute, os_disk, data_disk, backup, network]
                .into_iter()
                .map(|component| component.checked_scaled(quantity))
                .collect(),
        )?;

        // Totals are derived on demand, so make sure both can be derived
        let monthly = components.iter().try_fold(Decimal::ZERO, |total, component| {
            total.checked_add(component.monthly_amount)
        });
        in_range("quantity", monthly.and_then(|m| m.checked_mul(MONTHS_PER_YEAR)))?;

        let breakdown = CostBreakdown {
            vm_size: spec.vm_size.clone(),
            currency: self.catalog.currency,
            components,
            warnings,
        };

        info!(
            vm_size = %spec.vm_size,
            quantity = spec.quantity,
            total_monthly = %breakdown.total_monthly(),
            fallback_rates = breakdown.warnings.len(),
            "Estimated monthly cost"
        );

        Ok(breakdown)
    }

    fn price_compute(
        &self,
        vm_size: &str,
        hours_per_month: Decimal,
        warnings: &mut Vec<CatalogWarning>,
    ) -> ProvisioningResult<CostComponent> {
        ensure_identifier("vm_size", vm_size)?;
        ensure_non_negative("hours_per_month", hours_per_month)?;

        let rate = self.resolve(RateCategory::Compute, vm_size, warnings);
        let amount = in_range(
            "hours_per_month",
            rate.unit_price.checked_mul(hours_per_month),
        )?;
        debug!(vm_size, hourly_rate = %rate.unit_price, %hours_per_month, %amount, "Priced compute");

        Ok(CostComponent::new(CostComponentKind::Compute, amount))
    }

    fn price_storage(
        &self,
        size_gb: Decimal,
        storage_sku: &str,
        warnings: &mut Vec<CatalogWarning>,
    ) -> ProvisioningResult<CostComponent> {
        ensure_identifier("storage_sku", storage_sku)?;
        ensure_non_negative("size_gb", size_gb)?;

        let rate = self.resolve(RateCategory::Storage, storage_sku, warnings);
        let amount = in_range("size_gb", size_gb.checked_mul(rate.unit_price))?;
        debug!(storage_sku, %size_gb, price_per_gb = %rate.unit_price, %amount, "Priced storage");

        Ok(CostComponent::new(CostComponentKind::Storage, amount))
    }

    /// Look up a rate and record a warning when the catalog had no entry
    fn resolve(
        &self,
        category: RateCategory,
        identifier: &str,
        warnings: &mut Vec<CatalogWarning>,
    ) -> ResourceRate {
        let rate = self.catalog.rate_for(category, identifier);

        if rate.is_fallback() {
            let warning = CatalogWarning {
                category,
                identifier: identifier.to_string(),
                fallback_rate: rate.unit_price,
            };
            warn!(%category, identifier, fallback_rate = %rate.unit_price, "Unknown catalog entry, using fallback rate");
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }

        rate
    }
}
