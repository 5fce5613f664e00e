//! Ordering of cost estimates.

use tracing::debug;

use crate::error::ProvisioningResult;
use crate::estimator::CostEstimator;
use crate::models::{CostBreakdown, VmRequestSpec};

/// Sort breakdowns by exact monthly total, cheapest first.
///
/// The sort is stable: breakdowns with equal totals keep their input order, so ranking
/// the same inputs always yields the same output.
pub fn rank(mut breakdowns: Vec<CostBreakdown>) -> Vec<CostBreakdown> {
    breakdowns.sort_by_cached_key(|breakdown| breakdown.total_monthly());
    breakdowns
}

/// Estimate `base` once per candidate size and rank the results
pub fn compare_sizes<S: AsRef<str>>(
    estimator: &CostEstimator<'_>,
    base: &VmRequestSpec,
    vm_sizes: &[S],
) -> ProvisioningResult<Vec<CostBreakdown>> {
    let breakdowns = vm_sizes
        .iter()
        .map(|size| estimator.estimate_total(&base.with_vm_size(size.as_ref())))
        .collect::<ProvisioningResult<Vec<_>>>()?;

    let ranked = rank(breakdowns);
    debug!(
        candidates = ranked.len(),
        cheapest = ranked.first().map(|b| b.vm_size.as_str()),
        "Ranked VM sizes"
    );

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PricingCatalog;
    use crate::money::Currency;
    use crate::models::{CostComponent, CostComponentKind};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn breakdown(vm_size: &str, amount: Decimal) -> CostBreakdown {
        CostBreakdown {
            vm_size: vm_size.to_string(),
            currency: Currency::Usd,
            components: vec![CostComponent::new(CostComponentKind::Compute, amount)],
            warnings: vec![],
        }
    }

    #[test]
    fn test_rank_ascending_and_stable() {
        let input = vec![
            breakdown("c", dec!(30)),
            breakdown("a1", dec!(10)),
            breakdown("b", dec!(20)),
            breakdown("a2", dec!(10.00)),
        ];

        let ranked = rank(input.clone());
        let order: Vec<_> = ranked.iter().map(|b| b.vm_size.as_str()).collect();
        assert_eq!(order, vec!["a1", "a2", "b", "c"]);

        assert_eq!(rank(input.clone()), rank(input));
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn test_compare_sizes_orders_by_total() {
        let catalog = PricingCatalog::reference();
        let estimator = CostEstimator::new(&catalog);
        let base = VmRequestSpec::new("ignored");

        let ranked = compare_sizes(
            &estimator,
            &base,
            &["Standard_D4s_v3", "Standard_B2s", "Standard_F2s_v2"],
        )
        .unwrap();

        let order: Vec<_> = ranked.iter().map(|b| b.vm_size.as_str()).collect();
        assert_eq!(order, vec!["Standard_B2s", "Standard_F2s_v2", "Standard_D4s_v3"]);
    }

    #[test]
    fn test_compare_sizes_rejects_blank_candidate() {
        let catalog = PricingCatalog::reference();
        let estimator = CostEstimator::new(&catalog);
        let base = VmRequestSpec::new("Standard_B2s");

        let err = compare_sizes(&estimator, &base, &["Standard_B2s", ""]).unwrap_err();
        assert_eq!(err.field(), "vm_size");
    }
}
