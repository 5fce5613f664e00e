//! Human-readable summaries printed to stdout

use domain_provisioning::{
    CostBreakdown, CostReport, QuotaIncreaseRequest, QuotaReportDocument, QuotaStatus,
    format_amount,
};
use std::fmt;

const RULE: &str = "============================================================";

/// Component table and totals of a cost report
pub struct CostSummary<'a>(pub &'a CostReport);

impl fmt::Display for CostSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let currency = report.currency;
        let breakdown = &report.cost_breakdown;

        writeln!(f, "{RULE}")?;
        writeln!(f, "Cost Estimate: {} ({})", report.vm_size, report.region)?;
        writeln!(f, "{RULE}")?;
        for (label, amount) in [
            ("Compute", breakdown.compute),
            ("OS disk", breakdown.os_disk),
            ("Data disk", breakdown.data_disk),
            ("Backup", breakdown.backup),
            ("Network", breakdown.network),
            ("Monthly", report.total_monthly_cost),
            ("Annual", report.total_annual_cost),
        ] {
            writeln!(f, "  {:<12}{:>14}", label, format_amount(amount, currency))?;
        }
        if report.configuration.quantity > 1 {
            writeln!(f, "  (for {} VMs)", report.configuration.quantity)?;
        }
        for warning in &report.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}

/// Ranked sizes, cheapest first
pub struct ComparisonSummary<'a>(pub &'a [CostBreakdown]);

impl fmt::Display for ComparisonSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "VM Size Comparison (cheapest first)")?;
        writeln!(f, "{RULE}")?;
        for (position, breakdown) in self.0.iter().enumerate() {
            let fallback = if breakdown.used_fallback_rates() {
                "  *fallback rate"
            } else {
                ""
            };
            writeln!(
                f,
                "  {:>2}. {:<22}{:>14}/mo{}",
                position + 1,
                breakdown.vm_size,
                format_amount(breakdown.total_monthly(), breakdown.currency),
                fallback
            )?;
        }
        Ok(())
    }
}

fn status_label(status: QuotaStatus) -> &'static str {
    match status {
        QuotaStatus::Sufficient => "OK",
        QuotaStatus::Insufficient => "INSUFFICIENT",
        QuotaStatus::Unknown => "UNKNOWN",
    }
}

/// One line per quota dimension plus the overall status
pub struct QuotaSummary<'a>(pub &'a QuotaReportDocument);

impl fmt::Display for QuotaSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Quota Check: {} x{} in {}",
            report.vm_size, report.quantity, report.location
        )?;
        writeln!(f, "{RULE}")?;
        if report.hardware_facts_missing {
            writeln!(
                f,
                "  {} is not offered in {}; quota cannot be verified",
                report.vm_size, report.location
            )?;
        }

        let sections = std::iter::once(&report.quotas)
            .chain(report.network.as_ref().map(|network| &network.quotas));
        for quotas in sections {
            for (_, dimension) in quotas.iter() {
                let label = status_label(dimension.status);
                match dimension.available {
                    Some(available) => writeln!(
                        f,
                        "  [{}] {}: {} available, {} required",
                        label, dimension.name, available, dimension.required
                    )?,
                    None => writeln!(f, "  [{}] {}: no usage data", label, dimension.name)?,
                }
            }
        }
        writeln!(f, "  Overall: {}", status_label(report.overall_status))
    }
}

/// Suggested quota increases, one per line
pub struct IncreaseRequestsSummary<'a>(pub &'a [QuotaIncreaseRequest]);

impl fmt::Display for IncreaseRequestsSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for draft in self.0 {
            writeln!(
                f,
                "  Suggested increase: {} in {} from {} to {}",
                draft.quota_name, draft.location, draft.current_limit, draft.requested_limit
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain_provisioning::{
        CostEstimator, PricingCatalog, QuotaEvaluator, QuotaScope, ReportAssembler, UsageRecord,
        VmRequestSpec, draft_increase_requests, rank,
    };

    #[test]
    fn test_cost_summary_shows_rounded_totals() {
        let catalog = PricingCatalog::reference();
        let spec = VmRequestSpec::new("Standard_D2s_v3");
        let breakdown = CostEstimator::new(&catalog).estimate_total(&spec).unwrap();
        let report = ReportAssembler::new(Utc::now()).cost_report(&spec, &breakdown, &catalog);

        let text = CostSummary(&report).to_string();
        assert!(text.contains("Standard_D2s_v3"));
        assert!(text.contains("$82.49"));
        assert!(text.contains("$109.96"));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn test_comparison_marks_fallback_rates() {
        let catalog = PricingCatalog::reference();
        let estimator = CostEstimator::new(&catalog);
        let ranked = rank(vec![
            estimator
                .estimate_total(&VmRequestSpec::new("Standard_NC6"))
                .unwrap(),
            estimator
                .estimate_total(&VmRequestSpec::new("Standard_B2s"))
                .unwrap(),
        ]);

        let text = ComparisonSummary(&ranked).to_string();
        let lines: Vec<_> = text.lines().filter(|l| l.contains("/mo")).collect();
        assert!(lines[0].contains("Standard_B2s"));
        assert!(lines[1].contains("*fallback rate"));
    }

    #[test]
    fn test_quota_summary_lists_unknown_dimensions() {
        let compute = QuotaEvaluator::default()
            .evaluate(
                &[UsageRecord::new("cores", 0, 10)],
                "Standard_B2s",
                2,
                4096,
                1,
            )
            .unwrap();
        let scope = QuotaScope {
            subscription_id: None,
            location: "westeurope".to_string(),
        };
        let document =
            ReportAssembler::new(Utc::now()).quota_report(&scope, "Standard_B2s", 1, &compute, None);

        let text = QuotaSummary(&document).to_string();
        assert!(text.contains("[OK] Total Regional vCPUs: 10 available, 2 required"));
        assert!(text.contains("[UNKNOWN] VM Family (standardBSFamily): no usage data"));
        assert!(text.contains("Overall: OK"));
    }

    #[test]
    fn test_increase_requests_one_line_each() {
        let compute = QuotaEvaluator::default()
            .evaluate(
                &[
                    UsageRecord::new("cores", 18, 20),
                    UsageRecord::new("standardDSv3Family", 0, 100),
                ],
                "Standard_D4s_v3",
                4,
                16384,
                1,
            )
            .unwrap();
        let drafts = draft_increase_requests(&compute, "westeurope", "Batch workers");

        let text = IncreaseRequestsSummary(&drafts).to_string();
        assert_eq!(
            text,
            "  Suggested increase: cores in westeurope from 20 to 22\n"
        );
        assert!(IncreaseRequestsSummary(&[]).to_string().is_empty());
    }
}
