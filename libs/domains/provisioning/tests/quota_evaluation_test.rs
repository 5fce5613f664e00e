//! Integration tests for quota evaluation
//!
//! Covers the sufficiency rule, unverifiable dimensions, missing hardware facts,
//! network dimensions and increase drafting.

use domain_provisioning::quota::{FAMILY_CORES_KEY, TOTAL_CORES_KEY};
use domain_provisioning::*;
use test_utils::assertions::*;

fn d4_facts() -> HardwareFacts {
    HardwareFacts {
        cores: 4,
        memory_mb: 16384,
        max_data_disks: Some(8),
    }
}

#[test]
fn test_shortfall_on_regional_cores() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 10, 20),
        UsageRecord::new("standardDSv3Family", 0, 50),
    ];

    // 15 cores needed (cores 5 x quantity 3), 10 available
    let report = evaluator
        .evaluate(&usage, "Standard_D4s_v3", 5, 8192, 3)
        .unwrap();

    let total = assert_some(report.verdict(TOTAL_CORES_KEY), "total cores verdict");
    assert_eq!(total.available, Some(10));
    assert_eq!(total.required, 15);
    assert_eq!(total.status, QuotaStatus::Insufficient);

    let family = assert_some(report.verdict(FAMILY_CORES_KEY), "family verdict");
    assert_eq!(family.dimension_name, "standardDSv3Family");
    assert_eq!(family.status, QuotaStatus::Sufficient);

    assert_eq!(report.overall_status(), QuotaStatus::Insufficient);
    assert!(!report.overall_sufficient());
}

#[test]
fn test_all_dimensions_sufficient() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 4, 100),
        UsageRecord::new("standardESv3Family", 8, 40),
    ];

    let report = evaluator
        .evaluate_with_facts(&usage, "Standard_E8s_v3", Some(&d4_facts()), 2)
        .unwrap();

    let requirement = assert_some(report.requirement.as_ref(), "requirement");
    assert_eq!(requirement.cores_required, 8);
    assert_eq!(requirement.memory_required_mb, 32768);
    assert_eq!(report.family.as_deref(), Some("standardESv3Family"));
    assert_eq!(report.overall_status(), QuotaStatus::Sufficient);
    assert!(report.unverified_dimensions().is_empty());
}

#[test]
fn test_missing_usage_record_is_never_sufficient() {
    let evaluator = QuotaEvaluator::default();

    let report = evaluator
        .evaluate(&[], "Standard_D2s_v3", 2, 8192, 1)
        .unwrap();

    for verdict in &report.verdicts {
        assert_eq!(verdict.status, QuotaStatus::Unknown);
        assert_eq!(verdict.sufficient(), None);
        assert_eq!(verdict.current, None);
    }
    assert_eq!(report.overall_status(), QuotaStatus::Unknown);
    assert!(!report.overall_sufficient());
    assert_eq!(
        report.unverified_dimensions(),
        vec![TOTAL_CORES_KEY.to_string(), FAMILY_CORES_KEY.to_string()]
    );
}

#[test]
fn test_partial_snapshot_still_reports_shortfall() {
    let evaluator = QuotaEvaluator::default();
    // Family record missing, regional total exhausted
    let usage = vec![UsageRecord::new("cores", 20, 20)];

    let report = evaluator
        .evaluate(&usage, "Standard_B2s", 2, 4096, 1)
        .unwrap();

    assert_eq!(report.overall_status(), QuotaStatus::Insufficient);
    assert_eq!(
        report.unverified_dimensions(),
        vec![FAMILY_CORES_KEY.to_string()]
    );
}

#[test]
fn test_over_committed_dimension_has_negative_headroom() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 25, 20),
        UsageRecord::new("standardFSv2Family", 0, 10),
    ];

    let report = evaluator
        .evaluate(&usage, "Standard_F2s_v2", 2, 4096, 1)
        .unwrap();

    let total = assert_some(report.verdict(TOTAL_CORES_KEY), "total cores verdict");
    assert_eq!(total.available, Some(-5));
    assert_eq!(total.shortfall(), Some(7));
}

#[test]
fn test_extreme_provider_values_do_not_overflow() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", -1, i64::MAX),
        UsageRecord::new("standardDSv3Family", i64::MAX, i64::MIN),
    ];

    let report = evaluator
        .evaluate(&usage, "Standard_D2s_v3", 2, 8192, 1)
        .unwrap();

    let total = assert_some(report.verdict(TOTAL_CORES_KEY), "total cores verdict");
    assert_eq!(total.available, Some(i64::MAX));
    assert_eq!(total.status, QuotaStatus::Sufficient);

    let family = assert_some(report.verdict(FAMILY_CORES_KEY), "family cores verdict");
    assert_eq!(family.available, Some(i64::MIN));
    assert_eq!(family.shortfall(), Some(i64::MAX));
    assert_eq!(report.overall_status(), QuotaStatus::Insufficient);

    let drafts = draft_increase_requests(&report, "westeurope", "Capacity");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].requested_limit, i64::MAX);
}

#[test]
fn test_unknown_hardware_facts_make_report_unknown() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 0, 1000),
        UsageRecord::new("standardDSv3Family", 0, 1000),
    ];

    let report = evaluator
        .evaluate_with_facts(&usage, "Standard_Imaginary", None, 1)
        .unwrap();

    assert!(report.hardware_facts_missing);
    assert!(report.requirement.is_none());
    assert_eq!(report.overall_status(), QuotaStatus::Unknown);
    assert_eq!(report.verdicts.len(), 2);
}

#[test]
fn test_invalid_quota_inputs() {
    let evaluator = QuotaEvaluator::default();

    let err = evaluator.evaluate(&[], "", 2, 4096, 1).unwrap_err();
    assert_eq!(err.field(), "vm_size");

    let err = evaluator
        .evaluate_with_facts(&[], "Standard_B2s", None, 0)
        .unwrap_err();
    assert_eq!(err.field(), "quantity");
}

#[test]
fn test_first_record_wins_for_repeated_quota_name() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 0, 100),
        UsageRecord::new("cores", 99, 100),
        UsageRecord::new("standardDSv3Family", 0, 100),
    ];

    let report = evaluator
        .evaluate(&usage, "Standard_D8s_v3", 8, 32768, 1)
        .unwrap();

    let total = assert_some(report.verdict(TOTAL_CORES_KEY), "total cores verdict");
    assert_eq!(total.current, Some(0));
    assert_eq!(report.overall_status(), QuotaStatus::Sufficient);
}

#[test]
fn test_network_dimensions() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("PublicIPAddresses", 9, 10),
        UsageRecord::new("NetworkInterfaces", 100, 1000),
    ];

    let report = evaluator.evaluate_network(&usage, 2);

    assert_eq!(report.verdicts.len(), 2);
    let ips = assert_some(report.verdict("PublicIPAddresses"), "public ip verdict");
    assert_eq!(ips.status, QuotaStatus::Insufficient);
    let nics = assert_some(report.verdict("NetworkInterfaces"), "nic verdict");
    assert_eq!(nics.status, QuotaStatus::Sufficient);
    assert_eq!(report.overall_status(), QuotaStatus::Insufficient);

    let empty = evaluator.evaluate_network(&[], 1);
    assert_eq!(empty.overall_status(), QuotaStatus::Unknown);
}

#[test]
fn test_increase_drafts_make_dimensions_sufficient() {
    let evaluator = QuotaEvaluator::default();
    let usage = vec![
        UsageRecord::new("cores", 18, 20),
        UsageRecord::new("standardDSv3Family", 10, 12),
    ];

    let report = evaluator
        .evaluate(&usage, "Standard_D4s_v3", 4, 16384, 2)
        .unwrap();
    let drafts = draft_increase_requests(&report, "westeurope", "Batch workers");

    assert_eq!(drafts.len(), 2);
    for (draft, verdict) in drafts.iter().zip(report.insufficient()) {
        assert_eq!(draft.quota_name, verdict.dimension_name);
        assert_eq!(draft.location, "westeurope");
        assert_eq!(draft.status, IncreaseRequestStatus::Pending);

        let current = assert_some(verdict.current, "current usage");
        let raised = UsageRecord::new(draft.quota_name.clone(), current, draft.requested_limit);
        assert!(raised.available() >= verdict.required);
    }
    assert_eq!(drafts[0].requested_limit, 26);
    assert_eq!(drafts[1].requested_limit, 18);
}

#[test]
fn test_no_drafts_for_unknown_dimensions() {
    let evaluator = QuotaEvaluator::default();
    let report = evaluator
        .evaluate(&[], "Standard_D4s_v3", 4, 16384, 1)
        .unwrap();

    assert!(draft_increase_requests(&report, "westeurope", "n/a").is_empty());
}
