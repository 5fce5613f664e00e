//! VM Advisor
//!
//! Answers two questions about a proposed virtual machine before it is provisioned:
//! what it will cost per month, and whether the target location has the quota to run it.
//! Summaries go to stdout, structured reports to `--output`, logs to stderr.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_provisioning::{
    CostEstimator, QuotaEvaluator, QuotaReportDocument, QuotaScope, ReportAssembler,
    VmRequestSpec, compare_sizes, draft_increase_requests,
};
use eyre::{Result, WrapErr};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod config;
mod inputs;
mod summary;

use config::{Config, ConfigArgs};
use summary::{ComparisonSummary, CostSummary, IncreaseRequestsSummary, QuotaSummary};

#[derive(Parser)]
#[command(name = "vm-advisor")]
#[command(about = "Estimate VM costs and check quota before provisioning")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the monthly cost of a VM configuration
    Estimate {
        #[arg(long)]
        vm_size: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Write the cost report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank several VM sizes by monthly cost for the same configuration
    Compare {
        /// Candidate sizes, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        vm_sizes: Vec<String>,

        #[command(flatten)]
        request: RequestArgs,

        /// Write the ranked breakdowns as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check quota sufficiency; exits with status 1 unless quota is verified sufficient
    Quota {
        #[arg(long)]
        vm_size: String,

        /// Number of VMs
        #[arg(long, default_value_t = 1)]
        quantity: u32,

        #[command(flatten)]
        quota: QuotaArgs,

        /// Write the quota report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combined cost estimate and quota check
    Report {
        #[arg(long)]
        vm_size: String,

        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        quota: QuotaArgs,

        /// Write the combined report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Configuration of the VM being priced
#[derive(Debug, Clone, Args)]
struct RequestArgs {
    /// OS disk size in GB
    #[arg(long, default_value = "128")]
    os_disk: Decimal,

    /// Data disk size in GB
    #[arg(long, default_value = "0")]
    data_disk: Decimal,

    /// Managed disk SKU
    #[arg(long, default_value = "Premium_LRS")]
    storage_type: String,

    /// Include backup protection
    #[arg(long)]
    backup: bool,

    /// Attach a public IP
    #[arg(long)]
    public_ip: bool,

    /// Monthly outbound data per VM in GB
    #[arg(long, default_value = "100")]
    outbound_gb: Decimal,

    /// Hours the VM runs per month (overrides VM_ADVISOR_HOURS, default 730)
    #[arg(long)]
    hours: Option<Decimal>,

    /// Number of VMs
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

impl RequestArgs {
    fn to_spec(&self, vm_size: &str, default_hours: Decimal) -> VmRequestSpec {
        VmRequestSpec {
            vm_size: vm_size.to_string(),
            os_disk_gb: self.os_disk,
            data_disk_gb: self.data_disk,
            storage_sku: self.storage_type.clone(),
            backup_enabled: self.backup,
            public_ip_enabled: self.public_ip,
            outbound_data_gb: self.outbound_gb,
            hours_per_month: self.hours.unwrap_or(default_hours),
            quantity: self.quantity,
        }
    }
}

/// Inputs of a quota check
#[derive(Debug, Clone, Args)]
struct QuotaArgs {
    /// Compute usage snapshot for the location (JSON)
    #[arg(long)]
    usage: PathBuf,

    /// Hardware facts of the sizes offered in the location (JSON)
    #[arg(long)]
    hardware: PathBuf,

    /// Network usage snapshot (JSON); adds a network section to the report
    #[arg(long)]
    network_usage: Option<PathBuf>,

    /// Network resources needed per dimension; defaults to one per VM
    #[arg(long)]
    network_required: Option<u32>,

    /// Location to check (overrides VM_ADVISOR_LOCATION)
    #[arg(long)]
    location: Option<String>,

    /// Subscription stamped on the report (overrides AZURE_SUBSCRIPTION_ID)
    #[arg(long)]
    subscription_id: Option<String>,

    /// Justification used when drafting quota increases
    #[arg(long, default_value = "Capacity for planned VM deployment")]
    justification: String,
}

fn main() -> Result<ExitCode> {
    install_color_eyre();

    let cli = Cli::parse();
    let environment = Environment::from_env();
    init_tracing(&environment);

    let config = Config::from_env()?.with_overrides(&cli.config);
    let assembler = ReportAssembler::new(Utc::now());

    match cli.command {
        Commands::Estimate {
            vm_size,
            request,
            output,
        } => {
            let catalog = inputs::load_catalog(config.catalog_path.as_deref())?;
            let spec = request.to_spec(&vm_size, config.hours_per_month);
            let breakdown = CostEstimator::new(&catalog)
                .estimate_total(&spec)
                .wrap_err("Cost estimate failed")?;
            let report = assembler.cost_report(&spec, &breakdown, &catalog);

            print!("{}", CostSummary(&report));
            if let Some(path) = output {
                inputs::write_json(&path, &report)?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compare {
            vm_sizes,
            request,
            output,
        } => {
            let catalog = inputs::load_catalog(config.catalog_path.as_deref())?;
            // Each candidate replaces the size of the base request
            let base = request.to_spec(
                vm_sizes.first().map(String::as_str).unwrap_or_default(),
                config.hours_per_month,
            );
            let ranked = compare_sizes(&CostEstimator::new(&catalog), &base, &vm_sizes)
                .wrap_err("Size comparison failed")?;

            print!("{}", ComparisonSummary(&ranked));
            if let Some(path) = output {
                inputs::write_json(&path, &ranked)?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Quota {
            vm_size,
            quantity,
            quota,
            output,
        } => {
            let document = check_quota(&config, &assembler, &vm_size, quantity, &quota)?;

            if let Some(path) = output {
                inputs::write_json(&path, &document)?;
            }
            if document.overall_sufficient {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Report {
            vm_size,
            request,
            quota,
            output,
        } => {
            let catalog = inputs::load_catalog(config.catalog_path.as_deref())?;
            let spec = request.to_spec(&vm_size, config.hours_per_month);
            let breakdown = CostEstimator::new(&catalog)
                .estimate_total(&spec)
                .wrap_err("Cost estimate failed")?;
            let cost = assembler.cost_report(&spec, &breakdown, &catalog);
            print!("{}", CostSummary(&cost));

            let quota = check_quota(&config, &assembler, &vm_size, spec.quantity, &quota)?;
            let report = assembler.combine(&spec, Some(cost), Some(quota));

            info!(
                vm_size = %spec.vm_size,
                quota_cleared = report.quota_cleared(),
                "Provisioning report assembled"
            );
            if let Some(path) = output {
                inputs::write_json(&path, &report)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Evaluate compute (and optionally network) quota and print the summary
fn check_quota(
    config: &Config,
    assembler: &ReportAssembler,
    vm_size: &str,
    quantity: u32,
    args: &QuotaArgs,
) -> Result<QuotaReportDocument> {
    let families = inputs::load_families(config.families_path.as_deref())?;
    let evaluator = QuotaEvaluator::new(families);
    let usage = inputs::load_usage(&args.usage)?;
    let hardware = inputs::load_hardware(&args.hardware)?;

    let scope = QuotaScope {
        subscription_id: args
            .subscription_id
            .clone()
            .or_else(|| config.subscription_id.clone()),
        location: args
            .location
            .clone()
            .unwrap_or_else(|| config.location.clone()),
    };

    let compute = evaluator
        .evaluate_with_facts(&usage, vm_size, hardware.get(vm_size), quantity)
        .wrap_err("Quota evaluation failed")?;

    let network = match &args.network_usage {
        Some(path) => {
            let required = args.network_required.unwrap_or(quantity);
            let records = inputs::load_usage(path)?;
            Some((evaluator.evaluate_network(&records, required), required))
        }
        None => None,
    };

    let document = assembler.quota_report(
        &scope,
        vm_size,
        quantity,
        &compute,
        network.as_ref().map(|(report, required)| (report, *required)),
    );
    print!("{}", QuotaSummary(&document));

    let mut drafts = draft_increase_requests(&compute, &scope.location, &args.justification);
    if let Some((report, _)) = &network {
        drafts.extend(draft_increase_requests(
            report,
            &scope.location,
            &args.justification,
        ));
    }
    print!("{}", IncreaseRequestsSummary(&drafts));

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_provisioning::DEFAULT_HOURS_PER_MONTH;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_estimate_defaults_match_request_defaults() {
        let cli = Cli::try_parse_from(["vm-advisor", "estimate", "--vm-size", "Standard_D2s_v3"])
            .unwrap();
        let Commands::Estimate {
            vm_size, request, ..
        } = cli.command
        else {
            panic!("expected estimate");
        };

        assert_eq!(request.hours, None);
        assert_eq!(
            request.to_spec(&vm_size, DEFAULT_HOURS_PER_MONTH),
            VmRequestSpec::new("Standard_D2s_v3")
        );
        assert_eq!(
            request.to_spec(&vm_size, dec!(365)).hours_per_month,
            dec!(365)
        );
    }

    #[test]
    fn test_compare_parses_size_list() {
        let cli = Cli::try_parse_from([
            "vm-advisor",
            "compare",
            "--vm-sizes",
            "Standard_B2s,Standard_D2s_v3",
            "--backup",
            "--hours",
            "200.5",
        ])
        .unwrap();
        let Commands::Compare {
            vm_sizes, request, ..
        } = cli.command
        else {
            panic!("expected compare");
        };

        assert_eq!(vm_sizes, vec!["Standard_B2s", "Standard_D2s_v3"]);
        assert!(request.backup);
        assert_eq!(request.hours, Some(dec!(200.5)));
        assert_eq!(request.to_spec("Standard_B2s", dec!(365)).hours_per_month, dec!(200.5));
    }

    #[test]
    fn test_global_catalog_flag() {
        let cli = Cli::try_parse_from([
            "vm-advisor",
            "estimate",
            "--vm-size",
            "Standard_B2s",
            "--catalog",
            "prices.json",
        ])
        .unwrap();
        assert_eq!(cli.config.catalog, Some(PathBuf::from("prices.json")));
    }

    #[test]
    fn test_quota_requires_inputs() {
        assert!(Cli::try_parse_from(["vm-advisor", "quota", "--vm-size", "Standard_B2s"]).is_err());
    }
}
