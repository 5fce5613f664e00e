//! Configuration for the VM advisor

use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use domain_provisioning::DEFAULT_HOURS_PER_MONTH;
use rust_decimal::Decimal;
use std::path::PathBuf;

fn default_location() -> String {
    "westeurope".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Pricing catalog file; the built-in reference catalog when unset
    pub catalog_path: Option<PathBuf>,
    /// VM family table file; the built-in reference table when unset
    pub families_path: Option<PathBuf>,
    /// Default subscription stamped on quota reports
    pub subscription_id: Option<String>,
    /// Default location for quota reports
    pub location: String,
    /// Hours per month used when `--hours` is not given
    pub hours_per_month: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            families_path: None,
            subscription_id: None,
            location: default_location(),
            hours_per_month: DEFAULT_HOURS_PER_MONTH,
        }
    }
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            catalog_path: env_optional("VM_ADVISOR_CATALOG").map(PathBuf::from),
            families_path: env_optional("VM_ADVISOR_FAMILIES").map(PathBuf::from),
            subscription_id: env_optional("AZURE_SUBSCRIPTION_ID"),
            location: env_or_default("VM_ADVISOR_LOCATION", &default_location()),
            hours_per_month: env_parse("VM_ADVISOR_HOURS", DEFAULT_HOURS_PER_MONTH)?,
        })
    }
}

impl Config {
    /// Apply command-line values on top of the environment
    pub fn with_overrides(mut self, overrides: &ConfigArgs) -> Self {
        if let Some(path) = &overrides.catalog {
            self.catalog_path = Some(path.clone());
        }
        if let Some(path) = &overrides.families {
            self.families_path = Some(path.clone());
        }
        self
    }
}

/// Global flags shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Pricing catalog JSON (overrides VM_ADVISOR_CATALOG)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// VM family table JSON (overrides VM_ADVISOR_FAMILIES)
    #[arg(long, global = true)]
    pub families: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const VARS: [&str; 5] = [
        "VM_ADVISOR_CATALOG",
        "VM_ADVISOR_FAMILIES",
        "AZURE_SUBSCRIPTION_ID",
        "VM_ADVISOR_LOCATION",
        "VM_ADVISOR_HOURS",
    ];

    #[test]
    fn test_defaults_when_unset() {
        temp_env::with_vars_unset(VARS, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.location, "westeurope");
        });
    }

    #[test]
    fn test_reads_environment() {
        temp_env::with_vars(
            [
                ("VM_ADVISOR_CATALOG", Some("/etc/vm-advisor/catalog.json")),
                ("VM_ADVISOR_FAMILIES", Some("")),
                ("AZURE_SUBSCRIPTION_ID", Some("00000000-0000-0000-0000-000000000001")),
                ("VM_ADVISOR_LOCATION", Some("northeurope")),
                ("VM_ADVISOR_HOURS", Some("365.5")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(
                    config.catalog_path,
                    Some(PathBuf::from("/etc/vm-advisor/catalog.json"))
                );
                // Blank values count as unset
                assert_eq!(config.families_path, None);
                assert_eq!(
                    config.subscription_id.as_deref(),
                    Some("00000000-0000-0000-0000-000000000001")
                );
                assert_eq!(config.location, "northeurope");
                assert_eq!(config.hours_per_month, dec!(365.5));
            },
        );
    }

    #[test]
    fn test_unparsable_hours_is_an_error() {
        temp_env::with_var("VM_ADVISOR_HOURS", Some("all month"), || {
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "VM_ADVISOR_HOURS"));
        });
    }

    #[test]
    fn test_flags_override_environment() {
        temp_env::with_var("VM_ADVISOR_CATALOG", Some("from-env.json"), || {
            let args = ConfigArgs {
                catalog: Some(PathBuf::from("from-flag.json")),
                families: None,
            };
            let config = Config::from_env().unwrap().with_overrides(&args);
            assert_eq!(config.catalog_path, Some(PathBuf::from("from-flag.json")));
            assert_eq!(config.families_path, None);
        });
    }
}
