use rust_decimal::Decimal;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Result type for provisioning decisions
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;

/// Errors that can occur while estimating cost or evaluating quota.
///
/// Only caller contract violations are errors. Catalog misses and unverifiable quota
/// dimensions degrade into the result documents instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisioningError {
    /// A request field is out of range or empty
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ProvisioningError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProvisioningError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ProvisioningError::InvalidInput { field, .. } => field,
        }
    }
}

impl From<ValidationErrors> for ProvisioningError {
    /// Reports the first invalid field in alphabetical order so the message is stable.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, field_errors)) => ProvisioningError::InvalidInput {
                field: field.to_string(),
                reason: field_errors
                    .first()
                    .map(describe)
                    .unwrap_or_else(|| "invalid value".to_string()),
            },
            None => ProvisioningError::invalid("request", errors.to_string()),
        }
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

/// Reject a negative quantity before it reaches any arithmetic
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> ProvisioningResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ProvisioningError::invalid(field, "must not be negative"));
    }
    Ok(())
}

/// Turn an overflowed checked operation into an out-of-range error on `field`
pub(crate) fn in_range<T>(field: &str, value: Option<T>) -> ProvisioningResult<T> {
    value.ok_or_else(|| ProvisioningError::invalid(field, "out of range"))
}

/// Reject an empty or whitespace-only identifier
pub(crate) fn ensure_identifier(field: &str, value: &str) -> ProvisioningResult<()> {
    if value.trim().is_empty() {
        return Err(ProvisioningError::invalid(field, "must not be empty"));
    }
    Ok(())
}
