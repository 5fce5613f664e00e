//! Shared test utilities for the provisioning workspace
//!
//! - `TestDataBuilder`: deterministic identifiers derived from a test name
//! - `assertions`: assertion helpers with context-rich failure messages
//!
//! # Usage
//!
//! ```
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("quota_report_shape");
//! let subscription_id = builder.subscription_id();
//! let location = builder.name("location", "primary");
//! assert!(location.starts_with("test-location-"));
//! ```

use uuid::Uuid;

/// Builder for test data with deterministic values
///
/// The same seed always produces the same identifiers, so report documents built in
/// tests are reproducible.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (seed is the hash of the name)
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic subscription identifier in UUID form
    pub fn subscription_id(&self) -> String {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes).to_string()
    }

    /// Unique name, e.g. `test-location-12345-primary`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    use rust_decimal::Decimal;

    /// Assert two amounts are numerically equal (scale is ignored, `19.2 == 19.20`)
    pub fn assert_amount_eq(actual: Decimal, expected: Decimal, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected amount {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
