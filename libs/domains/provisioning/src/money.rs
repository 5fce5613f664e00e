//! Currency presentation helpers.
//!
//! Amounts stay exact [`Decimal`] values through every computation. Rounding to
//! minor units happens here, and only when a document is serialized or printed.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// Months used to annualize a monthly amount
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Currency minor-unit precision (cents)
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Currency enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }
}

/// Round an amount to currency precision, half away from zero
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display, e.g. `$101.69`
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    format!(
        "{}{:.2}",
        currency.symbol(),
        round_currency(amount)
    )
}

/// Serialize an amount rounded to currency precision as a JSON number.
///
/// Goes through the decimal string so the number is the closest `f64` to the rounded
/// amount, e.g. `1220.28` and never `1220.2800000000002`.
pub fn serialize_rounded<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rounded: f64 = round_currency(*amount)
        .to_string()
        .parse()
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_f64(rounded)
}
