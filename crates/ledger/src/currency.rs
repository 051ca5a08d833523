use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like currency code used by capital accounts and ledger entries.
///
/// The marketplace is effectively mono-currency (default `EGP`), but the
/// ledger models currency explicitly so stored rows stay self-describing.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`MoneyCents`]). `minor_units()` returns the number of decimal digits used
/// when converting between major units (human input/output, e.g. `10.50 EGP`)
/// and minor units (stored integers, e.g. `1050`).
///
/// [`MoneyCents`]: crate::MoneyCents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Egp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Egp => "EGP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    ///
    /// Example: EGP uses 2 fraction digits (piasters).
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Egp => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EGP" => Ok(Currency::Egp),
            other => Err(LedgerError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
