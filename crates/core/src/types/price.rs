//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as bare JSON numbers. [`Price`] pairs an amount
//! with the storefront's display currency for rendering.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "R$ 1.139,90", "$19.99").
    ///
    /// Reais follow the storefront's pt-BR locale: `.` groups thousands and
    /// `,` separates cents.
    #[must_use]
    pub fn display(&self) -> String {
        let amount = self.amount.round_dp(2);
        match self.currency_code {
            CurrencyCode::BRL => format!("R$ {}", pt_br_number(amount)),
            other => format!("{}{amount:.2}", other.symbol()),
        }
    }
}

/// `1234.5` as `1.234,50`.
fn pt_br_number(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (units, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{cents}")
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol used when rendering prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

/// Returned when a currency code is not one of the supported ISO codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display_brl() {
        let price = Price::new(Decimal::new(13990, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 139,90");
    }

    #[test]
    fn test_price_display_brl_groups_thousands() {
        let price = Price::new(Decimal::new(123_456_789, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 1.234.567,89");

        let price = Price::new(Decimal::new(100_000, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 1.000,00");

        let price = Price::new(Decimal::ZERO, CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 0,00");
    }

    #[test]
    fn test_price_display_pads_whole_amounts() {
        let price = Price::new(Decimal::new(10, 0), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$10.00");
    }

    #[test]
    fn test_price_display_rounds_to_cents() {
        let price = Price::new(Decimal::new(19_995, 3), CurrencyCode::GBP);
        assert_eq!(price.display(), "£20.00");
    }

    #[test]
    fn test_currency_code_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(" EUR ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_code_default_is_real() {
        assert_eq!(CurrencyCode::default().code(), "BRL");
    }
}
