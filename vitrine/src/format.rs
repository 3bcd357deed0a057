//! Currency formatting

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Maps a numeric amount to a display string.
pub trait PriceFormatter: Send + Sync {
    fn format_price(&self, amount: Decimal) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Self::PtBr => "pt-BR",
            Self::EnUs => "en-US",
        }
    }

    fn group_separator(self) -> char {
        match self {
            Self::PtBr => '.',
            Self::EnUs => ',',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Self::PtBr => ',',
            Self::EnUs => '.',
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt-BR" | "pt_BR" => Ok(Self::PtBr),
            "en-US" | "en_US" => Ok(Self::EnUs),
            other => Err(ConfigError::UnknownLocale(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
}

impl Currency {
    fn symbol(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Brl, _) => "R$",
            (Self::Usd, Locale::PtBr) => "US$",
            (Self::Usd, Locale::EnUs) => "$",
        }
    }
}

/// Locale-aware currency style.
///
/// The default is `{ locale: "pt-BR", currency: "BRL", min_fraction_digits: 2 }`.
///
/// Amounts are rounded half away from zero to `min_fraction_digits`. In `pt-BR` the symbol is
/// followed by a plain space: `R$ 1.234,50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub locale: Locale,
    pub currency: Currency,
    pub min_fraction_digits: u32,
}

impl CurrencyFormat {
    pub fn brl() -> Self {
        Self {
            locale: Locale::PtBr,
            currency: Currency::Brl,
            min_fraction_digits: 2,
        }
    }

    pub fn usd() -> Self {
        Self {
            locale: Locale::EnUs,
            currency: Currency::Usd,
            min_fraction_digits: 2,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_min_fraction_digits(mut self, digits: u32) -> Self {
        self.min_fraction_digits = digits;
        self
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::brl()
    }
}

impl PriceFormatter for CurrencyFormat {
    fn format_price(&self, amount: Decimal) -> String {
        let dp = self.min_fraction_digits;
        let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        let digits = format!("{:.*}", dp as usize, rounded.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let mut out = String::with_capacity(digits.len() + 8);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(self.currency.symbol(self.locale));
        if self.locale == Locale::PtBr {
            out.push(' ');
        }
        push_grouped(&mut out, int_part, self.locale.group_separator());
        if let Some(frac) = frac_part {
            out.push(self.locale.decimal_separator());
            out.push_str(frac);
        }
        out
    }
}

fn push_grouped(out: &mut String, int_part: &str, separator: char) {
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}
