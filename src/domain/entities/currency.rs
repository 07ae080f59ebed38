use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::entities::edit::ColumnKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimal_digits: u32,
}

const CURRENCIES: &[Currency] = &[
    Currency { code: "AUD", name: "Australian Dollar", symbol: "$", decimal_digits: 2 },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "$", decimal_digits: 2 },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF", decimal_digits: 2 },
    Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥", decimal_digits: 2 },
    Currency { code: "DKK", name: "Danish Krone", symbol: "kr", decimal_digits: 2 },
    Currency { code: "EUR", name: "Euro", symbol: "€", decimal_digits: 2 },
    Currency { code: "GBP", name: "British Pound Sterling", symbol: "£", decimal_digits: 2 },
    Currency { code: "HKD", name: "Hong Kong Dollar", symbol: "$", decimal_digits: 2 },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥", decimal_digits: 0 },
    Currency { code: "KRW", name: "South Korean Won", symbol: "₩", decimal_digits: 0 },
    Currency { code: "KWD", name: "Kuwaiti Dinar", symbol: "د.ك.‏", decimal_digits: 3 },
    Currency { code: "NOK", name: "Norwegian Krone", symbol: "kr", decimal_digits: 2 },
    Currency { code: "NZD", name: "New Zealand Dollar", symbol: "$", decimal_digits: 2 },
    Currency { code: "SEK", name: "Swedish Krona", symbol: "kr", decimal_digits: 2 },
    Currency { code: "SGD", name: "Singapore Dollar", symbol: "$", decimal_digits: 2 },
    Currency { code: "TWD", name: "New Taiwan Dollar", symbol: "NT$", decimal_digits: 2 },
    Currency { code: "USD", name: "US Dollar", symbol: "$", decimal_digits: 2 },
];

pub fn all() -> &'static [Currency] {
    CURRENCIES
}

pub fn currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CURRENCIES
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code))
}

impl Currency {
    fn scale(&self) -> i64 {
        10_i64.pow(self.decimal_digits)
    }

    /// Renders a minor-unit amount in major units, e.g. `1050` USD as `10.50`.
    pub fn format_amount(&self, minor: i64) -> String {
        if self.decimal_digits == 0 {
            return minor.to_string();
        }
        let scale = self.scale();
        let sign = if minor < 0 { "-" } else { "" };
        let abs = minor.unsigned_abs();
        let whole = abs / scale as u64;
        let frac = abs % scale as u64;
        format!(
            "{sign}{whole}.{frac:0width$}",
            width = self.decimal_digits as usize
        )
    }

    /// Parses a major-unit amount typed by a user into minor units.
    ///
    /// Accepts plain digits with an optional fraction no longer than the
    /// currency allows. Negative, empty and grouped (`1,000`) input is rejected.
    pub fn parse_amount(&self, text: &str) -> Option<i64> {
        let text = text.trim();
        let (whole, frac) = match text.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (text, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if frac.len() > self.decimal_digits as usize {
            return None;
        }

        let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut frac_value: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
        for _ in frac.len()..self.decimal_digits as usize {
            frac_value = frac_value.checked_mul(10)?;
        }

        whole_value.checked_mul(self.scale())?.checked_add(frac_value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// Visible currency columns, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyFields {
    fields: BTreeSet<ColumnKey>,
}

impl CurrencyFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codes<I, S>(codes: I) -> Result<Self, UnknownCurrency>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Self::new();
        fields.set(codes)?;
        Ok(fields)
    }

    /// Replaces the whole field set. Leaves it untouched on error.
    pub fn set<I, S>(&mut self, codes: I) -> Result<(), UnknownCurrency>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = BTreeSet::new();
        for code in codes {
            let code = code.as_ref();
            let known = currency(code).ok_or_else(|| UnknownCurrency(code.to_string()))?;
            next.insert(ColumnKey::new(known.code));
        }
        self.fields = next;
        Ok(())
    }

    /// Returns whether the field is visible after the toggle.
    pub fn toggle(&mut self, code: &str) -> Result<bool, UnknownCurrency> {
        let known = currency(code).ok_or_else(|| UnknownCurrency(code.to_string()))?;
        let key = ColumnKey::new(known.code);
        if self.fields.remove(&key) {
            Ok(false)
        } else {
            self.fields.insert(key);
            Ok(true)
        }
    }

    pub fn contains(&self, column: &ColumnKey) -> bool {
        self.fields.contains(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnKey> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
