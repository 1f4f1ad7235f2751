//! Locale-aware formatting of already-resolved values
//!
//! Month and date names come from chrono's locale tables; number grouping
//! and currency placement follow the conventions of the selected locale.
//! All instants are rendered in UTC.

use chrono::{DateTime, Locale, Utc};
use rust_decimal::Decimal;
use txview_config::{Config, DisplayLocale};

use crate::models::{BillingAmount, Transaction};

/// Title shown when a transaction has neither a localized nor a raw title
pub const FALLBACK_TITLE: &str = "Transaction";

/// Category name shown when a transaction has no category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Formatter for labels shown by the render surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    locale: DisplayLocale,
    default_currency: String,
    decimal_places: u32,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DisplayLocale::default())
    }
}

impl Formatter {
    /// Create a formatter with DKK and two decimals
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            locale,
            default_currency: "DKK".to_string(),
            decimal_places: 2,
        }
    }

    /// Create a formatter from the display and currency sections
    pub fn from_config(config: &Config) -> Self {
        Self {
            locale: config.display.locale,
            default_currency: config.currency.default_currency.clone(),
            decimal_places: config.currency.decimal_places,
        }
    }

    pub fn locale(&self) -> DisplayLocale {
        self.locale
    }

    fn chrono_locale(&self) -> Locale {
        match self.locale {
            DisplayLocale::Danish => Locale::da_DK,
            DisplayLocale::English => Locale::en_US,
        }
    }

    /// Month and year, e.g. `januar 2024` or `January 2024`
    pub fn month_label(&self, time: &DateTime<Utc>) -> String {
        time.format_localized("%B %Y", self.chrono_locale()).to_string()
    }

    /// Short timestamp for list rows
    pub fn time_label(&self, time: &DateTime<Utc>) -> String {
        let pattern = match self.locale {
            DisplayLocale::Danish => "%d.%m.%Y %H.%M",
            DisplayLocale::English => "%m/%d/%Y, %I:%M %p",
        };
        time.format_localized(pattern, self.chrono_locale()).to_string()
    }

    /// Long timestamp for the detail view
    pub fn date_label(&self, time: &DateTime<Utc>) -> String {
        let pattern = match self.locale {
            DisplayLocale::Danish => "%d. %b %Y kl. %H.%M",
            DisplayLocale::English => "%b %d, %Y, %I:%M %p",
        };
        time.format_localized(pattern, self.chrono_locale()).to_string()
    }

    /// Amount with locale grouping and currency placement
    pub fn amount_label(&self, amount: &BillingAmount) -> String {
        let currency = if amount.currency.is_empty() {
            self.default_currency.as_str()
        } else {
            amount.currency.as_str()
        };
        let sign = if amount.amount.is_sign_negative() && !amount.amount.is_zero() {
            "-"
        } else {
            ""
        };
        let number = self.number(amount.amount.abs());

        match self.locale {
            DisplayLocale::Danish => {
                format!("{}{} {}", sign, number, danish_symbol(currency))
            }
            DisplayLocale::English => match english_symbol(currency) {
                Some(symbol) => format!("{}{}{}", sign, symbol, number),
                None => format!("{}{} {}", sign, currency, number),
            },
        }
    }

    /// Plain number with grouping and decimal separators
    pub fn number(&self, value: Decimal) -> String {
        let (group, decimal) = match self.locale {
            DisplayLocale::Danish => ('.', ','),
            DisplayLocale::English => (',', '.'),
        };
        let rounded = value.round_dp(self.decimal_places);
        let text = format!("{:.*}", self.decimal_places as usize, rounded);
        let (digits, fraction) = match text.split_once('.') {
            Some((digits, fraction)) => (digits, Some(fraction)),
            None => (text.as_str(), None),
        };
        let (negative, digits) = match digits.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, digits),
        };

        let mut result = String::new();
        if negative {
            result.push('-');
        }
        result.push_str(&group_digits(digits, group));
        if let Some(fraction) = fraction {
            result.push(decimal);
            result.push_str(fraction);
        }
        result
    }

    /// Display title with the fallback chain
    pub fn title(&self, tx: &Transaction) -> String {
        tx.resolved_title().unwrap_or(FALLBACK_TITLE).to_string()
    }

    /// Prompt text for the confirmation collaborator
    pub fn confirm_message(&self, tx: &Transaction) -> String {
        format!(
            "Delete authorization \"{}\" of {}?",
            self.title(tx),
            self.amount_label(&tx.billing_amount)
        )
    }
}

/// Insert a separator every three digits from the right
fn group_digits(digits: &str, separator: char) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(separator);
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

fn danish_symbol(currency: &str) -> &str {
    match currency {
        "DKK" => "kr.",
        "EUR" => "€",
        "USD" => "US$",
        "GBP" => "£",
        other => other,
    }
}

fn english_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}
