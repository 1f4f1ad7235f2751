//! List pipeline: filter, sort, group
//!
//! `transform` turns the raw source records into month sections:
//!
//! 1. drop every soft-deleted record,
//! 2. stable sort by instant in the requested direction,
//! 3. strict run-length grouping by `YYYY-MM` over the sorted rows.
//!
//! Every step is pure, so repeated calls on the same input produce equal
//! output.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use txview_config::{DisplayLocale, SortOrder};

use crate::format::Formatter;
use crate::models::Transaction;

/// Contiguous run of transactions sharing a year-month key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSection {
    /// `YYYY-MM` (UTC)
    pub key: String,
    /// Localized month/year label
    pub label: String,
    /// Rows in display order
    pub rows: Vec<Transaction>,
}

impl MonthSection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Month key of an instant
pub fn month_key(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m").to_string()
}

/// Comparator for the requested direction; ties compare equal so a stable
/// sort keeps source order.
pub fn compare_by_time(order: SortOrder, a: &Transaction, b: &Transaction) -> Ordering {
    match order {
        SortOrder::Newest => b.time.cmp(&a.time),
        SortOrder::Oldest => a.time.cmp(&b.time),
    }
}

/// Pipeline bound to a formatter for section labels
#[derive(Debug, Clone, Default)]
pub struct ListPipeline {
    formatter: Formatter,
}

impl ListPipeline {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }

    pub fn with_locale(locale: DisplayLocale) -> Self {
        Self::new(Formatter::new(locale))
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Visible records in display order, before grouping
    pub fn sorted_visible<'a>(&self, records: &'a [Transaction], order: SortOrder) -> Vec<&'a Transaction> {
        let mut visible: Vec<&Transaction> = records.iter().filter(|tx| !tx.is_deleted()).collect();
        // slice::sort_by is stable
        visible.sort_by(|a, b| compare_by_time(order, a, b));
        visible
    }

    /// Run the full pipeline
    pub fn transform(&self, records: &[Transaction], order: SortOrder) -> Vec<MonthSection> {
        let sorted = self.sorted_visible(records, order);
        self.group(sorted)
    }

    /// Start a new section whenever the key differs from the previous row's
    fn group(&self, rows: Vec<&Transaction>) -> Vec<MonthSection> {
        let mut sections: Vec<MonthSection> = Vec::new();
        for tx in rows {
            let key = month_key(&tx.time);
            match sections.last_mut() {
                Some(section) if section.key == key => section.rows.push(tx.clone()),
                _ => sections.push(MonthSection {
                    label: self.formatter.month_label(&tx.time),
                    key,
                    rows: vec![tx.clone()],
                }),
            }
        }
        sections
    }
}

/// Run the pipeline with default display settings
pub fn transform(records: &[Transaction], order: SortOrder) -> Vec<MonthSection> {
    ListPipeline::default().transform(records, order)
}
