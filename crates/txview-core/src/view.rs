//! Serializable view model handed to the render surface

use serde::Serialize;
use txview_config::SortOrder;

use crate::deletion::{DeletionState, LastFailure};
use crate::error::{CoreError, ErrorDetails};
use crate::format::{Formatter, UNKNOWN_CATEGORY};
use crate::models::Transaction;
use crate::pipeline::MonthSection;
use crate::source::QueryState;

/// Label on an enabled delete button
pub const DELETE_LABEL: &str = "Delete";

/// Label on the delete buttons while a deletion is pending
pub const BUSY_LABEL: &str = "Wait…";

/// Coarse status of the transaction query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Loading,
    Ready,
    Failed,
}

impl From<&QueryState> for QueryStatus {
    fn from(state: &QueryState) -> Self {
        match state {
            QueryState::Loading { .. } => QueryStatus::Loading,
            QueryState::Ready(_) => QueryStatus::Ready,
            QueryState::Failed { .. } => QueryStatus::Failed,
        }
    }
}

/// Delete button of an authorization row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAction {
    pub enabled: bool,
    pub label: &'static str,
    /// Text for the confirmation prompt
    pub prompt: String,
}

impl DeleteAction {
    fn new(busy: bool, prompt: String) -> Self {
        Self {
            enabled: !busy,
            label: if busy { BUSY_LABEL } else { DELETE_LABEL },
            prompt,
        }
    }
}

/// One rendered list row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub amount: String,
    pub time: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_icon_url: Option<String>,
    /// Present only for deletable rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<DeleteAction>,
}

impl TransactionRow {
    pub fn build(tx: &Transaction, formatter: &Formatter, busy: bool) -> Self {
        Self {
            id: tx.id.clone(),
            kind: tx.kind.clone(),
            title: formatter.title(tx),
            amount: formatter.amount_label(&tx.billing_amount),
            time: formatter.time_label(&tx.time),
            status: tx.status.to_string(),
            icon_url: tx.icon_url.clone(),
            category_icon_url: tx.category_icon_url.clone(),
            delete: tx
                .is_deletable()
                .then(|| DeleteAction::new(busy, formatter.confirm_message(tx))),
        }
    }
}

/// Month header plus its rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub key: String,
    pub label: String,
    pub rows: Vec<TransactionRow>,
}

/// Detail overlay content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetail {
    pub id: String,
    pub title: String,
    pub date: String,
    pub amount: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_icon_url: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
}

impl TransactionDetail {
    pub fn build(tx: &Transaction, formatter: &Formatter) -> Self {
        Self {
            id: tx.id.clone(),
            title: formatter.title(tx),
            date: formatter.date_label(&tx.time),
            amount: formatter.amount_label(&tx.billing_amount),
            status: tx.status.to_string(),
            kind: tx.kind.clone(),
            icon_url: tx.icon_url.clone(),
            category_icon_url: tx.category_icon_url.clone(),
            category: tx.category_name().unwrap_or(UNKNOWN_CATEGORY).to_string(),
            authorization_id: tx.authorization_id.clone(),
        }
    }
}

/// Sort header state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortHeader {
    pub order: SortOrder,
    pub indicator: &'static str,
}

impl From<SortOrder> for SortHeader {
    fn from(order: SortOrder) -> Self {
        Self {
            order,
            indicator: order.indicator(),
        }
    }
}

/// Everything the list screen renders
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub status: QueryStatus,
    /// Loading with no previous data
    pub show_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    pub sort: SortHeader,
    pub sections: Vec<SectionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    pub deletion: DeletionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<LastFailure>,
}

impl ListView {
    pub fn build(
        query: &QueryState,
        sections: &[MonthSection],
        order: SortOrder,
        formatter: &Formatter,
        selection: Option<&str>,
        deletion: &DeletionState,
        last_failure: Option<&LastFailure>,
    ) -> Self {
        let busy = deletion.phase != crate::deletion::DeletionPhase::Idle;
        let sections = sections
            .iter()
            .map(|section| SectionView {
                key: section.key.clone(),
                label: section.label.clone(),
                rows: section
                    .rows
                    .iter()
                    .map(|tx| TransactionRow::build(tx, formatter, busy))
                    .collect(),
            })
            .collect();

        Self {
            status: QueryStatus::from(query),
            show_loading: query.is_initial_load(),
            error: query
                .error()
                .map(|error| CoreError::SourceLoad(error.clone()).to_details()),
            sort: SortHeader::from(order),
            sections,
            selection: selection.map(str::to_string),
            deletion: deletion.clone(),
            last_failure: last_failure.cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::DeletionPhase;
    use crate::models::{BillingAmount, Category};
    use crate::types::{DeletedFlag, TransactionStatus};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use txview_config::DisplayLocale;

    fn tx(status: TransactionStatus) -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            kind: "card_purchase".to_string(),
            localizable_title: None,
            title: None,
            billing_amount: BillingAmount {
                amount: Decimal::new(-123450, 2),
                currency: "DKK".to_string(),
            },
            time: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            status,
            icon_url: Some("https://cdn.example/icon.png".to_string()),
            category_icon_url: None,
            category: None,
            authorization_id: Some("auth-1".to_string()),
            deleted: DeletedFlag::Absent,
        }
    }

    #[test]
    fn test_row_delete_action() {
        let formatter = Formatter::new(DisplayLocale::Danish);

        let row = TransactionRow::build(&tx(TransactionStatus::Authorization), &formatter, false);
        let action = row.delete.unwrap();
        assert!(action.enabled);
        assert_eq!(action.label, DELETE_LABEL);
        assert_eq!(action.prompt, "Delete authorization \"Transaction\" of -1.234,50 kr.?");
        assert_eq!(row.title, "Transaction");
        assert_eq!(row.amount, "-1.234,50 kr.");

        let row = TransactionRow::build(&tx(TransactionStatus::Authorization), &formatter, true);
        let action = row.delete.unwrap();
        assert!(!action.enabled);
        assert_eq!(action.label, BUSY_LABEL);

        let row = TransactionRow::build(&tx(TransactionStatus::Settled), &formatter, false);
        assert_eq!(row.delete, None);
    }

    #[test]
    fn test_detail_fallbacks() {
        let formatter = Formatter::new(DisplayLocale::English);
        let detail = TransactionDetail::build(&tx(TransactionStatus::Settled), &formatter);
        assert_eq!(detail.category, "Unknown");
        assert_eq!(detail.authorization_id.as_deref(), Some("auth-1"));
        assert_eq!(detail.date, "Jan 05, 2024, 10:00 AM");

        let mut record = tx(TransactionStatus::Settled);
        record.category = Some(Category { name: "Groceries".to_string() });
        let detail = TransactionDetail::build(&record, &formatter);
        assert_eq!(detail.category, "Groceries");
    }

    #[test]
    fn test_list_view_busy_disables_every_row() {
        let formatter = Formatter::default();
        let sections = vec![MonthSection {
            key: "2024-01".to_string(),
            label: "januar 2024".to_string(),
            rows: vec![tx(TransactionStatus::Authorization), tx(TransactionStatus::Authorization)],
        }];
        let deletion = DeletionState {
            phase: DeletionPhase::InFlight,
            target: Some("other".to_string()),
        };
        let view = ListView::build(
            &QueryState::Ready(vec![]),
            &sections,
            SortOrder::Newest,
            &formatter,
            None,
            &deletion,
            None,
        );

        assert!(view.sections[0]
            .rows
            .iter()
            .all(|row| row.delete.as_ref().map(|d| !d.enabled).unwrap_or(false)));
        assert_eq!(view.sort.indicator, "↓");
        assert!(!view.show_loading);
    }

    #[test]
    fn test_list_view_serializes() {
        let view = ListView::build(
            &QueryState::default(),
            &[],
            SortOrder::Oldest,
            &Formatter::default(),
            None,
            &DeletionState::default(),
            None,
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "loading");
        assert_eq!(json["show_loading"], true);
        assert_eq!(json["sort"]["order"], "oldest");
        assert_eq!(json["deletion"]["phase"], "idle");
        assert!(json.get("error").is_none());
    }
}
