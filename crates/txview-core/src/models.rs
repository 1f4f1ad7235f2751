//! Core data models for transactions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DeletedFlag, TransactionStatus};

/// Transaction information, as delivered by the transaction source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Category tag (e.g. purchase kind)
    #[serde(rename = "type")]
    pub kind: String,
    /// Localized title, preferred for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizable_title: Option<String>,
    /// Raw title, used when no localized title exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Billed amount
    pub billing_amount: BillingAmount,
    /// Transaction instant, used for display, sorting and grouping
    pub time: DateTime<Utc>,
    /// Transaction status
    pub status: TransactionStatus,
    /// Merchant icon
    #[serde(rename = "iconURL", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Category icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_icon_url: Option<String>,
    /// Category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Secondary identifier shown in the detail view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted: DeletedFlag,
}

impl Transaction {
    /// Check the soft-delete marker
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_deleted()
    }

    /// Check if the deletion workflow may target this transaction
    pub fn is_deletable(&self) -> bool {
        self.status.is_deletable()
    }

    /// Localized title, else raw title
    pub fn resolved_title(&self) -> Option<&str> {
        self.localizable_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
    }

    /// Category name, if the source provided one
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Amount in a currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAmount {
    /// Decimal amount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: String,
}

/// Transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category display name
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_source_record() {
        let json = r#"{
            "id": "tx-1",
            "type": "card_purchase",
            "localizableTitle": "Netto",
            "billingAmount": { "amount": -123.5, "currency": "DKK" },
            "time": "2024-01-05T10:00:00Z",
            "status": "authorization",
            "iconURL": "https://cdn.example/netto.png",
            "categoryIconUrl": "https://cdn.example/groceries.png",
            "category": { "name": "Groceries" },
            "authorizationId": "auth-9",
            "deleted": "1"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.kind, "card_purchase");
        assert_eq!(tx.billing_amount.amount, Decimal::from_str("-123.5").unwrap());
        assert_eq!(tx.status, TransactionStatus::Authorization);
        assert_eq!(tx.icon_url.as_deref(), Some("https://cdn.example/netto.png"));
        assert_eq!(tx.category_name(), Some("Groceries"));
        assert_eq!(tx.authorization_id.as_deref(), Some("auth-9"));
        assert!(tx.is_deleted());
        assert!(tx.is_deletable());
    }

    #[test]
    fn test_optional_fields_missing() {
        let json = r#"{
            "id": "tx-2",
            "type": "transfer",
            "billingAmount": { "amount": 10 },
            "time": "2024-02-01T08:00:00+01:00",
            "status": "settled"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert!(!tx.is_deleted());
        assert!(!tx.is_deletable());
        assert_eq!(tx.billing_amount.currency, "");
        assert_eq!(tx.resolved_title(), None);
        assert_eq!(tx.time.to_rfc3339(), "2024-02-01T07:00:00+00:00");
    }

    #[test]
    fn test_resolved_title_fallback() {
        let json = r#"{
            "id": "tx-3",
            "type": "fee",
            "localizableTitle": "",
            "title": "Monthly fee",
            "billingAmount": { "amount": 1, "currency": "DKK" },
            "time": "2024-02-01T08:00:00Z",
            "status": "settled"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.resolved_title(), Some("Monthly fee"));
    }
}
