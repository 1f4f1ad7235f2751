//! Transaction routes - list, sort, detail overlay, deletion
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page and HTMX fragments

pub mod api;
pub mod page;

pub use api::{
    api_clear_selection,
    api_delete_transaction,
    api_toggle_sort,
    api_transaction_detail,
    api_transactions,
};

pub use page::{
    htmx_close_detail,
    htmx_delete_transaction,
    htmx_toggle_sort,
    htmx_transaction_detail,
    htmx_transactions_list,
    page_transactions,
};
