//! Route modules for the API server
//!
//! - transactions: list, sort, detail overlay, deletion
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page and fragment rendering

pub mod transactions;
