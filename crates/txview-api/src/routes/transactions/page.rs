//! Transactions page rendering - Full page and HTMX fragments
//!
//! Endpoints:
//! - page_transactions: Main page with the list container and overlay slot
//! - htmx_transactions_list: List fragment (sort header, month sections)
//! - htmx_toggle_sort: Flip sort order, return the list fragment
//! - htmx_transaction_detail: Detail overlay fragment
//! - htmx_close_detail: Close the overlay
//! - htmx_delete_transaction: Delete an authorization, return the list fragment
//!
//! The delete button carries `hx-confirm`, so a request reaching
//! `htmx_delete_transaction` has already been confirmed in the browser.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use txview_core::view::{SectionView, TransactionRow};
use txview_core::{ListView, TransactionDetail};

use super::api::{parse_trigger, run_delete};
use crate::{escape_html, AppState};

/// Transactions page
pub async fn page_transactions(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let list = state.list.lock().await;
    let detail = list.detail();
    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            <button onclick='reloadTransactions()' class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200' title='Reload transactions'>Reload</button>
        </div>
        <div id='transactions-content' class='bg-white rounded-xl shadow-sm p-6'>{}</div>
        <div id='tx-detail'>{}</div>
        <script>
        function reloadTransactions() {{
            fetch('/api/reload', {{method: 'POST'}})
                .then(r => {{
                    if (r.ok) {{
                        window.location.reload();
                    }} else {{
                        r.json().then(data => alert('Reload failed: ' + data.message));
                    }}
                }})
                .catch(e => alert('Reload failed: ' + e));
        }}
        document.addEventListener('keydown', function(e) {{
            var overlay = document.getElementById('tx-detail');
            if (e.key === 'Escape' && overlay && overlay.children.length > 0) {{
                htmx.ajax('POST', '/transactions/detail/close?trigger=escape', {{target: '#tx-detail', swap: 'innerHTML'}});
            }}
        }});
        </script>"#,
        render_list(&list.view()),
        render_overlay(detail.as_ref())
    );

    Html(crate::page_response(
        &headers,
        state.config.display.locale.tag(),
        "Transactions",
        &inner_content,
    ))
}

/// HTMX: List fragment
pub async fn htmx_transactions_list(State(state): State<AppState>) -> Html<String> {
    let list = state.list.lock().await;
    Html(render_list(&list.view()))
}

/// HTMX: Toggle sort order
pub async fn htmx_toggle_sort(State(state): State<AppState>) -> Html<String> {
    let mut list = state.list.lock().await;
    list.toggle_sort_order();
    Html(render_list(&list.view()))
}

/// HTMX: Detail overlay
pub async fn htmx_transaction_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Html<String>) {
    let mut list = state.list.lock().await;
    match list.select(&id) {
        Ok(detail) => (StatusCode::OK, Html(render_overlay(Some(&detail)))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Html(format!(
                "<div class='p-4 text-red-600'>{}</div>",
                escape_html(&e.to_string())
            )),
        ),
    }
}

/// HTMX: Close the overlay (close button, Escape or backdrop)
pub async fn htmx_close_detail(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let trigger = parse_trigger(&params).unwrap_or_default();
    let mut list = state.list.lock().await;
    list.close_detail(trigger);
    Html(String::new())
}

/// HTMX: Delete an authorization
///
/// Returns the refreshed list plus an out-of-band overlay update, so an
/// overlay showing the deleted transaction disappears with it. Rejections
/// are rendered as a notice above the list; capability failures show up
/// through the list's last-failure banner.
pub async fn htmx_delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Html<String> {
    let notice = match run_delete(&state, &id, true).await {
        Ok(outcome) => {
            log::debug!("Deletion outcome: {:?}", outcome);
            String::new()
        }
        Err(e) => format!(
            "<div class='mb-4 p-3 rounded-lg bg-yellow-50 text-yellow-700'>{}</div>",
            escape_html(&e.to_string())
        ),
    };

    let list = state.list.lock().await;
    let detail = list.detail();
    Html(format!(
        "{}{}<div id='tx-detail' hx-swap-oob='true'>{}</div>",
        notice,
        render_list(&list.view()),
        render_overlay(detail.as_ref())
    ))
}

// ==================== Rendering ====================

/// List fragment: query status, sort header and month sections
pub fn render_list(view: &ListView) -> String {
    let mut html = String::new();

    if let Some(error) = &view.error {
        html.push_str(&format!(
            "<div class='mb-4 p-3 rounded-lg bg-red-50 text-red-700'>{}</div>",
            escape_html(&error.message)
        ));
    }
    if let Some(failure) = &view.last_failure {
        html.push_str(&format!(
            "<div class='mb-4 p-3 rounded-lg bg-red-50 text-red-700'>Deleting {} failed: {}</div>",
            escape_html(&failure.id),
            escape_html(&failure.message)
        ));
    }

    html.push_str(&format!(
        r#"<div class='flex justify-end mb-2'>
            <button hx-post='/transactions/sort' hx-target='#transactions-content' hx-swap='innerHTML'
                class='text-sm text-gray-600 hover:text-indigo-600'>Time {}</button>
        </div>"#,
        view.sort.indicator
    ));

    if view.show_loading {
        html.push_str("<p class='text-gray-500 text-center'>Loading...</p>");
        return html;
    }
    if view.is_empty() {
        html.push_str("<div class='text-center py-12 text-gray-500'><p>No transactions</p></div>");
        return html;
    }

    for section in &view.sections {
        html.push_str(&render_section(section));
    }
    html
}

fn render_section(section: &SectionView) -> String {
    let rows: String = section.rows.iter().map(render_row).collect();
    format!(
        r#"<section class='mb-6' data-month='{}'>
            <h3 class='text-sm font-semibold text-gray-500 uppercase mb-2'>{}</h3>
            <div class='space-y-2'>{}</div>
        </section>"#,
        escape_html(&section.key),
        escape_html(&section.label),
        rows
    )
}

fn render_icon(url: Option<&str>, class: &str) -> String {
    match url {
        Some(url) => format!("<img src='{}' class='{}' alt=''>", escape_html(url), class),
        None => format!("<div class='{} bg-gray-100'></div>", class),
    }
}

fn render_row(row: &TransactionRow) -> String {
    let encoded_id = urlencoding::encode(&row.id);
    let delete_button = match &row.delete {
        Some(action) => format!(
            r#"<button hx-post='/transactions/{}/delete' hx-confirm='{}' hx-target='#transactions-content' hx-swap='innerHTML'
                onclick='event.stopPropagation()' {}
                class='px-3 py-1 text-sm rounded-lg {}'>{}</button>"#,
            encoded_id,
            escape_html(&action.prompt),
            if action.enabled { "" } else { "disabled" },
            if action.enabled {
                "bg-red-50 text-red-600 hover:bg-red-100"
            } else {
                "bg-gray-100 text-gray-400 cursor-not-allowed"
            },
            action.label
        ),
        None => String::new(),
    };

    format!(
        r#"<div class='flex items-center gap-3 p-3 rounded-lg hover:bg-gray-50 cursor-pointer'
            hx-get='/transactions/{}/detail' hx-target='#tx-detail' hx-swap='innerHTML'>
            {}
            <div class='flex-1 min-w-0'>
                <p class='font-medium truncate'>{}</p>
                <p class='text-xs text-gray-500'>{} <span class='ml-1'>{}</span> <span class='ml-1 text-gray-400'>{}</span></p>
            </div>
            {}
            <span class='font-medium whitespace-nowrap'>{}</span>
            {}
        </div>"#,
        encoded_id,
        render_icon(row.icon_url.as_deref(), "w-10 h-10 rounded-full"),
        escape_html(&row.title),
        escape_html(&row.time),
        escape_html(&row.status),
        escape_html(&row.kind),
        render_icon(row.category_icon_url.as_deref(), "w-6 h-6 rounded"),
        escape_html(&row.amount),
        delete_button
    )
}

/// Overlay fragment; empty when nothing is selected
pub fn render_overlay(detail: Option<&TransactionDetail>) -> String {
    let Some(detail) = detail else {
        return String::new();
    };

    let authorization = detail
        .authorization_id
        .as_deref()
        .map(|id| {
            format!(
                "<div class='flex justify-between py-2 border-b'><span class='text-gray-500'>Authorization</span><span class='font-mono text-sm'>{}</span></div>",
                escape_html(id)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-40 z-40'
            hx-post='/transactions/detail/close?trigger=backdrop' hx-target='#tx-detail' hx-swap='innerHTML'></div>
        <div class='fixed inset-x-0 top-16 mx-auto max-w-lg bg-white rounded-xl shadow-xl p-6 z-50' role='dialog'>
            <div class='flex items-center gap-3 mb-4'>
                {}
                <div class='flex-1'>
                    <h3 class='text-lg font-semibold'>{}</h3>
                    <p class='text-sm text-gray-500'>{}</p>
                </div>
                <button hx-post='/transactions/detail/close?trigger=explicit' hx-target='#tx-detail' hx-swap='innerHTML'
                    class='text-gray-400 hover:text-gray-600' aria-label='Close'>✕</button>
            </div>
            <p class='text-2xl font-bold mb-4'>{}</p>
            <div class='flex justify-between py-2 border-b'><span class='text-gray-500'>Status</span><span>{}</span></div>
            <div class='flex justify-between py-2 border-b'><span class='text-gray-500'>Type</span><span>{}</span></div>
            <div class='flex justify-between py-2 border-b'><span class='text-gray-500'>Category</span><span class='flex items-center gap-2'>{}{}</span></div>
            <div class='flex justify-between py-2 border-b'><span class='text-gray-500'>ID</span><span class='font-mono text-sm'>{}</span></div>
            {}
        </div>"#,
        render_icon(detail.icon_url.as_deref(), "w-12 h-12 rounded-full"),
        escape_html(&detail.title),
        escape_html(&detail.date),
        escape_html(&detail.amount),
        escape_html(&detail.status),
        escape_html(&detail.kind),
        render_icon(detail.category_icon_url.as_deref(), "w-5 h-5 rounded"),
        escape_html(&detail.category),
        escape_html(&detail.id),
        authorization
    )
}
