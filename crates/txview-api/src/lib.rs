//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction list, sort, detail overlay, deletion

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use txview_config::Config;
use txview_core::{ListView, TransactionList};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub list: Arc<Mutex<TransactionList>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, list: TransactionList) -> Self {
        Self {
            list: Arc::new(Mutex::new(list)),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::transactions::{
        api_clear_selection, api_delete_transaction, api_toggle_sort, api_transaction_detail,
        api_transactions, htmx_close_detail, htmx_delete_transaction, htmx_toggle_sort,
        htmx_transaction_detail, htmx_transactions_list, page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/sort/toggle", post(api_toggle_sort))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/transactions/:id/delete", post(api_delete_transaction))
        .route("/api/selection", delete(api_clear_selection))
        .route("/api/reload", post(api_reload))
        // HTMX page routes
        .route("/", get(page_transactions))
        .route("/transactions", get(page_transactions))
        // HTMX partial routes
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/sort", post(htmx_toggle_sort))
        .route("/transactions/:id/detail", get(htmx_transaction_detail))
        .route("/transactions/detail/close", post(htmx_close_detail))
        .route("/transactions/:id/delete", post(htmx_delete_transaction))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Explicit refetch (JSON API)
async fn api_reload(State(state): State<AppState>) -> Result<Json<ListView>, ApiError> {
    let mut list = state.list.lock().await;
    list.refresh().await?;
    log::info!("Transactions reloaded for {}", list.user_id());
    Ok(Json(list.view()))
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(lang: &str, title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Txview</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        lang,
        escape_html(title),
        content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, lang: &str, title: &str, inner_content: &str) -> String {
    let main = format!(
        "<main class='max-w-3xl mx-auto p-6'>{}</main>",
        inner_content
    );
    if is_htmx_request(headers) {
        main
    } else {
        base_html(lang, title, &main)
    }
}

/// Escape text for HTML content and single- or double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until the process is
/// terminated or the listener fails.
pub async fn start_server(config: Config, list: Arc<Mutex<TransactionList>>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState { list, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting txview server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Transaction list)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex as StdMutex;
    use tower::ServiceExt;
    use txview_core::{
        DefaultErrorLogger, DeletedFlag, DeletionCapability, DeletionError, SourceLoadError,
        Transaction, TransactionSource,
    };

    struct FakeBackend {
        records: StdMutex<Vec<Transaction>>,
    }

    #[async_trait]
    impl TransactionSource for FakeBackend {
        async fn fetch(&self, _user_id: &str) -> Result<Vec<Transaction>, SourceLoadError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl DeletionCapability for FakeBackend {
        async fn delete(&self, transaction_id: &str) -> Result<(), DeletionError> {
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|tx| tx.id == transaction_id) {
                Some(tx) => {
                    tx.deleted = DeletedFlag::Flag(true);
                    Ok(())
                }
                None => Err(DeletionError::NotFound { id: transaction_id.to_string() }),
            }
        }
    }

    fn record(id: &str, time: &str, status: &str) -> Transaction {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": "card_purchase",
            "localizableTitle": format!("Shop <{}>", id),
            "billingAmount": { "amount": -12.5, "currency": "DKK" },
            "time": time,
            "status": status,
        }))
        .unwrap()
    }

    async fn app() -> Router {
        let backend = Arc::new(FakeBackend {
            records: StdMutex::new(vec![
                record("tx-1", "2024-01-05T10:00:00Z", "authorization"),
                record("tx-2", "2024-02-01T08:00:00Z", "settled"),
            ]),
        });
        let config = Config::default();
        let mut list = TransactionList::new(
            &config,
            backend.clone(),
            backend,
            Arc::new(DefaultErrorLogger),
        );
        list.refresh().await.unwrap();
        create_router(AppState::new(config, list))
    }

    /// Backend whose deletion call never returns normally
    struct PanickingBackend {
        records: Vec<Transaction>,
    }

    #[async_trait]
    impl TransactionSource for PanickingBackend {
        async fn fetch(&self, _user_id: &str) -> Result<Vec<Transaction>, SourceLoadError> {
            Ok(self.records.clone())
        }
    }

    #[async_trait]
    impl DeletionCapability for PanickingBackend {
        async fn delete(&self, transaction_id: &str) -> Result<(), DeletionError> {
            panic!("capability crashed while deleting {}", transaction_id);
        }
    }

    async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = app().await;
        assert_eq!(send(&router, "GET", "/api/health").await, (StatusCode::OK, "OK".to_string()));
    }

    #[tokio::test]
    async fn test_list_view_json() {
        let router = app().await;
        let (status, body) = send(&router, "GET", "/api/transactions").await;
        assert_eq!(status, StatusCode::OK);

        let view = json(&body);
        assert_eq!(view["status"], "ready");
        assert_eq!(view["sections"][0]["key"], "2024-02");
        assert_eq!(view["sections"][1]["rows"][0]["id"], "tx-1");
        assert!(view["sections"][0]["rows"][0].get("delete").is_none());
    }

    #[tokio::test]
    async fn test_toggle_sort() {
        let router = app().await;
        let (_, body) = send(&router, "POST", "/api/transactions/sort/toggle").await;
        let view = json(&body);
        assert_eq!(view["sort"]["order"], "oldest");
        assert_eq!(view["sections"][0]["key"], "2024-01");
    }

    #[tokio::test]
    async fn test_detail_and_selection() {
        let router = app().await;
        let (status, body) = send(&router, "GET", "/api/transactions/tx-2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["category"], "Unknown");

        let (_, body) = send(&router, "GET", "/api/transactions").await;
        assert_eq!(json(&body)["selection"], "tx-2");

        let (status, body) = send(&router, "DELETE", "/api/selection?trigger=escape").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json(&body).get("selection").is_none());

        let (status, _) = send(&router, "DELETE", "/api/selection?trigger=swipe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let router = app().await;
        let (status, body) = send(&router, "GET", "/api/transactions/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["code"], "TRANSACTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_requires_confirm_param() {
        let router = app().await;
        let (status, _) = send(&router, "POST", "/api/transactions/tx-1/delete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_declined() {
        let router = app().await;
        let (status, body) = send(&router, "POST", "/api/transactions/tx-1/delete?confirm=false").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["result"], "declined");

        let (_, body) = send(&router, "GET", "/api/transactions").await;
        assert_eq!(json(&body)["sections"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_settled_conflict() {
        let router = app().await;
        let (status, body) = send(&router, "POST", "/api/transactions/tx-2/delete?confirm=true").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json(&body)["code"], "INVALID_TRANSITION");
        assert_eq!(json(&body)["severity"], "warning");
    }

    #[tokio::test]
    async fn test_delete_confirmed_refreshes() {
        let router = app().await;
        let (status, body) = send(&router, "POST", "/api/transactions/tx-1/delete?confirm=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["result"], "deleted");

        let (_, body) = send(&router, "GET", "/api/transactions").await;
        let view = json(&body);
        assert_eq!(view["sections"].as_array().unwrap().len(), 1);
        assert_eq!(view["deletion"]["phase"], "idle");
    }

    #[tokio::test]
    async fn test_page_renders_list() {
        let router = app().await;
        let (status, body) = send(&router, "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<html lang=\"da-DK\">"));
        assert!(body.contains("februar 2024"));
        assert!(body.contains("Shop &lt;tx-1&gt;"));
        assert!(body.contains("hx-confirm="));
        assert!(body.contains("/transactions/tx-1/delete"));
        assert!(!body.contains("/transactions/tx-2/delete"));
    }

    #[tokio::test]
    async fn test_htmx_detail_and_close() {
        let router = app().await;
        let (status, body) = send(&router, "GET", "/transactions/tx-1/detail").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("trigger=backdrop"));
        assert!(body.contains("trigger=explicit"));

        let (status, body) = send(&router, "POST", "/transactions/detail/close?trigger=backdrop").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_htmx_delete_returns_list() {
        let router = app().await;
        send(&router, "GET", "/transactions/tx-1/detail").await;

        let (status, body) = send(&router, "POST", "/transactions/tx-1/delete").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Shop &lt;tx-1&gt;"));
        assert!(body.contains("hx-swap-oob='true'></div>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[tokio::test]
    async fn test_panicking_deletion_releases_busy_flag() {
        let backend = Arc::new(PanickingBackend {
            records: vec![
                record("tx-1", "2024-01-05T10:00:00Z", "authorization"),
                record("tx-3", "2024-01-07T10:00:00Z", "authorization"),
            ],
        });
        let config = Config::default();
        let mut list = TransactionList::new(
            &config,
            backend.clone(),
            backend,
            Arc::new(DefaultErrorLogger),
        );
        list.refresh().await.unwrap();
        let router = create_router(AppState::new(config, list));

        let (status, body) = send(&router, "POST", "/api/transactions/tx-1/delete?confirm=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["result"], "failed");
        assert_eq!(json(&body)["id"], "tx-1");

        let (_, body) = send(&router, "GET", "/api/transactions").await;
        let view = json(&body);
        assert_eq!(view["deletion"]["phase"], "idle");
        assert_eq!(view["last_failure"]["id"], "tx-1");
        assert_eq!(view["sections"][0]["rows"].as_array().unwrap().len(), 2);

        let (status, body) = send(&router, "POST", "/api/transactions/tx-3/delete?confirm=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["result"], "failed");
        assert_eq!(json(&body)["id"], "tx-3");
    }
}
