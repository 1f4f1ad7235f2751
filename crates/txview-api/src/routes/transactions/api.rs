//! Transactions API endpoints - JSON responses
//!
//! Endpoints:
//! - api_transactions: Current list view (JSON)
//! - api_toggle_sort: Flip the sort order (JSON)
//! - api_transaction_detail: Select a transaction and return its detail (JSON)
//! - api_clear_selection: Close the detail overlay (JSON)
//! - api_delete_transaction: Run the deletion workflow (JSON)

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use txview_core::{
    CloseTrigger, CoreResult, DeletionCapability, DeletionError, DeletionOutcome, FixedAnswer, ListView,
    TransactionDetail,
};

use crate::{ApiError, AppState};

/// Current list view (JSON API)
pub async fn api_transactions(State(state): State<AppState>) -> Json<ListView> {
    let list = state.list.lock().await;
    Json(list.view())
}

/// Toggle sort order (JSON API)
pub async fn api_toggle_sort(State(state): State<AppState>) -> Json<ListView> {
    let mut list = state.list.lock().await;
    let order = list.toggle_sort_order();
    log::debug!("Sort order toggled to {}", order);
    Json(list.view())
}

/// Select a transaction and return its detail (JSON API)
pub async fn api_transaction_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDetail>, ApiError> {
    let mut list = state.list.lock().await;
    Ok(Json(list.select(&id)?))
}

/// Close the detail overlay (JSON API)
pub async fn api_clear_selection(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListView>, ApiError> {
    let trigger = parse_trigger(&params)?;
    let mut list = state.list.lock().await;
    list.close_detail(trigger);
    Ok(Json(list.view()))
}

/// Run the deletion workflow; `confirm` is the prompt's answer (JSON API)
pub async fn api_delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DeletionOutcome>, ApiError> {
    let confirm = match params.get("confirm").map(|s| s.as_str()) {
        Some("true") | Some("1") | Some("yes") => true,
        Some("false") | Some("0") | Some("no") => false,
        Some(other) => return Err(ApiError::bad_request(format!("invalid confirm value: {}", other))),
        None => return Err(ApiError::bad_request("missing confirm parameter")),
    };
    Ok(Json(run_delete(&state, &id, confirm).await?))
}

pub(crate) fn parse_trigger(params: &HashMap<String, String>) -> Result<CloseTrigger, ApiError> {
    match params.get("trigger") {
        Some(value) => value.parse().map_err(ApiError::bad_request),
        None => Ok(CloseTrigger::default()),
    }
}

/// Drive one deletion through the shared engine.
///
/// The engine lock is released while the capability runs, so concurrent
/// requests see the workflow busy. The capability call and its completion
/// run on a spawned task and finish even if the client goes away. A task
/// that panics is completed here as a failed deletion.
pub(crate) async fn run_delete(
    state: &AppState,
    id: &str,
    confirm: bool,
) -> Result<DeletionOutcome, ApiError> {
    let (target, capability) = {
        let mut list = state.list.lock().await;
        let target = list.begin_delete(id, &FixedAnswer(confirm))?;
        (target, list.capability())
    };

    let Some(target) = target else {
        return Ok(DeletionOutcome::Declined { id: id.to_string() });
    };

    let list = Arc::clone(&state.list);
    let task = tokio::spawn(async move {
        let result = capability.delete(&target).await;
        let mut list = list.lock().await;
        let outcome: CoreResult<DeletionOutcome> = list.finish_delete(result).await;
        outcome
    });

    match task.await {
        Ok(outcome) => Ok(outcome?),
        Err(e) => {
            // The task died before completing the workflow; close it as a failure
            log::error!("Deletion task for {} did not finish: {}", id, e);
            let mut list = state.list.lock().await;
            let failure = DeletionError::Failed {
                message: format!("deletion task failed: {}", e),
            };
            Ok(list.finish_delete(Err(failure)).await?)
        }
    }
}
