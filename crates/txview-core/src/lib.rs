//! Transaction list engine
//!
//! Turns the records delivered by a [`TransactionSource`] into month
//! sections, and coordinates sort order, the detail selection and the
//! confirm-then-delete workflow on top of them.

pub mod deletion;
pub mod error;
pub mod format;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod source;
pub mod types;
pub mod view;

use std::sync::Arc;

use tokio::sync::mpsc;
use txview_config::Config;

pub use deletion::{
    DeletionOutcome, DeletionPhase, DeletionState, DeletionWorkflow, LastFailure, QueryKey,
    RefreshRequest,
};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, DeletionError, ErrorCode, ErrorContext,
    ErrorDetails, ErrorLogger, ErrorSeverity, SourceLoadError,
};
pub use format::Formatter;
pub use models::{BillingAmount, Category, Transaction};
pub use pipeline::{transform, ListPipeline, MonthSection};
pub use selection::{CloseTrigger, Selection};
pub use source::{
    CapabilityRef, ConfirmationPrompt, DeletionCapability, FixedAnswer, QueryState, SourceRef,
    TransactionSource,
};
pub use txview_config::{DisplayLocale, SortOrder};
pub use types::{is_deleted, DeletedFlag, TransactionStatus};
pub use view::{ListView, TransactionDetail, TransactionRow};

/// Error logger reference type
pub type ErrorLoggerRef = Arc<dyn ErrorLogger>;

/// The transaction list of one user
///
/// The engine never edits records itself: the sections are always
/// recomputed from the last fetch, and a successful deletion is reflected
/// only after the source is asked for the records again.
pub struct TransactionList {
    user_id: String,
    source: SourceRef,
    capability: CapabilityRef,
    logger: ErrorLoggerRef,
    pipeline: ListPipeline,
    sort_order: SortOrder,
    query: QueryState,
    sections: Vec<MonthSection>,
    selection: Selection,
    deletion: DeletionWorkflow,
    refresh_requests: mpsc::UnboundedReceiver<RefreshRequest>,
}

impl TransactionList {
    /// Create an engine for the configured user
    pub fn new(
        config: &Config,
        source: SourceRef,
        capability: CapabilityRef,
        logger: ErrorLoggerRef,
    ) -> Self {
        let (deletion, refresh_requests) = DeletionWorkflow::channel();
        Self {
            user_id: config.source.user_id.clone(),
            source,
            capability,
            logger,
            pipeline: ListPipeline::new(Formatter::from_config(config)),
            sort_order: config.display.default_sort,
            query: QueryState::default(),
            sections: Vec::new(),
            selection: Selection::new(),
            deletion,
            refresh_requests,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn formatter(&self) -> &Formatter {
        self.pipeline.formatter()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn sections(&self) -> &[MonthSection] {
        &self.sections
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn deletion(&self) -> &DeletionWorkflow {
        &self.deletion
    }

    pub fn is_busy(&self) -> bool {
        self.deletion.is_busy()
    }

    /// Deletion capability, for callers that await it outside the engine
    pub fn capability(&self) -> CapabilityRef {
        Arc::clone(&self.capability)
    }

    fn recompute(&mut self) {
        self.sections = self.pipeline.transform(self.query.records(), self.sort_order);
        log::debug!(
            "Recomputed {} sections ({} order)",
            self.sections.len(),
            self.sort_order
        );
        self.selection.retain_visible(&self.sections);
    }

    /// Fetch the records again and recompute the sections.
    ///
    /// On failure the previous sections stay in place and the error is
    /// exposed through [`TransactionList::query`].
    pub async fn refresh(&mut self) -> CoreResult<()> {
        self.query.start_loading();
        let result = self.source.fetch(&self.user_id).await;
        let failed = result.as_ref().err().cloned();
        self.query.finish(result);
        self.recompute();

        match failed {
            None => Ok(()),
            Some(error) => {
                log::warn!("Failed to fetch transactions for {}: {}", self.user_id, error);
                Err(error.into())
            }
        }
    }

    /// Consume pending refresh requests; refetches at most once.
    /// Returns the number of requests drained.
    pub async fn process_refresh_requests(&mut self) -> CoreResult<usize> {
        let mut drained = 0;
        while let Ok(request) = self.refresh_requests.try_recv() {
            log::debug!("Refresh request for {}", request.query);
            drained += 1;
        }
        if drained > 0 {
            self.refresh().await?;
        }
        Ok(drained)
    }

    /// Flip the sort direction and recompute
    pub fn toggle_sort_order(&mut self) -> SortOrder {
        self.set_sort_order(self.sort_order.toggled());
        self.sort_order
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        if self.sort_order != order {
            self.sort_order = order;
            self.recompute();
        }
    }

    fn find(&self, id: &str) -> CoreResult<&Transaction> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .find(|tx| tx.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    /// Open the detail overlay for a rendered transaction
    pub fn select(&mut self, id: &str) -> CoreResult<TransactionDetail> {
        let detail = TransactionDetail::build(self.find(id)?, self.pipeline.formatter());
        self.selection.select(id);
        Ok(detail)
    }

    /// Close the detail overlay
    pub fn close_detail(&mut self, trigger: CloseTrigger) {
        self.selection.clear(trigger);
    }

    /// Detail of the selected transaction, if any
    pub fn detail(&self) -> Option<TransactionDetail> {
        let id = self.selection.current()?;
        self.find(id)
            .ok()
            .map(|tx| TransactionDetail::build(tx, self.pipeline.formatter()))
    }

    /// Request deletion and ask the prompt.
    ///
    /// Returns the id to delete when confirmed; the workflow is then in
    /// flight until [`TransactionList::finish_delete`] is called.
    pub fn begin_delete(
        &mut self,
        id: &str,
        prompt: &dyn ConfirmationPrompt,
    ) -> CoreResult<Option<String>> {
        let tx = self.find(id)?.clone();
        self.deletion.request(&tx)?;
        let message = self.pipeline.formatter().confirm_message(&tx);
        let confirmed = prompt.confirm(&message);
        self.deletion.resolve_confirmation(confirmed)
    }

    /// Settle the in-flight deletion and honor its refresh request
    pub async fn finish_delete(
        &mut self,
        result: Result<(), DeletionError>,
    ) -> CoreResult<DeletionOutcome> {
        let context = ErrorContext::new("delete_authorization").with_user_id(self.user_id.clone());
        let outcome = self.deletion.complete(result, self.logger.as_ref(), context)?;
        if let Err(error) = self.process_refresh_requests().await {
            log::warn!("Refresh after deleting {} failed: {}", outcome.id(), error);
        }
        Ok(outcome)
    }

    /// Run the whole workflow: request, confirm, delete, refresh
    pub async fn delete(
        &mut self,
        id: &str,
        prompt: &dyn ConfirmationPrompt,
    ) -> CoreResult<DeletionOutcome> {
        let Some(target) = self.begin_delete(id, prompt)? else {
            return Ok(DeletionOutcome::Declined { id: id.to_string() });
        };
        let result = self.capability.delete(&target).await;
        self.finish_delete(result).await
    }

    /// Snapshot for the render surface
    pub fn view(&self) -> ListView {
        ListView::build(
            &self.query,
            &self.sections,
            self.sort_order,
            self.pipeline.formatter(),
            self.selection.current(),
            self.deletion.state(),
            self.deletion.last_failure(),
        )
    }
}
