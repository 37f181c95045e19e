//! Last-write-wins search: each new query cancels the one in flight.

use std::sync::Arc;

use muviz_api::{CatalogService, Page};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Results of one submitted query.
#[derive(Debug)]
pub struct SearchOutcome<E> {
    pub generation: u64,
    pub query: String,
    pub result: Result<Page, E>,
}

/// Runs at most one search at a time and only ever hands back results for
/// the most recent submission.
///
/// Submitting aborts the previous task; a result that was already queued
/// before the abort carries an older generation and is dropped on receipt.
pub struct SearchSession<S: CatalogService> {
    service: Arc<S>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SearchOutcome<S::Error>>,
    rx: mpsc::UnboundedReceiver<SearchOutcome<S::Error>>,
}

impl<S: CatalogService + 'static> SearchSession<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            generation: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Start searching for `query`, cancelling any earlier search.
    /// A blank query clears the results without a request.
    pub fn submit(&mut self, query: &str) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let query = query.trim().to_string();

        if query.is_empty() {
            let _ = self.tx.send(SearchOutcome {
                generation,
                query,
                result: Ok(Page::new(1, Vec::new(), 0, 0)),
            });
            return generation;
        }

        tracing::debug!(%query, generation, "search submitted");
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = service.search(&query, 1).await;
            let _ = tx.send(SearchOutcome {
                generation,
                query,
                result,
            });
        }));
        generation
    }

    /// Abort the in-flight search, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Wait for the results of the latest submission, skipping stale ones.
    pub async fn next_result(&mut self) -> Option<SearchOutcome<S::Error>> {
        loop {
            let outcome = self.rx.recv().await?;
            if outcome.generation == self.current_generation() {
                return Some(outcome);
            }
            tracing::debug!(
                query = %outcome.query,
                generation = outcome.generation,
                "dropping stale search result"
            );
        }
    }
}

impl<S: CatalogService> Drop for SearchSession<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
