use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::state::Reducer;

/// Owns one screen's state: events are queued, applied in order by a
/// background task, and each resulting state is published to subscribers.
///
/// Dropping the store stops its task.
pub struct Store<S: Reducer> {
    events: mpsc::UnboundedSender<S::Event>,
    state: watch::Receiver<S>,
    task: JoinHandle<()>,
}

impl<S: Reducer> Store<S> {
    pub fn spawn(initial: S) -> Self {
        let (events, mut rx) = mpsc::unbounded_channel::<S::Event>();
        let (state_tx, state) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let next = state_tx.borrow().clone().reduce(event);
                state_tx.send_replace(next);
            }
        });

        Self {
            events,
            state,
            task,
        }
    }

    pub fn dispatch(&self, event: S::Event) {
        if self.events.send(event).is_err() {
            tracing::warn!("state store stopped; event dropped");
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }
}

impl<S: Reducer> Drop for Store<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::state::{FavoritesEvent, FavoritesState, Resource, SearchEvent, SearchState};

    #[tokio::test]
    async fn test_events_applied_in_order() {
        let store = Store::spawn(SearchState::default());
        let mut updates = store.subscribe();

        store.dispatch(SearchEvent::QueryChanged {
            query: "dune".into(),
            generation: 1,
        });
        store.dispatch(SearchEvent::ResultsArrived {
            generation: 1,
            result: Err(LoadError::Network),
        });

        let state = updates
            .wait_for(|s| !s.results.is_loading() && s.generation == 1)
            .await
            .unwrap()
            .clone();
        assert_eq!(state.query, "dune");
        assert_eq!(state.results, Resource::Failed(LoadError::Network));
    }

    #[tokio::test]
    async fn test_snapshot_after_update() {
        let store = Store::spawn(FavoritesState::default());
        let mut updates = store.subscribe();
        store.dispatch(FavoritesEvent::Updated(vec![]));
        updates.changed().await.unwrap();
        assert_eq!(store.state().favorites, Resource::Empty);
    }
}
