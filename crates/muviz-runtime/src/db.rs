use std::path::Path;

use tokio::sync::{mpsc, oneshot, watch};

use muviz_core::error::MuvizError;
use muviz_core::models::FavoriteRecord;
use muviz_core::storage::Storage;

/// Async handle to the storage actor.
///
/// All storage access runs on one `db-actor` thread, so writes are
/// serialized. After every mutation that changes rows the actor publishes
/// the full favorites list on a watch channel.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
    favorites: watch::Receiver<Vec<FavoriteRecord>>,
}

enum DbCommand {
    InsertFavorite {
        record: FavoriteRecord,
        reply: oneshot::Sender<Result<(), MuvizError>>,
    },
    DeleteFavorite {
        media_id: u64,
        reply: oneshot::Sender<Result<usize, MuvizError>>,
    },
    DeleteAllFavorites {
        reply: oneshot::Sender<Result<usize, MuvizError>>,
    },
    ToggleFavorite {
        record: FavoriteRecord,
        reply: oneshot::Sender<Result<bool, MuvizError>>,
    },
    IsFavorite {
        media_id: u64,
        reply: oneshot::Sender<Result<bool, MuvizError>>,
    },
    GetFavorite {
        media_id: u64,
        reply: oneshot::Sender<Result<Option<FavoriteRecord>, MuvizError>>,
    },
    GetAllFavorites {
        reply: oneshot::Sender<Result<Vec<FavoriteRecord>, MuvizError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Result<Self, MuvizError> {
        let storage = Storage::open(path)
            .inspect_err(|e| tracing::error!("Failed to open database: {e}"))?;
        Self::spawn(storage)
    }

    /// Actor over an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, MuvizError> {
        Self::spawn(Storage::open_memory()?)
    }

    fn spawn(storage: Storage) -> Result<Self, MuvizError> {
        let initial = storage.all_favorites()?;
        let (watch_tx, favorites) = watch::channel(initial);
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx, watch_tx))
            .inspect_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))?;

        Ok(Self { tx, favorites })
    }

    /// Live view of all favorites, ordered by media id descending.
    pub fn subscribe_favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.favorites.clone()
    }

    pub async fn insert_favorite(&self, record: FavoriteRecord) -> Result<(), MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::InsertFavorite { record, reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    /// Remove the favorite with this media id. Absent ids remove zero rows.
    pub async fn delete_favorite(&self, media_id: u64) -> Result<usize, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::DeleteFavorite { media_id, reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    pub async fn delete_all_favorites(&self) -> Result<usize, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::DeleteAllFavorites { reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    pub async fn toggle_favorite(&self, record: FavoriteRecord) -> Result<bool, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::ToggleFavorite { record, reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    pub async fn is_favorite(&self, media_id: u64) -> Result<bool, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::IsFavorite { media_id, reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    pub async fn get_favorite(&self, media_id: u64) -> Result<Option<FavoriteRecord>, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetFavorite { media_id, reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }

    pub async fn get_all_favorites(&self) -> Result<Vec<FavoriteRecord>, MuvizError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetAllFavorites { reply });
        rx.await
            .unwrap_or_else(|_| Err(MuvizError::Config("DB actor closed".into())))
    }
}

fn actor_loop(
    storage: Storage,
    mut rx: mpsc::UnboundedReceiver<DbCommand>,
    favorites: watch::Sender<Vec<FavoriteRecord>>,
) {
    // Subscribers are updated before the caller's reply is sent.
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::InsertFavorite { record, reply } => {
                let result = storage.insert_favorite(&record);
                if result.is_ok() {
                    publish(&storage, &favorites);
                }
                let _ = reply.send(result);
            }
            DbCommand::DeleteFavorite { media_id, reply } => {
                let result = storage.delete_favorite(media_id);
                if matches!(result, Ok(n) if n > 0) {
                    publish(&storage, &favorites);
                }
                let _ = reply.send(result);
            }
            DbCommand::DeleteAllFavorites { reply } => {
                let result = storage.delete_all_favorites();
                if matches!(result, Ok(n) if n > 0) {
                    publish(&storage, &favorites);
                }
                let _ = reply.send(result);
            }
            DbCommand::ToggleFavorite { record, reply } => {
                let result = storage.toggle_favorite(&record);
                if result.is_ok() {
                    publish(&storage, &favorites);
                }
                let _ = reply.send(result);
            }
            DbCommand::IsFavorite { media_id, reply } => {
                let _ = reply.send(storage.is_favorite(media_id));
            }
            DbCommand::GetFavorite { media_id, reply } => {
                let _ = reply.send(storage.get_favorite(media_id));
            }
            DbCommand::GetAllFavorites { reply } => {
                let _ = reply.send(storage.all_favorites());
            }
        }
    }
    tracing::debug!("DB actor stopped");
}

fn publish(storage: &Storage, favorites: &watch::Sender<Vec<FavoriteRecord>>) {
    match storage.all_favorites() {
        Ok(all) => {
            favorites.send_replace(all);
        }
        Err(e) => tracing::warn!("Failed to refresh favorites view: {e}"),
    }
}
