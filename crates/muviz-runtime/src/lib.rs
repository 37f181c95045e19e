//! UI-agnostic application runtime: catalog access, favorites, paging,
//! search and screen state.

mod db;
pub mod error;
pub mod pager;
pub mod search;
pub mod state;
pub mod store;

#[cfg(test)]
mod fake;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use muviz_api::tmdb::TmdbClient;
use muviz_api::{CatalogService, Category, Genre, MediaKind, Page};
use muviz_core::config::AppConfig;
use muviz_core::error::MuvizError;
use muviz_core::filter::GenreFilter;
use muviz_core::models::FavoriteRecord;

pub use db::DbHandle;
pub use error::LoadError;
pub use pager::{page_stream, PageSource, PagedList, Pager};
pub use search::{SearchOutcome, SearchSession};
pub use state::{DetailsEvent, DetailsState, Reducer, Resource};
pub use store::Store;

/// Catalog service, favorites storage and session caches, shared by all screens.
pub struct Runtime<S = TmdbClient> {
    service: Arc<S>,
    db: DbHandle,
    config: AppConfig,
    genres: Arc<RwLock<HashMap<MediaKind, Vec<Genre>>>>,
}

impl Runtime<TmdbClient> {
    /// Load config, build the TMDB client and open the favorites database.
    pub fn new() -> Result<Self, MuvizError> {
        Self::from_config(AppConfig::load()?)
    }

    pub fn from_config(config: AppConfig) -> Result<Self, MuvizError> {
        let client = config.tmdb_client()?;
        let db = DbHandle::open(&AppConfig::ensure_db_path()?)?;
        Ok(Self::with_parts(client, db, config))
    }
}

impl<S> Runtime<S>
where
    S: CatalogService + 'static,
    LoadError: From<S::Error>,
{
    pub fn with_parts(service: S, db: DbHandle, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            db,
            config,
            genres: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn db(&self) -> &DbHandle {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ── Catalog ─────────────────────────────────────────────────

    pub async fn catalog_page(&self, category: Category, page: u32) -> Result<Page, LoadError> {
        Ok(self.service.fetch_page(category, page).await?)
    }

    /// Pager over a category or search, filtered by an optional genre.
    pub fn pager(&self, source: PageSource, genre: Option<u32>) -> Pager<S> {
        Pager::new(Arc::clone(&self.service), source)
            .with_filter(GenreFilter::new(genre))
            .with_prefetch_distance(self.config.paging.prefetch_distance)
    }

    /// Genres for a media kind, fetched once per session.
    pub async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, LoadError> {
        if let Some(cached) = self.genres.read().await.get(&kind) {
            return Ok(cached.clone());
        }
        let fetched = self.service.genres(kind).await?;
        self.genres.write().await.insert(kind, fetched.clone());
        Ok(fetched)
    }

    /// Load details, cast and favorite status concurrently. Each section
    /// succeeds or fails on its own.
    pub async fn load_details(&self, kind: MediaKind, id: u64) -> DetailsState {
        let (details, cast, favorite) = tokio::join!(
            self.service.details(kind, id),
            self.service.credits(kind, id),
            self.db.is_favorite(id),
        );

        let mut state = DetailsState::new(kind, id)
            .reduce(DetailsEvent::DetailsLoaded(details.map_err(LoadError::from)))
            .reduce(DetailsEvent::CastLoaded(cast.map_err(LoadError::from)));
        match favorite {
            Ok(is_favorite) => state = state.reduce(DetailsEvent::FavoriteChanged(is_favorite)),
            Err(e) => tracing::warn!(id, "favorite lookup failed: {e}"),
        }
        state
    }

    pub fn search_session(&self) -> SearchSession<S> {
        SearchSession::new(Arc::clone(&self.service))
    }

    // ── Favorites ───────────────────────────────────────────────

    pub async fn add_favorite(&self, record: FavoriteRecord) -> Result<(), LoadError> {
        Ok(self.db.insert_favorite(record).await?)
    }

    pub async fn remove_favorite(&self, media_id: u64) -> Result<(), LoadError> {
        self.db.delete_favorite(media_id).await?;
        Ok(())
    }

    /// Favorite if absent, unfavorite if present. Returns the new state.
    pub async fn toggle_favorite(&self, record: FavoriteRecord) -> Result<bool, LoadError> {
        Ok(self.db.toggle_favorite(record).await?)
    }

    pub async fn is_favorite(&self, media_id: u64) -> Result<bool, LoadError> {
        Ok(self.db.is_favorite(media_id).await?)
    }

    pub async fn clear_favorites(&self) -> Result<usize, LoadError> {
        Ok(self.db.delete_all_favorites().await?)
    }

    /// Live favorites list, newest media id first.
    pub fn favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.db.subscribe_favorites()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fake::FakeCatalog;

    fn runtime(service: FakeCatalog) -> Runtime<FakeCatalog> {
        Runtime::with_parts(service, DbHandle::open_memory().unwrap(), AppConfig::default())
    }

    #[tokio::test]
    async fn test_catalog_page_scenario() {
        let rt = runtime(FakeCatalog::new(5, 1));
        let page = rt.catalog_page(Category::TrendingMovies, 1).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 1);
        assert_eq!(page.next_key, Some(2));

        let end = rt.catalog_page(Category::TrendingMovies, 6).await.unwrap();
        assert!(end.items.is_empty());
        assert_eq!(end.next_key, None);

        let err = rt.catalog_page(Category::TrendingMovies, 0).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_favorite_scenario() {
        let rt = runtime(FakeCatalog::new(1, 1));
        let record = FavoriteRecord::from_item(&crate::fake::item(42, MediaKind::Movie, "Heat"));

        rt.add_favorite(record.clone()).await.unwrap();
        assert!(rt.is_favorite(42).await.unwrap());
        assert_eq!(
            rt.add_favorite(record.clone()).await.unwrap_err(),
            LoadError::AlreadyFavorite
        );

        rt.remove_favorite(record.media_id).await.unwrap();
        assert!(!rt.is_favorite(42).await.unwrap());
        rt.remove_favorite(42).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_favorites_empties_live_list() {
        let rt = runtime(FakeCatalog::new(1, 1));
        for id in [1, 2, 3] {
            let item = crate::fake::item(id, MediaKind::Tv, "Show");
            assert!(rt.toggle_favorite(FavoriteRecord::from_item(&item)).await.unwrap());
        }
        let favorites = rt.favorites();
        assert_eq!(favorites.borrow().len(), 3);

        assert_eq!(rt.clear_favorites().await.unwrap(), 3);
        assert!(favorites.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_genres_cached_per_kind() {
        let rt = runtime(FakeCatalog::new(1, 1));
        let movie = rt.genres(MediaKind::Movie).await.unwrap();
        assert_eq!(movie.len(), 2);
        assert!(rt.genres.read().await.contains_key(&MediaKind::Movie));
        assert!(!rt.genres.read().await.contains_key(&MediaKind::Tv));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_details() {
        let rt = runtime(FakeCatalog::new(1, 1).with_detail_delay(Duration::from_millis(200)));
        rt.add_favorite(FavoriteRecord::from_item(&crate::fake::item(
            7,
            MediaKind::Movie,
            "Se7en",
        )))
        .await
        .unwrap();

        let state = rt.load_details(MediaKind::Movie, 7).await;
        assert_eq!(state.details.ready().unwrap().title, "Title 7");
        assert_eq!(state.cast.ready().unwrap().len(), 3);
        assert!(state.is_favorite);
        assert_eq!(state.favorite_record().unwrap().media_id, 7);
    }

    #[tokio::test]
    async fn test_details_failure_keeps_cast() {
        let rt = runtime(FakeCatalog::new(1, 1));
        let state = rt.load_details(MediaKind::Movie, 0).await;
        assert!(matches!(
            state.details,
            Resource::Failed(LoadError::Server { status: 404, .. })
        ));
        assert!(state.cast.ready().is_some());
        assert!(!state.is_favorite);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_fetch_independently() {
        let rt = runtime(FakeCatalog::new(2, 5));
        let mut movies = rt.pager(PageSource::Category(Category::PopularMovies), None);
        let mut series = rt.pager(PageSource::Category(Category::OnTheAirSeries), None);

        let (a, b) = tokio::join!(movies.load_next(), series.load_next());
        assert_eq!(a.unwrap(), 5);
        assert_eq!(b.unwrap(), 5);
        assert_eq!(movies.items()[0].kind, MediaKind::Movie);
        assert_eq!(series.items()[0].kind, MediaKind::Tv);
    }

    #[tokio::test]
    async fn test_pager_uses_configured_prefetch() {
        let mut config = AppConfig::default();
        config.paging.prefetch_distance = 0;
        let rt = Runtime::with_parts(
            FakeCatalog::new(1, 10),
            DbHandle::open_memory().unwrap(),
            config,
        );
        let mut pager = rt.pager(PageSource::Category(Category::PopularMovies), None);
        pager.load_next().await.unwrap();
        assert!(!pager.should_load_more(5));
        assert!(pager.should_load_more(10));
    }

    #[tokio::test]
    async fn test_pager_from_later_page_with_genre() {
        let rt = runtime(FakeCatalog::new(4, 4));
        let mut pager = rt
            .pager(PageSource::Category(Category::PopularMovies), Some(FakeCatalog::ACTION))
            .with_first_page(2);
        pager.load_next().await.unwrap();
        pager.load_next().await.unwrap();

        let ids: Vec<u64> = pager.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![6, 8, 10, 12]);
        assert_eq!(pager.list().next_key, Some(4));
        assert_eq!(rt.service().requests_for_page(1), 0);
    }
}
