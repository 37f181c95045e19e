//! Screen state as immutable values.
//!
//! Each screen's state changes only through `reduce(state, event)`, which
//! returns the next state. Side effects (network, storage) happen outside
//! and come back in as events.

use muviz_api::{CastMember, CatalogItem, Category, Genre, MediaDetails, MediaKind, Page};
use muviz_core::filter::GenreFilter;
use muviz_core::models::FavoriteRecord;

use crate::error::LoadError;
use crate::pager::PagedList;

/// Load state of a single piece of remote or local data.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Ready(T),
    Empty,
    Failed(LoadError),
}

impl<T> Resource<T> {
    pub fn from_result<E: Into<LoadError>>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Failed(e.into()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Empty | Self::Failed(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<T> Resource<Vec<T>> {
    /// Like `from_result`, but an empty list becomes `Empty`.
    pub fn from_list<E: Into<LoadError>>(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(list) if list.is_empty() => Self::Empty,
            other => Self::from_result(other),
        }
    }
}

/// A state value that advances by consuming events.
pub trait Reducer: Clone + Send + Sync + 'static {
    type Event: Send + 'static;

    fn reduce(self, event: Self::Event) -> Self;
}

// ── Home ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct HomeState {
    pub category: Category,
    pub genres: Resource<Vec<Genre>>,
    pub selected_genre: Option<u32>,
    pub list: PagedList,
}

#[derive(Debug, Clone)]
pub enum HomeEvent {
    CategorySelected(Category),
    GenresLoaded(Result<Vec<Genre>, LoadError>),
    GenreSelected(Option<u32>),
    PageRequested,
    PageLoaded(Page),
    PageFailed(LoadError),
    Refresh,
}

impl HomeState {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            genres: Resource::Loading,
            selected_genre: None,
            list: PagedList::default(),
        }
    }

    pub fn filter(&self) -> GenreFilter {
        GenreFilter::new(self.selected_genre)
    }

    /// The page the next `PageRequested` should fetch, if any.
    pub fn next_page(&self) -> Option<u32> {
        self.list.next_key
    }
}

impl Reducer for HomeState {
    type Event = HomeEvent;

    fn reduce(mut self, event: HomeEvent) -> Self {
        match event {
            HomeEvent::CategorySelected(category) => {
                if category.kind() != self.category.kind() {
                    self.genres = Resource::Loading;
                    self.selected_genre = None;
                }
                self.category = category;
                self.list = PagedList::default();
            }
            HomeEvent::GenresLoaded(result) => {
                self.genres = Resource::from_list(result);
            }
            HomeEvent::GenreSelected(genre) => {
                if genre != self.selected_genre {
                    self.selected_genre = genre;
                    self.list = PagedList::default();
                }
            }
            HomeEvent::PageRequested => {
                if !self.list.is_exhausted() {
                    self.list.loading = true;
                    self.list.error = None;
                }
            }
            HomeEvent::PageLoaded(page) => {
                // A page for a cursor we are no longer waiting on is stale.
                if self.list.next_key == Some(page.page) {
                    let filter = self.filter();
                    self.list.apply_page(page, filter);
                }
            }
            HomeEvent::PageFailed(error) => self.list.apply_error(error),
            HomeEvent::Refresh => self.list = PagedList::default(),
        }
        self
    }
}

// ── Details ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsState {
    pub kind: MediaKind,
    pub id: u64,
    pub details: Resource<MediaDetails>,
    pub cast: Resource<Vec<CastMember>>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone)]
pub enum DetailsEvent {
    DetailsLoaded(Result<MediaDetails, LoadError>),
    CastLoaded(Result<Vec<CastMember>, LoadError>),
    FavoriteChanged(bool),
}

impl DetailsState {
    pub fn new(kind: MediaKind, id: u64) -> Self {
        Self {
            kind,
            id,
            details: Resource::Loading,
            cast: Resource::Loading,
            is_favorite: false,
        }
    }

    /// Record to store when the user favorites this title.
    pub fn favorite_record(&self) -> Option<FavoriteRecord> {
        self.details.ready().map(FavoriteRecord::from_details)
    }
}

impl Reducer for DetailsState {
    type Event = DetailsEvent;

    fn reduce(mut self, event: DetailsEvent) -> Self {
        match event {
            DetailsEvent::DetailsLoaded(result) => self.details = Resource::from_result(result),
            DetailsEvent::CastLoaded(result) => self.cast = Resource::from_list(result),
            DetailsEvent::FavoriteChanged(is_favorite) => self.is_favorite = is_favorite,
        }
        self
    }
}

// ── Search ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub generation: u64,
    pub results: Resource<Vec<CatalogItem>>,
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    QueryChanged { query: String, generation: u64 },
    ResultsArrived {
        generation: u64,
        result: Result<Page, LoadError>,
    },
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            generation: 0,
            results: Resource::Empty,
        }
    }
}

impl Reducer for SearchState {
    type Event = SearchEvent;

    fn reduce(mut self, event: SearchEvent) -> Self {
        match event {
            SearchEvent::QueryChanged { query, generation } => {
                self.results = if query.trim().is_empty() {
                    Resource::Empty
                } else {
                    Resource::Loading
                };
                self.query = query;
                self.generation = generation;
            }
            SearchEvent::ResultsArrived { generation, result } => {
                if generation == self.generation {
                    self.results = Resource::from_list(result.map(|page| page.items));
                }
            }
        }
        self
    }
}

// ── Favorites ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesState {
    pub favorites: Resource<Vec<FavoriteRecord>>,
}

#[derive(Debug, Clone)]
pub enum FavoritesEvent {
    Updated(Vec<FavoriteRecord>),
    Failed(LoadError),
}

impl Default for FavoritesState {
    fn default() -> Self {
        Self {
            favorites: Resource::Loading,
        }
    }
}

impl Reducer for FavoritesState {
    type Event = FavoritesEvent;

    fn reduce(mut self, event: FavoritesEvent) -> Self {
        self.favorites = match event {
            FavoritesEvent::Updated(list) => Resource::from_list(Ok::<_, LoadError>(list)),
            FavoritesEvent::Failed(error) => Resource::Failed(error),
        };
        self
    }
}
