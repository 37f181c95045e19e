//! Incremental page loading for catalog lists and search results.

use std::sync::Arc;

use futures::Stream;
use muviz_api::{CatalogItem, CatalogService, Category, Page};
use muviz_core::filter::GenreFilter;

use crate::error::LoadError;

/// What a pager pulls pages from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Category(Category),
    Search(String),
}

impl PageSource {
    pub async fn fetch<S: CatalogService>(&self, service: &S, page: u32) -> Result<Page, S::Error> {
        match self {
            Self::Category(category) => service.fetch_page(*category, page).await,
            Self::Search(query) => service.search(query, page).await,
        }
    }
}

/// Lazily fetch pages starting at 1. The stream ends after the first empty
/// page or the first error; each pull is a fresh request.
pub fn page_stream<S: CatalogService>(
    service: Arc<S>,
    source: PageSource,
) -> impl Stream<Item = Result<Page, S::Error>> {
    futures::stream::try_unfold(Some(1u32), move |next| {
        let service = Arc::clone(&service);
        let source = source.clone();
        async move {
            let Some(page) = next else {
                return Ok::<_, S::Error>(None);
            };
            let fetched = source.fetch(service.as_ref(), page).await?;
            let next = fetched.next_key;
            Ok(Some((fetched, next)))
        }
    })
}

/// Accumulated, already-filtered items of a paged list plus its cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList {
    pub items: Vec<CatalogItem>,
    /// Next page to request; `None` once the source is exhausted.
    pub next_key: Option<u32>,
    pub loading: bool,
    pub error: Option<LoadError>,
    pub pages_loaded: u32,
}

impl Default for PagedList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_key: Some(1),
            loading: false,
            error: None,
            pages_loaded: 0,
        }
    }
}

impl PagedList {
    /// Empty list whose first request is `page`.
    pub fn starting_at(page: u32) -> Self {
        Self {
            next_key: Some(page),
            ..Self::default()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_key.is_none()
    }

    /// True once at least one page came back and nothing passed the filter.
    pub fn is_empty_result(&self) -> bool {
        self.pages_loaded > 0 && self.items.is_empty() && self.is_exhausted()
    }

    /// Append a fetched page. Items already present are skipped so a
    /// shifting remote list never duplicates rows.
    pub fn apply_page(&mut self, page: Page, filter: GenreFilter) {
        let page = filter.apply_page(page);
        for item in page.items {
            if !self.items.iter().any(|i| i.id == item.id && i.kind == item.kind) {
                self.items.push(item);
            }
        }
        self.next_key = page.next_key;
        self.pages_loaded += 1;
        self.loading = false;
        self.error = None;
    }

    /// Record a failed load. The cursor stays put so the same page is retried.
    pub fn apply_error(&mut self, error: LoadError) {
        self.loading = false;
        self.error = Some(error);
    }

    pub fn should_load_more(&self, visible_index: usize, prefetch_distance: usize) -> bool {
        !self.loading
            && self.error.is_none()
            && !self.is_exhausted()
            && visible_index + prefetch_distance >= self.items.len()
    }
}

/// Stateful pager: keeps what was loaded so far and where to continue.
pub struct Pager<S> {
    service: Arc<S>,
    source: PageSource,
    filter: GenreFilter,
    list: PagedList,
    first_page: u32,
    prefetch_distance: usize,
}

/// Marks a list as loading for as long as it lives, so a dropped
/// `load_next` future can't leave the flag set.
struct LoadingGuard<'a> {
    list: &'a mut PagedList,
}

impl<'a> LoadingGuard<'a> {
    fn new(list: &'a mut PagedList) -> Self {
        list.loading = true;
        Self { list }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.list.loading = false;
    }
}

impl<S> Pager<S>
where
    S: CatalogService,
    LoadError: From<S::Error>,
{
    pub fn new(service: Arc<S>, source: PageSource) -> Self {
        Self {
            service,
            source,
            filter: GenreFilter::none(),
            list: PagedList::default(),
            first_page: 1,
            prefetch_distance: 5,
        }
    }

    /// Start at `page` instead of 1. `refresh` returns here too.
    pub fn with_first_page(mut self, page: u32) -> Self {
        self.first_page = page;
        self.list = PagedList::starting_at(page);
        self
    }

    pub fn with_filter(mut self, filter: GenreFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Change the genre selection. Already-loaded items were filtered with the
    /// old selection, so the list restarts from page 1.
    pub fn set_filter(&mut self, filter: GenreFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.refresh();
        }
    }

    pub fn filter(&self) -> GenreFilter {
        self.filter
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.list.items
    }

    pub fn list(&self) -> &PagedList {
        &self.list
    }

    pub fn is_exhausted(&self) -> bool {
        self.list.is_exhausted()
    }

    pub fn should_load_more(&self, visible_index: usize) -> bool {
        self.list
            .should_load_more(visible_index, self.prefetch_distance)
    }

    /// Drop everything and start again from the first page.
    pub fn refresh(&mut self) {
        self.list = PagedList::starting_at(self.first_page);
    }

    /// Fetch the next page and return the number of items it added after
    /// filtering. Returns `Ok(0)` without a request once exhausted. After an
    /// error, the next call retries the same page.
    pub async fn load_next(&mut self) -> Result<usize, LoadError> {
        let Some(page) = self.list.next_key else {
            return Ok(0);
        };
        tracing::debug!(source = ?self.source, page, "loading page");

        let guard = LoadingGuard::new(&mut self.list);
        match self.source.fetch(self.service.as_ref(), page).await {
            Ok(fetched) => {
                let before = guard.list.items.len();
                guard.list.apply_page(fetched, self.filter);
                Ok(guard.list.items.len() - before)
            }
            Err(e) => {
                let err = LoadError::from(e);
                guard.list.apply_error(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use futures::{StreamExt, TryStreamExt};

    use super::*;
    use crate::fake::FakeCatalog;

    #[tokio::test]
    async fn test_stream_yields_pages_until_empty() {
        let service = Arc::new(FakeCatalog::new(3, 4));
        let pages: Vec<Page> = page_stream(service, PageSource::Category(Category::PopularMovies))
            .try_collect()
            .await
            .unwrap();
        // Three full pages, then the empty page that ends the stream.
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].page, 1);
        assert_eq!(pages[0].next_key, Some(2));
        assert!(pages[3].items.is_empty());
        assert_eq!(pages[3].next_key, None);
    }

    #[tokio::test]
    async fn test_stream_stops_after_error() {
        let service = Arc::new(FakeCatalog::new(5, 2));
        service.fail_page(2);
        let results: Vec<_> = page_stream(service, PageSource::Category(Category::TrendingMovies))
            .collect()
            .await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_consecutive_pages_do_not_overlap() {
        let service = Arc::new(FakeCatalog::new(5, 20));
        let mut pager = Pager::new(service, PageSource::Category(Category::TopRatedSeries));
        let mut seen = HashSet::new();
        for _ in 0..5 {
            let before = pager.items().len();
            pager.load_next().await.unwrap();
            for item in &pager.items()[before..] {
                assert!(seen.insert(item.id), "id {} repeated", item.id);
            }
        }
        assert_eq!(seen.len(), 100);
        assert!(!pager.is_exhausted());

        assert_eq!(pager.load_next().await.unwrap(), 0);
        assert!(pager.is_exhausted());
        assert!(pager.list().pages_loaded == 6);
    }

    #[tokio::test]
    async fn test_failed_page_is_retried() {
        let service = Arc::new(FakeCatalog::new(3, 10));
        let mut pager = Pager::new(
            Arc::clone(&service),
            PageSource::Category(Category::UpcomingMovies),
        );
        pager.load_next().await.unwrap();

        service.fail_page(2);
        let err = pager.load_next().await.unwrap_err();
        assert!(matches!(err, LoadError::Server { status: 503, .. }));
        assert_eq!(pager.list().next_key, Some(2));
        assert!(!pager.should_load_more(9));

        // Manual retry of the same page succeeds.
        assert_eq!(pager.load_next().await.unwrap(), 10);
        assert_eq!(pager.items().len(), 20);
        assert!(pager.list().error.is_none());
        assert_eq!(service.requests_for_page(2), 2);
    }

    #[tokio::test]
    async fn test_genre_filter_underfills_pages() {
        let service = Arc::new(FakeCatalog::new(2, 10));
        let mut pager = Pager::new(service, PageSource::Category(Category::PopularMovies))
            .with_filter(GenreFilter::new(Some(FakeCatalog::ACTION)));

        let added = pager.load_next().await.unwrap();
        assert_eq!(added, 5);
        assert!(pager.items().iter().all(|i| i.has_genre(FakeCatalog::ACTION)));
        assert_eq!(pager.list().next_key, Some(2));
    }

    #[tokio::test]
    async fn test_set_filter_restarts() {
        let service = Arc::new(FakeCatalog::new(2, 10));
        let mut pager = Pager::new(service, PageSource::Category(Category::PopularMovies));
        pager.load_next().await.unwrap();
        pager.load_next().await.unwrap();
        assert_eq!(pager.items().len(), 20);

        pager.set_filter(GenreFilter::new(Some(FakeCatalog::COMEDY)));
        assert!(pager.items().is_empty());
        assert_eq!(pager.list().next_key, Some(1));

        pager.load_next().await.unwrap();
        assert_eq!(pager.items().len(), 5);
    }

    #[tokio::test]
    async fn test_should_load_more() {
        let service = Arc::new(FakeCatalog::new(2, 20));
        let mut pager = Pager::new(service, PageSource::Category(Category::PopularSeries))
            .with_prefetch_distance(5);
        assert!(pager.should_load_more(0));

        pager.load_next().await.unwrap();
        assert!(!pager.should_load_more(3));
        assert!(pager.should_load_more(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_can_be_retried() {
        let service = Arc::new(FakeCatalog::new(2, 3));
        service.delay_search("dune", Duration::from_millis(500));
        let mut pager = Pager::new(Arc::clone(&service), PageSource::Search("dune".into()));

        let cancelled = tokio::time::timeout(Duration::from_millis(100), pager.load_next()).await;
        assert!(cancelled.is_err());
        assert!(!pager.list().loading);
        assert!(pager.list().error.is_none());
        assert!(pager.should_load_more(0));

        assert_eq!(pager.load_next().await.unwrap(), 3);
        assert_eq!(pager.list().next_key, Some(2));
    }

    #[tokio::test]
    async fn test_first_page_and_refresh() {
        let service = Arc::new(FakeCatalog::new(5, 2));
        let mut pager = Pager::new(Arc::clone(&service), PageSource::Category(Category::PopularMovies))
            .with_first_page(3);
        pager.load_next().await.unwrap();
        assert_eq!(pager.items()[0].id, 5);
        assert_eq!(service.requests_for_page(1), 0);

        pager.refresh();
        assert_eq!(pager.list().next_key, Some(3));
    }

    #[tokio::test]
    async fn test_search_source() {
        let service = Arc::new(FakeCatalog::new(1, 3));
        let mut pager = Pager::new(service, PageSource::Search("dune".into()));
        pager.load_next().await.unwrap();
        assert_eq!(pager.items().len(), 3);
        assert!(pager.items()[0].title.contains("dune"));
    }

    #[test]
    fn test_paged_list_skips_duplicates() {
        let mut list = PagedList::default();
        let item = |id| CatalogItem {
            id,
            kind: muviz_api::MediaKind::Movie,
            title: String::new(),
            poster_path: String::new(),
            release_date: String::new(),
            genre_ids: vec![],
            rating: 0.0,
            popularity: 0.0,
            overview: String::new(),
        };
        list.apply_page(Page::new(1, vec![item(1), item(2)], 2, 4), GenreFilter::none());
        list.apply_page(Page::new(2, vec![item(2), item(3)], 2, 4), GenreFilter::none());
        let ids: Vec<u64> = list.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!list.is_empty_result());
    }
}
