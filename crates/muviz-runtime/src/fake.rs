//! In-process catalog used by the runtime tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use muviz_api::tmdb::TmdbError;
use muviz_api::{
    CastMember, CatalogItem, CatalogService, Category, Genre, MediaDetails, MediaKind, Page,
};

/// Serves `total_pages` pages of `page_size` items per category; later pages are empty.
pub struct FakeCatalog {
    total_pages: u32,
    page_size: u32,
    failing_pages: Mutex<HashSet<u32>>,
    requests: Mutex<HashMap<u32, usize>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    detail_delay: Duration,
}

impl FakeCatalog {
    pub const ACTION: u32 = 28;
    pub const COMEDY: u32 = 35;

    pub fn new(total_pages: u32, page_size: u32) -> Self {
        Self {
            total_pages,
            page_size,
            failing_pages: Mutex::new(HashSet::new()),
            requests: Mutex::new(HashMap::new()),
            search_delays: Mutex::new(HashMap::new()),
            detail_delay: Duration::ZERO,
        }
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    /// The next request for `page` fails with a 503.
    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn requests_for_page(&self, page: u32) -> usize {
        self.requests
            .lock()
            .unwrap()
            .get(&page)
            .copied()
            .unwrap_or(0)
    }

    fn page(&self, kind: MediaKind, page: u32, title: &str) -> Result<Page, TmdbError> {
        *self.requests.lock().unwrap().entry(page).or_default() += 1;
        if self.failing_pages.lock().unwrap().remove(&page) {
            return Err(TmdbError::Server {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        if page > self.total_pages {
            return Ok(Page::new(page, vec![], self.total_pages, self.total()));
        }

        let start = u64::from((page - 1) * self.page_size);
        let items = (start..start + u64::from(self.page_size))
            .map(|id| item(id + 1, kind, &format!("{title} #{}", id + 1)))
            .collect();
        Ok(Page::new(page, items, self.total_pages, self.total()))
    }

    fn total(&self) -> u32 {
        self.total_pages * self.page_size
    }
}

pub fn item(id: u64, kind: MediaKind, title: &str) -> CatalogItem {
    let genre = if id % 2 == 0 {
        FakeCatalog::ACTION
    } else {
        FakeCatalog::COMEDY
    };
    CatalogItem {
        id,
        kind,
        title: title.to_string(),
        poster_path: format!("/{id}.jpg"),
        release_date: "2024-01-01".into(),
        genre_ids: vec![genre],
        rating: 7.0,
        popularity: 10.0,
        overview: format!("Overview of {title}"),
    }
}

impl CatalogService for FakeCatalog {
    type Error = TmdbError;

    async fn fetch_page(&self, category: Category, page: u32) -> Result<Page, TmdbError> {
        if page == 0 {
            return Err(TmdbError::InvalidRequest("pages start at 1".into()));
        }
        self.page(category.kind(), page, &category.to_string())
    }

    async fn genres(&self, _kind: MediaKind) -> Result<Vec<Genre>, TmdbError> {
        Ok(vec![
            Genre {
                id: Self::ACTION,
                name: "Action".into(),
            },
            Genre {
                id: Self::COMEDY,
                name: "Comedy".into(),
            },
        ])
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, TmdbError> {
        tokio::time::sleep(self.detail_delay).await;
        if id == 0 {
            return Err(TmdbError::Server {
                status: 404,
                message: "The resource you requested could not be found.".into(),
            });
        }
        Ok(MediaDetails {
            id,
            kind,
            title: format!("Title {id}"),
            overview: "Overview".into(),
            poster_path: format!("/{id}.jpg"),
            backdrop_path: String::new(),
            release_date: "2024-01-01".into(),
            genres: vec![],
            rating: 7.0,
            runtime: Some(120),
            status: Some("Released".into()),
            tagline: None,
        })
    }

    async fn credits(&self, _kind: MediaKind, id: u64) -> Result<Vec<CastMember>, TmdbError> {
        Ok((0..3)
            .map(|order| CastMember {
                id: id * 10 + u64::from(order),
                name: format!("Actor {order}"),
                character: format!("Role {order}"),
                profile_path: String::new(),
                order,
            })
            .collect())
    }

    async fn search(&self, query: &str, page: u32) -> Result<Page, TmdbError> {
        let delay = self
            .search_delays
            .lock()
            .unwrap()
            .get(query)
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        self.page(MediaKind::Movie, page, query)
    }
}
