//! Client-side genre filtering over already-fetched catalog pages.
//!
//! Filtering never fetches extra pages to fill a page back up: a filtered
//! page may hold fewer items than the raw page, and its `next_key` is the
//! unfiltered page's key, so "load more" follows the underlying stream.

use futures::{Stream, StreamExt};
use muviz_api::{CatalogItem, Page};
use serde::{Deserialize, Serialize};

/// An optional genre selection. `None` passes everything through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreFilter {
    pub genre_id: Option<u32>,
}

impl GenreFilter {
    pub fn new(genre_id: Option<u32>) -> Self {
        Self { genre_id }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.genre_id.is_some()
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self.genre_id {
            Some(id) => item.has_genre(id),
            None => true,
        }
    }

    /// Keep only matching items, preserving order.
    pub fn apply(&self, items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        if !self.is_active() {
            return items;
        }
        items.into_iter().filter(|i| self.matches(i)).collect()
    }

    /// Filter a page's items. Page number, counters and `next_key` are untouched.
    pub fn apply_page(&self, mut page: Page) -> Page {
        page.items = self.apply(page.items);
        page
    }

    /// Lazily filter a stream of fetched pages. Errors pass through unchanged.
    pub fn filter_pages<S, E>(self, pages: S) -> impl Stream<Item = Result<Page, E>>
    where
        S: Stream<Item = Result<Page, E>>,
    {
        pages.map(move |page| page.map(|p| self.apply_page(p)))
    }

    /// Lazily flatten a stream of fetched pages into matching items.
    pub fn filter_items<S, E>(self, pages: S) -> impl Stream<Item = Result<CatalogItem, E>>
    where
        S: Stream<Item = Result<Page, E>>,
    {
        self.filter_pages(pages).flat_map(|page| {
            let items: Vec<Result<CatalogItem, E>> = match page {
                Ok(p) => p.items.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(items)
        })
    }
}

impl From<Option<u32>> for GenreFilter {
    fn from(genre_id: Option<u32>) -> Self {
        Self::new(genre_id)
    }
}
