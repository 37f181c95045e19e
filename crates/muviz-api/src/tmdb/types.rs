use serde::Deserialize;

use crate::traits::{CastMember, CatalogItem, Genre, MediaDetails, MediaKind, Page};

// ── Paged list responses ────────────────────────────────────────

/// A paged list response. Catalog lists use `results`; some search
/// payloads name the same array `searches`.
#[derive(Debug, Deserialize)]
pub struct TmdbPageResponse {
    pub page: u32,
    #[serde(alias = "searches", default)]
    pub results: Vec<TmdbMediaResult>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// A movie, series or person entry inside a paged response.
#[derive(Debug, Deserialize)]
pub struct TmdbMediaResult {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub vote_average: Option<f32>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
}

// ── Genres, details, credits ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbGenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbDetailsResponse {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub vote_average: Option<f32>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCreditsResponse {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct TmdbStatusBody {
    pub status_code: Option<u32>,
    pub status_message: String,
}

// ── Conversions ──────────────────────────────────────────────────

impl TmdbMediaResult {
    /// Convert to a catalog item. `kind` is used when the entry carries no
    /// `media_type` (plain category lists). Person entries yield `None`.
    pub fn into_catalog_item(self, kind: Option<MediaKind>) -> Option<CatalogItem> {
        let kind = match self.media_type.as_deref() {
            Some(t) => MediaKind::from_db_str(t)?,
            None => kind?,
        };
        let (title, date) = match kind {
            MediaKind::Movie => (self.title.or(self.name), self.release_date),
            MediaKind::Tv => (self.name.or(self.title), self.first_air_date),
        };

        Some(CatalogItem {
            id: self.id,
            kind,
            title: title.unwrap_or_default(),
            poster_path: self.poster_path.unwrap_or_default(),
            release_date: date.unwrap_or_default(),
            genre_ids: self.genre_ids,
            rating: self.vote_average.unwrap_or_default(),
            popularity: self.popularity.unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
        })
    }
}

impl TmdbPageResponse {
    /// Results that aren't movies or series (people, unknown types) are
    /// skipped, but the page still counts as non-empty for paging.
    pub fn into_page(self, kind: Option<MediaKind>) -> Page {
        let next_key = Page::next_key_after(self.page, self.results.is_empty());
        let items = self
            .results
            .into_iter()
            .filter_map(|r| r.into_catalog_item(kind))
            .collect();
        Page::new(self.page, items, self.total_pages, self.total_results).with_next_key(next_key)
    }
}

impl TmdbDetailsResponse {
    pub fn into_details(self, kind: MediaKind) -> MediaDetails {
        let (title, date, runtime) = match kind {
            MediaKind::Movie => (self.title.or(self.name), self.release_date, self.runtime),
            MediaKind::Tv => (
                self.name.or(self.title),
                self.first_air_date,
                self.episode_run_time.first().copied(),
            ),
        };

        MediaDetails {
            id: self.id,
            kind,
            title: title.unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path.unwrap_or_default(),
            backdrop_path: self.backdrop_path.unwrap_or_default(),
            release_date: date.unwrap_or_default(),
            genres: self.genres,
            rating: self.vote_average.unwrap_or_default(),
            runtime,
            status: self.status,
            tagline: self.tagline.filter(|t| !t.is_empty()),
        }
    }
}

impl TmdbCreditsResponse {
    pub fn into_cast(self) -> Vec<CastMember> {
        let mut cast: Vec<CastMember> = self
            .cast
            .into_iter()
            .map(|c| CastMember {
                id: c.id,
                name: c.name,
                character: c.character.unwrap_or_default(),
                profile_path: c.profile_path.unwrap_or_default(),
                order: c.order,
            })
            .collect();
        cast.sort_by_key(|c| c.order);
        cast
    }
}
