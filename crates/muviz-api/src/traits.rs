//! Trait definitions for movie/series catalog services.
//!
//! The TMDB client implements [`CatalogService`], which lets the pager,
//! search session and runtime stay independent of the concrete backend.

use std::future::Future;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A unified movie/series catalog interface.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page of a catalog category. Pages start at 1.
    fn fetch_page(
        &self,
        category: Category,
        page: u32,
    ) -> impl Future<Output = Result<Page, Self::Error>> + Send;

    /// List the genres known for a media kind.
    fn genres(&self, kind: MediaKind)
        -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send;

    /// Fetch full details for a single title.
    fn details(
        &self,
        kind: MediaKind,
        id: u64,
    ) -> impl Future<Output = Result<MediaDetails, Self::Error>> + Send;

    /// Fetch the cast of a title, in billing order.
    fn credits(
        &self,
        kind: MediaKind,
        id: u64,
    ) -> impl Future<Output = Result<Vec<CastMember>, Self::Error>> + Send;

    /// Search movies and series by free text. Pages start at 1.
    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<Page, Self::Error>> + Send;
}

/// Movie or TV series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub const ALL: &[MediaKind] = &[Self::Movie, Self::Tv];

    /// Path segment and stored `mediaType` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Tv => write!(f, "Series"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "tv" | "series" | "show" => Ok(Self::Tv),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// One of the fixed catalog lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TrendingMovies,
    PopularMovies,
    TopRatedMovies,
    UpcomingMovies,
    NowPlayingMovies,
    TrendingSeries,
    PopularSeries,
    TopRatedSeries,
    AiringTodaySeries,
    OnTheAirSeries,
}

impl Category {
    pub const ALL: &[Category] = &[
        Self::TrendingMovies,
        Self::PopularMovies,
        Self::TopRatedMovies,
        Self::UpcomingMovies,
        Self::NowPlayingMovies,
        Self::TrendingSeries,
        Self::PopularSeries,
        Self::TopRatedSeries,
        Self::AiringTodaySeries,
        Self::OnTheAirSeries,
    ];

    pub fn kind(self) -> MediaKind {
        match self {
            Self::TrendingMovies
            | Self::PopularMovies
            | Self::TopRatedMovies
            | Self::UpcomingMovies
            | Self::NowPlayingMovies => MediaKind::Movie,
            Self::TrendingSeries
            | Self::PopularSeries
            | Self::TopRatedSeries
            | Self::AiringTodaySeries
            | Self::OnTheAirSeries => MediaKind::Tv,
        }
    }

    /// TMDB endpoint path, relative to the API base.
    pub fn path(self) -> &'static str {
        match self {
            Self::TrendingMovies => "trending/movie/day",
            Self::PopularMovies => "movie/popular",
            Self::TopRatedMovies => "movie/top_rated",
            Self::UpcomingMovies => "movie/upcoming",
            Self::NowPlayingMovies => "movie/now_playing",
            Self::TrendingSeries => "trending/tv/day",
            Self::PopularSeries => "tv/popular",
            Self::TopRatedSeries => "tv/top_rated",
            Self::AiringTodaySeries => "tv/airing_today",
            Self::OnTheAirSeries => "tv/on_the_air",
        }
    }

    /// Short identifier used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Self::TrendingMovies => "trending-movies",
            Self::PopularMovies => "popular-movies",
            Self::TopRatedMovies => "top-rated-movies",
            Self::UpcomingMovies => "upcoming-movies",
            Self::NowPlayingMovies => "now-playing-movies",
            Self::TrendingSeries => "trending-series",
            Self::PopularSeries => "popular-series",
            Self::TopRatedSeries => "top-rated-series",
            Self::AiringTodaySeries => "airing-today-series",
            Self::OnTheAirSeries => "on-the-air-series",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::TrendingMovies => "Trending Movies",
            Self::PopularMovies => "Popular Movies",
            Self::TopRatedMovies => "Top Rated Movies",
            Self::UpcomingMovies => "Upcoming Movies",
            Self::NowPlayingMovies => "Now Playing",
            Self::TrendingSeries => "Trending Series",
            Self::PopularSeries => "Popular Series",
            Self::TopRatedSeries => "Top Rated Series",
            Self::AiringTodaySeries => "Airing Today",
            Self::OnTheAirSeries => "On The Air",
        };
        f.write_str(label)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// A movie or series as listed in a catalog page or search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    /// Empty when the service has no poster.
    pub poster_path: String,
    /// Free-form; empty when unknown.
    pub release_date: String,
    pub genre_ids: Vec<u32>,
    pub rating: f32,
    pub popularity: f64,
    pub overview: String,
}

impl CatalogItem {
    pub fn has_genre(&self, genre_id: u32) -> bool {
        self.genre_ids.contains(&genre_id)
    }

    /// Year of the release/air date, if the date is a valid `YYYY-MM-DD`.
    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub page: u32,
    pub items: Vec<CatalogItem>,
    /// `page + 1`, or `None` once a page comes back empty.
    pub next_key: Option<u32>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl Page {
    pub fn new(page: u32, items: Vec<CatalogItem>, total_pages: u32, total_results: u32) -> Self {
        let next_key = Self::next_key_after(page, items.is_empty());
        Self {
            page,
            items,
            next_key,
            total_pages,
            total_results,
        }
    }

    /// Key following `page`. `None` once the server returned an empty page,
    /// or when there is no representable next page.
    pub fn next_key_after(page: u32, server_page_empty: bool) -> Option<u32> {
        if server_page_empty {
            None
        } else {
            page.checked_add(1)
        }
    }

    pub fn with_next_key(mut self, next_key: Option<u32>) -> Self {
        self.next_key = next_key;
        self
    }

    pub fn is_last(&self) -> bool {
        self.next_key.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Full details for a single title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub backdrop_path: String,
    pub release_date: String,
    pub genres: Vec<Genre>,
    pub rating: f32,
    /// Minutes; episode runtime for series.
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: String,
    pub profile_path: String,
    pub order: u32,
}
