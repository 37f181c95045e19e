use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::TmdbError;
use super::types::{
    TmdbCreditsResponse, TmdbDetailsResponse, TmdbGenreListResponse, TmdbPageResponse,
    TmdbStatusBody,
};
use crate::traits::{CastMember, CatalogService, Category, Genre, MediaDetails, MediaKind, Page};

const BASE_URL: &str = "https://api.themoviedb.org/3/";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
const DEFAULT_LANGUAGE: &str = "en-US";

/// Poster/profile image widths served by the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Thumb,
    Poster,
    Backdrop,
    Original,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thumb => "w185",
            Self::Poster => "w342",
            Self::Backdrop => "w780",
            Self::Original => "original",
        }
    }
}

/// TMDB v3 REST client.
///
/// Cheap to clone; clones share the underlying connection pool, so
/// concurrent fetches for different categories never wait on each other.
#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: Url,
    image_base_url: String,
    language: String,
    http: Client,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: Url::parse(BASE_URL).expect("built-in TMDB base URL is valid"),
            image_base_url: IMAGE_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at another API root (a proxy or a local mock).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, TmdbError> {
        self.base_url = parse_base(base_url)?;
        Ok(self)
    }

    pub fn with_image_base_url(mut self, image_base_url: &str) -> Self {
        let mut base = image_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.image_base_url = base;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, TmdbError> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Full image URL for a poster/backdrop/profile path. Empty paths have no image.
    pub fn image_url(&self, path: &str, size: ImageSize) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        let path = path.trim_start_matches('/');
        Some(format!("{}{}/{path}", self.image_base_url, size.as_str()))
    }

    /// Check the HTTP response for errors and return the status message on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TmdbStatusBody>(&body)
                .map(|b| b.status_message)
                .unwrap_or(body);
            tracing::warn!(status, %message, "TMDB API error");
            Err(TmdbError::Server { status, message })
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        if self.api_key.is_empty() {
            return Err(TmdbError::InvalidRequest("no TMDB API key configured".into()));
        }
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TmdbError::InvalidRequest(e.to_string()))?;

        tracing::debug!(%path, ?query, "TMDB request");
        let resp = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(query)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

fn parse_base(base_url: &str) -> Result<Url, TmdbError> {
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| TmdbError::InvalidRequest(format!("bad base URL: {e}")))
}

fn check_page(page: u32) -> Result<(), TmdbError> {
    if page == 0 {
        return Err(TmdbError::InvalidRequest("pages start at 1".into()));
    }
    Ok(())
}

impl CatalogService for TmdbClient {
    type Error = TmdbError;

    async fn fetch_page(&self, category: Category, page: u32) -> Result<Page, TmdbError> {
        check_page(page)?;
        let body: TmdbPageResponse = self
            .get(category.path(), &[("page", page.to_string())])
            .await?;
        Ok(body.into_page(Some(category.kind())))
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, TmdbError> {
        let body: TmdbGenreListResponse = self
            .get(&format!("genre/{}/list", kind.as_str()), &[])
            .await?;
        Ok(body.genres)
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, TmdbError> {
        let body: TmdbDetailsResponse = self.get(&format!("{}/{id}", kind.as_str()), &[]).await?;
        Ok(body.into_details(kind))
    }

    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Vec<CastMember>, TmdbError> {
        let body: TmdbCreditsResponse = self
            .get(&format!("{}/{id}/credits", kind.as_str()), &[])
            .await?;
        Ok(body.into_cast())
    }

    async fn search(&self, query: &str, page: u32) -> Result<Page, TmdbError> {
        check_page(page)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(TmdbError::InvalidRequest("empty search query".into()));
        }
        let body: TmdbPageResponse = self
            .get(
                "search/multi",
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;
        Ok(body.into_page(None))
    }
}
