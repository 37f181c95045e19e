use muviz_api::{CatalogItem, MediaDetails, MediaKind};
use serde::{Deserialize, Serialize};

/// A favorited movie or series, stored locally in `favorites_table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub media_id: u64,
    pub media_type: MediaKind,
    /// Always true while the row exists.
    pub favorite: bool,
    /// Poster path as returned by the catalog service.
    pub image: String,
    pub title: String,
    pub release_date: String,
    pub rating: f32,
    pub overview: Option<String>,
}

impl FavoriteRecord {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            media_id: item.id,
            media_type: item.kind,
            favorite: true,
            image: item.poster_path.clone(),
            title: item.title.clone(),
            release_date: item.release_date.clone(),
            rating: item.rating,
            overview: Some(item.overview.clone()).filter(|o| !o.is_empty()),
        }
    }

    pub fn from_details(details: &MediaDetails) -> Self {
        Self {
            media_id: details.id,
            media_type: details.kind,
            favorite: true,
            image: details.poster_path.clone(),
            title: details.title.clone(),
            release_date: details.release_date.clone(),
            rating: details.rating,
            overview: Some(details.overview.clone()).filter(|o| !o.is_empty()),
        }
    }
}
