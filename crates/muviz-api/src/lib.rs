//! Catalog service interface and the TMDB v3 client.

pub mod tmdb;
pub mod traits;

pub use traits::{
    CastMember, CatalogItem, CatalogService, Category, Genre, MediaDetails, MediaKind, Page,
};
