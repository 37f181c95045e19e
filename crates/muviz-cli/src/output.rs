//! Plain-text rendering for terminal output.

use muviz_api::{CastMember, CatalogItem, Genre, MediaDetails};
use muviz_core::models::FavoriteRecord;
use muviz_runtime::{DetailsState, Resource};

pub fn item_line(item: &CatalogItem) -> String {
    let year = item
        .release_year()
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    format!(
        "{:>8}  {:<5}  {:>4.1}  {}{year}",
        item.id,
        item.kind.as_str(),
        item.rating,
        item.title
    )
}

pub fn favorite_line(record: &FavoriteRecord) -> String {
    let year = record
        .release_date
        .get(..4)
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    format!(
        "{:>8}  {:<5}  {:>4.1}  {}{year}",
        record.media_id,
        record.media_type.as_str(),
        record.rating,
        record.title
    )
}

pub fn genre_line(genre: &Genre) -> String {
    format!("{:>6}  {}", genre.id, genre.name)
}

fn details_block(details: &MediaDetails) -> String {
    let mut out = format!("{} [{} {}]\n", details.title, details.kind, details.id);
    if let Some(tagline) = &details.tagline {
        out.push_str(&format!("\"{tagline}\"\n"));
    }
    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    if !genres.is_empty() {
        out.push_str(&format!("Genres:   {}\n", genres.join(", ")));
    }
    if !details.release_date.is_empty() {
        out.push_str(&format!("Released: {}\n", details.release_date));
    }
    if let Some(minutes) = details.runtime {
        out.push_str(&format!("Runtime:  {minutes} min\n"));
    }
    if let Some(status) = &details.status {
        out.push_str(&format!("Status:   {status}\n"));
    }
    out.push_str(&format!("Rating:   {:.1}\n", details.rating));
    if !details.overview.is_empty() {
        out.push('\n');
        out.push_str(&details.overview);
        out.push('\n');
    }
    out
}

fn cast_line(member: &CastMember) -> String {
    if member.character.is_empty() {
        format!("  {}", member.name)
    } else {
        format!("  {} as {}", member.name, member.character)
    }
}

/// Render every section of a details screen, each with its own outcome.
pub fn details_screen(state: &DetailsState) -> String {
    let mut out = match &state.details {
        Resource::Ready(details) => details_block(details),
        Resource::Failed(e) => format!("Details unavailable: {}\n", e.user_message()),
        Resource::Empty | Resource::Loading => String::new(),
    };
    if state.is_favorite {
        out.push_str("★ In favorites\n");
    }

    out.push_str("\nCast:\n");
    match &state.cast {
        Resource::Ready(cast) => {
            for member in cast.iter().take(10) {
                out.push_str(&cast_line(member));
                out.push('\n');
            }
        }
        Resource::Empty => out.push_str("  (no cast listed)\n"),
        Resource::Failed(e) => out.push_str(&format!("  unavailable: {}\n", e.user_message())),
        Resource::Loading => {}
    }
    out
}
