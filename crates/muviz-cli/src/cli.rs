use clap::{Parser, Subcommand};

use muviz_api::{Category, MediaKind};

#[derive(Parser, Debug)]
#[command(name = "muviz", version, about = "Browse movie and TV catalogs from TMDB")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a catalog category, e.g. `trending-movies` or `on-the-air-series`
    List {
        category: Category,
        /// First page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Only keep titles tagged with this genre id
        #[arg(long)]
        genre: Option<u32>,
    },
    /// List the genres available for movies or series
    Genres { kind: MediaKind },
    /// Search movies and series by title
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show details and cast for one title
    Details { kind: MediaKind, id: u64 },
    /// Manage local favorites
    #[command(subcommand)]
    Fav(FavCommand),
    /// Print the effective configuration and file locations
    Config,
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// List favorites, newest id first
    List,
    /// Fetch a title and add it to favorites
    Add { kind: MediaKind, id: u64 },
    /// Add a title if it isn't a favorite yet, remove it otherwise
    Toggle { kind: MediaKind, id: u64 },
    /// Remove a favorite by id
    Remove { id: u64 },
    /// Remove all favorites
    Clear,
}
