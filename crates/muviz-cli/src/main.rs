mod cli;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use muviz_api::{CatalogService, Category, MediaKind};
use muviz_core::config::AppConfig;
use muviz_core::error::MuvizError;
use muviz_core::models::FavoriteRecord;
use muviz_runtime::{LoadError, PageSource, Runtime};

use cli::{Cli, Command, FavCommand};

const FALLBACK_LOG_FILTER: &str = "muviz=info";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Setup(#[from] MuvizError),
    #[error("{}", .0.user_message())]
    Load(#[from] LoadError),
    #[error("{0}")]
    Usage(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(FALLBACK_LOG_FILTER);
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.general.log_filter);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("command failed: {e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, config: AppConfig) -> Result<(), CliError> {
    // Showing the config must work even when the client can't be built.
    if let Command::Config = command {
        return show_config(&config);
    }

    let rt = Runtime::from_config(config)?;
    match command {
        Command::List {
            category,
            page,
            pages,
            genre,
        } => list(&rt, category, page, pages, genre).await,
        Command::Genres { kind } => {
            for genre in rt.genres(kind).await? {
                println!("{}", output::genre_line(&genre));
            }
            Ok(())
        }
        Command::Search { query, page } => search(&rt, &query, page).await,
        Command::Details { kind, id } => {
            let state = rt.load_details(kind, id).await;
            print!("{}", output::details_screen(&state));
            Ok(())
        }
        Command::Fav(fav) => favorites(&rt, fav).await,
        Command::Config => show_config(rt.config()),
    }
}

async fn list(
    rt: &Runtime,
    category: Category,
    first_page: u32,
    pages: u32,
    genre: Option<u32>,
) -> Result<(), CliError> {
    if first_page == 0 {
        return Err(CliError::Usage("pages start at 1".into()));
    }

    let mut pager = rt
        .pager(PageSource::Category(category), genre)
        .with_first_page(first_page);
    for _ in 0..pages {
        if pager.is_exhausted() {
            break;
        }
        pager.load_next().await?;
    }

    println!("{category}");
    if pager.items().is_empty() {
        println!("(nothing to show)");
    }
    for item in pager.items() {
        println!("{}", output::item_line(item));
    }
    if let Some(next) = pager.list().next_key {
        println!("-- more available from page {next}");
    }
    Ok(())
}

async fn search(rt: &Runtime, query: &str, page: u32) -> Result<(), CliError> {
    let results = if page == 1 {
        let mut session = rt.search_session();
        session.submit(query);
        match session.next_result().await {
            Some(outcome) => outcome.result.map_err(LoadError::from)?,
            None => return Ok(()),
        }
    } else {
        rt.service()
            .search(query, page)
            .await
            .map_err(LoadError::from)?
    };

    if results.items.is_empty() {
        println!("No results for \"{}\"", query.trim());
    }
    for item in &results.items {
        println!("{}", output::item_line(item));
    }
    Ok(())
}

async fn favorites(rt: &Runtime, command: FavCommand) -> Result<(), CliError> {
    match command {
        FavCommand::List => {
            let favorites = rt.favorites().borrow().clone();
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for record in &favorites {
                println!("{}", output::favorite_line(record));
            }
        }
        FavCommand::Add { kind, id } => {
            let record = fetch_record(rt, kind, id).await?;
            let title = record.title.clone();
            rt.add_favorite(record).await?;
            println!("Added \"{title}\" to favorites.");
        }
        FavCommand::Toggle { kind, id } => {
            let record = fetch_record(rt, kind, id).await?;
            let title = record.title.clone();
            if rt.toggle_favorite(record).await? {
                println!("Added \"{title}\" to favorites.");
            } else {
                println!("Removed \"{title}\" from favorites.");
            }
        }
        FavCommand::Remove { id } => {
            rt.remove_favorite(id).await?;
            println!("Removed {id} from favorites.");
        }
        FavCommand::Clear => {
            let removed = rt.clear_favorites().await?;
            println!("Removed {removed} favorites.");
        }
    }
    Ok(())
}

async fn fetch_record(rt: &Runtime, kind: MediaKind, id: u64) -> Result<FavoriteRecord, CliError> {
    let state = rt.load_details(kind, id).await;
    match state.favorite_record() {
        Some(record) => Ok(record),
        None => match state.details {
            muviz_runtime::Resource::Failed(e) => Err(e.into()),
            _ => Err(CliError::Usage(format!("no details for {kind} {id}"))),
        },
    }
}

fn show_config(config: &AppConfig) -> Result<(), CliError> {
    let mut shown = config.clone();
    if !shown.tmdb.api_key.is_empty() {
        shown.tmdb.api_key = "********".into();
    }
    let text = toml::to_string_pretty(&shown)
        .map_err(|e| CliError::Setup(MuvizError::Config(e.to_string())))?;
    println!("# config: {}", AppConfig::config_path().display());
    println!("# database: {}", AppConfig::db_path().display());
    print!("{text}");
    Ok(())
}
