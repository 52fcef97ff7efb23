use anyhow::{Context, Result, anyhow};
use cache::SqliteCache;
use catalog::{
    Candidate, CatalogApi, CatalogClient, CatalogConfig, MovieId, QueryParameters, SecondaryClient,
    SecondaryConfig, Strategy, genre_id,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{EnrichedMovie, SearchPipeline};
use std::path::PathBuf;
use std::sync::Arc;

/// CineScout - natural-language movie search
#[derive(Parser)]
#[command(name = "cinescout")]
#[command(about = "Search and browse the movie catalog", long_about = None)]
struct Cli {
    /// Path to the SQLite response cache
    #[arg(long, default_value = "cinescout_cache.db")]
    cache_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full search pipeline over structured query parameters
    Search {
        /// Free-text search terms
        #[arg(long)]
        keywords: Option<String>,

        /// Thematic tag, repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Genre name to include, repeatable
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Genre name to exclude, repeatable
        #[arg(long = "exclude-genre")]
        exclude_genres: Vec<String>,

        /// Cast member name, repeatable
        #[arg(long = "actor")]
        actors: Vec<String>,

        /// Director name, repeatable
        #[arg(long = "director")]
        directors: Vec<String>,

        /// Production company name, repeatable
        #[arg(long = "company")]
        companies: Vec<String>,

        /// Earliest release year
        #[arg(long)]
        year_from: Option<u16>,

        /// Latest release year
        #[arg(long)]
        year_to: Option<u16>,

        /// Minimum average rating (0-10)
        #[arg(long)]
        min_rating: Option<f32>,

        /// Minimum vote count
        #[arg(long)]
        min_votes: Option<u32>,

        /// Minimum runtime in minutes
        #[arg(long)]
        runtime_min: Option<u32>,

        /// Maximum runtime in minutes
        #[arg(long)]
        runtime_max: Option<u32>,

        /// Anchor title for the similarity strategy
        #[arg(long)]
        similar_to: Option<String>,

        /// Retrieval strategy (title_search, discover, similar, multi_search),
        /// repeatable; defaults to discover
        #[arg(long = "strategy")]
        strategies: Vec<String>,
    },

    /// Show full detail for one movie
    Detail {
        /// Catalog movie id
        id: MovieId,
    },

    /// List a browse section
    Browse {
        /// Section: trending, upcoming, now-playing, top-rated, genre, company
        section: String,

        /// Genre name, for the genre section
        #[arg(long)]
        genre: Option<String>,

        /// Company id, for the company section
        #[arg(long)]
        company_id: Option<u64>,
    },

    /// Drop cached upstream responses
    ClearCache {
        /// Only remove keys with this prefix (e.g. "tmdb:" or "omdb:")
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let cache = Arc::new(
        SqliteCache::open(&cli.cache_path)
            .with_context(|| format!("failed to open cache at {}", cli.cache_path.display()))?,
    );
    let catalog = CatalogClient::new(CatalogConfig::from_env(), cache.clone())
        .context("failed to build catalog client")?;

    match cli.command {
        Commands::Search {
            keywords,
            tags,
            genres,
            exclude_genres,
            actors,
            directors,
            companies,
            year_from,
            year_to,
            min_rating,
            min_votes,
            runtime_min,
            runtime_max,
            similar_to,
            strategies,
        } => {
            let strategies = strategies
                .iter()
                .map(|s| s.parse::<Strategy>().map_err(|e| anyhow!(e)))
                .collect::<Result<Vec<_>>>()?;
            let params = QueryParameters {
                keywords,
                tags,
                genres,
                exclude_genres,
                actors,
                directors,
                companies,
                year_from,
                year_to,
                min_rating,
                min_votes,
                runtime_min,
                runtime_max,
                similar_to_title: similar_to,
                strategies,
                ..Default::default()
            };
            handle_search(catalog, cache, &params).await?;
        }
        Commands::Detail { id } => handle_detail(catalog, id).await?,
        Commands::Browse {
            section,
            genre,
            company_id,
        } => handle_browse(catalog, &section, genre, company_id).await?,
        Commands::ClearCache { prefix } => {
            let removed = cache.clear_by_prefix(prefix.as_deref().unwrap_or(""));
            println!("Removed {removed} cached entries");
        }
    }

    Ok(())
}

async fn handle_search(
    catalog: CatalogClient,
    cache: Arc<SqliteCache>,
    params: &QueryParameters,
) -> Result<()> {
    let secondary = SecondaryClient::new(SecondaryConfig::from_env(), cache)
        .context("failed to build secondary metadata client")?;
    let pipeline = SearchPipeline::new(Arc::new(catalog), Arc::new(secondary));

    let results = pipeline.run(params).await;
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("{}", "Results:".bold().blue());
    for (index, movie) in results.iter().enumerate() {
        print_result(index + 1, movie);
    }
    Ok(())
}

fn print_result(rank: usize, movie: &EnrichedMovie) {
    let detail = &movie.detail;
    let year = detail.release_year().unwrap_or("????");
    let rating = detail
        .vote_average
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}. {} ({}) - rating {}",
        rank.to_string().green(),
        detail.title.bold(),
        year,
        rating
    );
    if let Some(overlay) = &movie.overlay {
        let imdb = overlay.imdb_rating.as_deref().unwrap_or("-");
        let tomatoes = overlay.rotten_tomatoes().unwrap_or("-");
        println!("   IMDb: {imdb}  Rotten Tomatoes: {tomatoes}");
    }
    if let Some(explanation) = &movie.relevance_explanation {
        println!("   {}", explanation.dimmed());
    }
}

async fn handle_detail(catalog: CatalogClient, id: MovieId) -> Result<()> {
    let detail = catalog
        .detail(id)
        .await?
        .ok_or_else(|| anyhow!("Movie {} not found", id))?;

    println!(
        "{} ({})",
        detail.title.bold().blue(),
        detail.release_year().unwrap_or("????")
    );
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("{}", tagline.italic());
    }
    if let Some(overview) = &detail.overview {
        println!("\n{overview}\n");
    }
    if let Some(runtime) = detail.runtime {
        println!("{}Runtime: {} min", "• ".green(), runtime);
    }
    if let Some(rating) = detail.vote_average {
        println!(
            "{}Rating: {:.1} ({} votes)",
            "• ".green(),
            rating,
            detail.vote_count.unwrap_or(0)
        );
    }
    let genres = detail
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !genres.is_empty() {
        println!("{}Genres: {}", "• ".green(), genres);
    }
    let directors = detail
        .directors()
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !directors.is_empty() {
        println!("{}Directed by: {}", "• ".cyan(), directors);
    }
    let cast = detail
        .top_cast(5)
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !cast.is_empty() {
        println!("{}Starring: {}", "• ".cyan(), cast);
    }
    let keywords = detail.keyword_names(5).join(", ");
    if !keywords.is_empty() {
        println!("{}Keywords: {}", "• ".cyan(), keywords);
    }
    Ok(())
}

async fn handle_browse(
    catalog: CatalogClient,
    section: &str,
    genre: Option<String>,
    company_id: Option<u64>,
) -> Result<()> {
    let (label, candidates) = match section {
        "trending" => ("Trending today".to_string(), catalog.trending().await?),
        "upcoming" => ("Upcoming releases".to_string(), catalog.upcoming().await?),
        "now-playing" => ("Now playing".to_string(), catalog.now_playing().await?),
        "top-rated" => ("Top rated".to_string(), catalog.top_rated().await?),
        "genre" => {
            let name = genre.ok_or_else(|| anyhow!("--genre is required for the genre section"))?;
            let id = genre_id(&name).ok_or_else(|| anyhow!("Unknown genre: {}", name))?;
            (format!("Top {name}"), catalog.by_genre(id).await?)
        }
        "company" => {
            let id = company_id
                .ok_or_else(|| anyhow!("--company-id is required for the company section"))?;
            (format!("Company {id}"), catalog.by_company(id).await?)
        }
        other => {
            return Err(anyhow!(
                "Unknown section '{}'; expected one of trending, upcoming, now-playing, \
                 top-rated, genre, company",
                other
            ));
        }
    };

    println!("{}", format!("{label}:").bold().blue());
    for (index, candidate) in candidates.iter().enumerate() {
        print_candidate(index + 1, candidate);
    }
    Ok(())
}

fn print_candidate(rank: usize, candidate: &Candidate) {
    let year = candidate.release_year().unwrap_or("????");
    let rating = candidate
        .vote_average
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}. {} ({}) - rating {}",
        rank.to_string().green(),
        candidate.title,
        year,
        rating
    );
}
