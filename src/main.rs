use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use zero_search::cli::{Cli, Commands, ConfigAction};
use zero_search::config::{expand_path, Config};
use zero_search::error::{Result, ZeroError};
use zero_search::filtering::{CandidateResult, ScoringFilter, TrackerBlacklist};
use zero_search::storage::{DbOptions, ResultStore, StoredResult};

const DEFAULT_BLACKLIST: &str = include_str!("../config-templates/blacklist.txt");

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Rank { input, store, json } => {
            cmd_rank(cli.config, &input, store, json)?;
        }
        Commands::Results { query, limit, json } => {
            cmd_results(cli.config, &query, limit, json)?;
        }
        Commands::Relevant { query, link, value } => {
            cmd_relevant(cli.config, &query, &link, value)?;
        }
        Commands::Status => {
            cmd_status(cli.config)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "zero_search=debug"
    } else {
        "zero_search=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_rank(config_path: Option<PathBuf>, input: &Path, store: bool, json: bool) -> Result<()> {
    let config = load_config(config_path)?;

    let blacklist = load_blacklist(&config)?;
    let filter = ScoringFilter::new(Arc::new(blacklist), &config.filter);

    let candidates = read_candidates(input)?;
    tracing::info!("Ranking {} candidates", candidates.len());

    let (ranked, stats) = filter.filter_with_stats(candidates);

    if store {
        let result_store = open_store(&config)?;
        let summary = result_store.insert_ranked(&ranked, chrono::Utc::now())?;
        tracing::info!(
            "Stored {} new results ({} already present)",
            summary.inserted,
            summary.duplicates
        );
    }

    if json {
        let output = serde_json::to_string_pretty(&ranked).map_err(|e| ZeroError::Json {
            source: e,
            context: "Failed to serialize ranked results".to_string(),
        })?;
        println!("{}", output);
        return Ok(());
    }

    for candidate in &ranked {
        println!("{:>4}  {}", candidate.rank, candidate.link);
        if !candidate.title.is_empty() {
            println!("      {}", candidate.title);
        }
    }
    println!(
        "\n{} results, {} tracker outliers, {} thin pages",
        stats.candidates, stats.tracker_outliers, stats.thin_content
    );

    Ok(())
}

fn cmd_results(
    config_path: Option<PathBuf>,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let mut rows = store.query_results(query)?;
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    if json {
        let output = serde_json::to_string_pretty(&rows).map_err(|e| ZeroError::Json {
            source: e,
            context: "Failed to serialize stored results".to_string(),
        })?;
        println!("{}", output);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No stored results for '{}'", query);
        return Ok(());
    }

    for row in &rows {
        print_stored(row);
    }

    Ok(())
}

fn print_stored(row: &StoredResult) {
    let marker = if row.relevance > 0 { "*" } else { " " };
    println!("{:>4}{} {}", row.rank, marker, row.link);
    if !row.title.is_empty() {
        println!("      {}", row.title);
    }
}

fn cmd_relevant(
    config_path: Option<PathBuf>,
    query: &str,
    link: &str,
    value: Option<i64>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let relevance = value.unwrap_or(config.feedback.relevant_value);
    if store.update_relevance(query, link, relevance)? {
        println!("✓ Marked {} relevant for '{}' ({})", link, query, relevance);
    } else {
        println!("No stored result for {} under '{}'", link, query);
    }

    Ok(())
}

fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let db_path = expand_path(&config.storage.db_path)?;
    let store = open_store(&config)?;
    let stats = store.stats()?;

    println!("zero-search Status");
    println!("==================");
    println!("\nDatabase: {}", db_path.display());
    println!("Results:  {}", stats.result_count);
    println!("Queries:  {}", stats.query_count);
    println!("Relevant: {}", stats.relevant_count);

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let output = toml::to_string_pretty(&config)?;
            println!("{}", output);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ZeroError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());

            let blacklist_path = expand_path(&config.trackers.blacklist_file)?;
            if force || !blacklist_path.exists() {
                if let Some(parent) = blacklist_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| ZeroError::Io {
                        source: e,
                        context: format!("Failed to create blacklist directory: {:?}", parent),
                    })?;
                }
                std::fs::write(&blacklist_path, DEFAULT_BLACKLIST).map_err(|e| ZeroError::Io {
                    source: e,
                    context: format!("Failed to write blacklist: {:?}", blacklist_path),
                })?;
                println!("✓ Tracker blacklist installed at: {}", blacklist_path.display());
            }
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    Config::load_or_default(&path)
}

/// Blacklist from the configured file, falling back to the bundled list
fn load_blacklist(config: &Config) -> Result<TrackerBlacklist> {
    let path = expand_path(&config.trackers.blacklist_file)?;
    if path.exists() {
        TrackerBlacklist::from_file(&path)
    } else {
        tracing::warn!(
            "Tracker blacklist {} not found, using the bundled list",
            path.display()
        );
        Ok(TrackerBlacklist::from_lines(DEFAULT_BLACKLIST.lines()))
    }
}

fn open_store(config: &Config) -> Result<ResultStore> {
    let db_path = expand_path(&config.storage.db_path)?;
    ResultStore::open_with_options(
        &db_path,
        DbOptions {
            pool_size: config.storage.pool_size,
            busy_timeout: Duration::from_millis(config.storage.busy_timeout_ms),
        },
    )
}

fn read_candidates(input: &Path) -> Result<Vec<CandidateResult>> {
    let content = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| ZeroError::Io {
                source: e,
                context: "Failed to read candidates from stdin".to_string(),
            })?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| ZeroError::Io {
            source: e,
            context: format!("Failed to read candidates file: {:?}", input),
        })?
    };

    serde_json::from_str(&content).map_err(|e| ZeroError::Json {
        source: e,
        context: format!("Failed to parse candidates from {:?}", input),
    })
}
