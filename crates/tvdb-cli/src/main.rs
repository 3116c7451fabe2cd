//! tvdb - TheTVDB command-line client.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use tvdb_api::legacy::{LegacyClient, LegacySeries, LegacySeriesDetail};
use tvdb_api::v2::{
    Actor, Episode, Image, Language, LocalTvdbApi, SearchSeriesParams, Series, TvdbClient,
    find_series_by_imdb_id,
};

/// User-Agent sent by both clients.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// TheTVDB API key (overrides config).
    #[arg(long, global = true, env = "TVDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Response language (e.g. "en", "de"; overrides config).
    #[arg(long, global = true)]
    language: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
struct Globals {
    /// Config directory override.
    dir: Option<PathBuf>,
    /// API key override.
    api_key: Option<String>,
    /// Language override.
    language: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Log in and show when the issued token expires.
    Login,
    /// Get a series by ID.
    Series(IdArgs),
    /// List the episodes of a series.
    Episodes(EpisodesArgs),
    /// List the actors of a series.
    Actors(IdArgs),
    /// Show image counts of a series.
    Images(IdArgs),
    /// List available languages.
    Languages,
    /// Get a language by ID.
    Language(IdArgs),
    /// Search for series.
    Search(SearchArgs),
    /// List the parameters accepted by `search`.
    SearchParams,
    /// Query the legacy XML API.
    Legacy(LegacyCommand),
    /// Show or edit the config file.
    Config(ConfigCommand),
}

/// Arguments holding a single TheTVDB ID.
#[derive(clap::Args)]
struct IdArgs {
    /// TheTVDB ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `episodes` subcommand.
#[derive(clap::Args)]
struct EpisodesArgs {
    /// TheTVDB series ID.
    #[arg(long, required = true)]
    id: u64,
    /// Fetch only this page (starting at 1) instead of all pages.
    #[arg(long)]
    page: Option<u32>,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct SearchArgs {
    /// Series name (e.g. "The Simpsons").
    #[arg(long)]
    name: Option<String>,
    /// IMDb ID (e.g. "tt0096697").
    #[arg(long)]
    imdb_id: Option<String>,
    /// Zap2it ID (e.g. "EP00018693").
    #[arg(long)]
    zap2it_id: Option<String>,
    /// Series slug (e.g. "the-simpsons").
    #[arg(long)]
    slug: Option<String>,
}

/// Arguments for the `legacy` subcommand.
#[derive(clap::Args)]
struct LegacyCommand {
    /// Legacy subcommand to run.
    #[command(subcommand)]
    command: LegacySubcommands,
}

/// Available legacy XML API subcommands.
#[derive(Subcommand)]
enum LegacySubcommands {
    /// Search for series by name.
    Search(LegacySearchArgs),
    /// Get a series by ID.
    Series(IdArgs),
    /// Get the single series carrying an IMDb ID.
    Imdb(LegacyImdbArgs),
    /// Get a series with all episodes, grouped by season.
    Detail(IdArgs),
}

/// Arguments for the `legacy search` subcommand.
#[derive(clap::Args)]
struct LegacySearchArgs {
    /// Series name.
    #[arg(long, required = true)]
    name: String,
}

/// Arguments for the `legacy imdb` subcommand.
#[derive(clap::Args)]
struct LegacyImdbArgs {
    /// IMDb ID.
    #[arg(long, required = true)]
    imdb_id: String,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the config file path and current settings.
    Show,
    /// Update settings in the config file.
    Set(ConfigSetArgs),
}

/// Arguments for the `config set` subcommand.
#[derive(clap::Args)]
#[group(required = true, multiple = true)]
struct ConfigSetArgs {
    /// API key stored under `[api] key`.
    #[arg(long)]
    key: Option<String>,
    /// Default response language.
    #[arg(long = "default-language")]
    default_language: Option<String>,
    /// JSON API base URL override.
    #[arg(long)]
    base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Legacy XML API base URL override.
    #[arg(long)]
    legacy_base_url: Option<String>,
}

/// Formats an optional value, using `-` for `None`.
fn dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| String::from("-"), |v| v.to_string())
}

/// Parses a base URL, appending the trailing `/` that relative joins need.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        String::from(raw)
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).with_context(|| format!("invalid base URL: {raw}"))
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds the JSON API client from CLI options and config.
///
/// # Errors
///
/// Returns an error if no API key is available, a configured base URL is
/// invalid, or the client fails to build.
#[instrument(skip_all)]
fn build_client(globals: &Globals) -> Result<TvdbClient> {
    let config = load_config(globals.dir.as_ref())?;
    let api_key = config.api_key(globals.api_key.as_deref())?;

    let mut builder = TvdbClient::builder()
        .api_key(api_key)
        .user_agent(USER_AGENT);
    if let Some(base_url) = config.api.base_url.as_deref() {
        builder = builder.base_url(parse_base_url(base_url)?);
    }
    if let Some(language) = globals
        .language
        .as_deref()
        .or(config.api.language.as_deref())
    {
        builder = builder.language(language);
    }
    if let Some(timeout) = config.api.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().context("failed to build TheTVDB client")
}

/// Builds the legacy XML API client from CLI options and config.
///
/// # Errors
///
/// Returns an error if no API key is available, a configured base URL is
/// invalid, or the client fails to build.
#[instrument(skip_all)]
fn build_legacy_client(globals: &Globals) -> Result<LegacyClient> {
    let config = load_config(globals.dir.as_ref())?;
    let api_key = config.api_key(globals.api_key.as_deref())?;

    let mut builder = LegacyClient::builder()
        .api_key(api_key)
        .user_agent(USER_AGENT);
    if let Some(base_url) = config.legacy.base_url.as_deref() {
        builder = builder.base_url(parse_base_url(base_url)?);
    }
    if let Some(language) = globals
        .language
        .as_deref()
        .or(config.api.language.as_deref())
    {
        builder = builder.language(language);
    }
    if let Some(timeout) = config.api.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().context("failed to build TheTVDB legacy client")
}

/// Converts `search` arguments into query parameters.
fn search_params(args: &SearchArgs) -> Result<SearchSeriesParams> {
    if let Some(name) = &args.name {
        return Ok(SearchSeriesParams::by_name(name.as_str()));
    }
    if let Some(imdb_id) = &args.imdb_id {
        return Ok(SearchSeriesParams::by_imdb_id(imdb_id.as_str()));
    }
    if let Some(zap2it_id) = &args.zap2it_id {
        return Ok(SearchSeriesParams::by_zap2it_id(zap2it_id.as_str()));
    }
    if let Some(slug) = &args.slug {
        return Ok(SearchSeriesParams::by_slug(slug.as_str()));
    }
    bail!("one of --name, --imdb-id, --zap2it-id or --slug is required")
}

// --- Output ---

/// Logs token lifetime.
fn report_token(expires_at: DateTime<Utc>, issued_at: Option<DateTime<Utc>>) {
    if let Some(issued_at) = issued_at {
        tracing::info!("Token issued at {}", issued_at);
    }
    tracing::info!("Token expires at {}", expires_at);
}

/// Logs a series record.
fn report_series(series: &Series) {
    tracing::info!("ID: {}", series.id);
    tracing::info!("Name: {}", series.series_name);
    tracing::info!("Status: {}", dash(series.status.as_deref()));
    tracing::info!("Network: {}", dash(series.network.as_deref()));
    tracing::info!("First Aired: {}", dash(series.first_aired.as_deref()));
    tracing::info!("Genres: {}", series.genres.join(", "));
    tracing::info!("IMDb: {}", dash(series.imdb_id.as_deref()));
    if let Some(overview) = &series.overview {
        tracing::info!("Overview: {}", overview);
    }
}

/// Logs a table of episodes.
fn report_episodes(episodes: &[Episode]) {
    tracing::info!("Season\tEpisode\tID\tFirstAired\tName");
    for episode in episodes {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            dash(episode.aired_season),
            dash(episode.aired_episode_number),
            episode.id,
            dash(episode.first_aired.as_deref()),
            dash(episode.episode_name.as_deref()),
        );
    }
    tracing::info!("Total: {} episodes", episodes.len());
}

/// Logs a table of actors.
fn report_actors(actors: &[Actor]) {
    tracing::info!("ID\tName\t\t\tRole");
    for actor in actors {
        tracing::info!("{}\t{}\t\t{}", actor.id, actor.name, actor.role.join(", "));
    }
    tracing::info!("Total: {} actors", actors.len());
}

/// Logs image counts.
fn report_images(images: &Image) {
    tracing::info!("Fanart: {}", images.fanart);
    tracing::info!("Poster: {}", images.poster);
    tracing::info!("Season: {}", images.season);
    tracing::info!("Seasonwide: {}", images.seasonwide);
    tracing::info!("Series: {}", images.series);
}

/// Logs a table of languages.
fn report_languages(languages: &[Language]) {
    tracing::info!("ID\tAbbr\tName\t\tEnglishName");
    for language in languages {
        tracing::info!(
            "{}\t{}\t{}\t\t{}",
            language.id,
            language.abbreviation,
            language.name,
            language.english_name
        );
    }
    tracing::info!("Total: {} languages", languages.len());
}

/// Logs a table of search results.
fn report_search_results(results: &[Series]) {
    tracing::info!("ID\tFirstAired\tNetwork\t\tName");
    for series in results {
        tracing::info!(
            "{}\t{}\t{}\t\t{}",
            series.id,
            dash(series.first_aired.as_deref()),
            dash(series.network.as_deref()),
            series.series_name,
        );
    }
    tracing::info!("Total: {} series", results.len());
}

/// Logs a legacy series record.
fn report_legacy_series(series: &LegacySeries) {
    tracing::info!("ID: {}", series.id);
    tracing::info!("Name: {}", series.series_name);
    tracing::info!("Status: {}", dash(series.status.as_deref()));
    tracing::info!("Network: {}", dash(series.network.as_deref()));
    tracing::info!("First Aired: {}", dash(series.first_aired.as_deref()));
    tracing::info!("Genres: {}", series.genres.join(", "));
    tracing::info!("Actors: {}", series.actors.join(", "));
    tracing::info!("IMDb: {}", dash(series.imdb_id.as_deref()));
}

/// Logs a legacy series with its seasons.
fn report_legacy_detail(detail: &LegacySeriesDetail) {
    report_legacy_series(&detail.series);
    for (season, episodes) in &detail.seasons {
        tracing::info!("Season {}: {} episodes", season, episodes.len());
        for episode in episodes {
            tracing::info!(
                "  S{:02}E{:02}\t{}\t{}",
                season,
                episode.episode_number,
                dash(episode.first_aired.as_deref()),
                dash(episode.episode_name.as_deref()),
            );
        }
    }
    tracing::info!("Total: {} episodes", detail.episode_count());
}

// --- Subcommands ---

/// Runs the `login` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the login is rejected.
#[instrument(skip_all)]
async fn run_login(globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    client.login().await.context("TheTVDB login failed")?;

    let token = client
        .token()
        .await
        .context("no token stored after login")?;
    report_token(token.expires_at(), token.claims().issued_at);

    Ok(())
}

/// Runs the `series` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_series(args: &IdArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let series = client
        .series(args.id)
        .await
        .context("TheTVDB series request failed")?;
    report_series(&series);
    Ok(())
}

/// Runs the `episodes` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or any page request fails.
#[instrument(skip_all)]
async fn run_episodes(args: &EpisodesArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let series = client.attach(Series {
        id: args.id,
        ..Series::default()
    });

    let episodes = if let Some(page) = args.page {
        series.episodes_page(page).await
    } else {
        series.episodes().await
    }
    .context("TheTVDB episodes request failed")?;

    report_episodes(&episodes);
    Ok(())
}

/// Runs the `actors` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_actors(args: &IdArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let actors = client
        .series_actors(args.id)
        .await
        .context("TheTVDB actors request failed")?;
    report_actors(&actors);
    Ok(())
}

/// Runs the `images` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_images(args: &IdArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let images = client
        .series_images(args.id)
        .await
        .context("TheTVDB images request failed")?;
    report_images(&images);
    Ok(())
}

/// Runs the `languages` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_languages(globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let languages = client
        .languages()
        .await
        .context("TheTVDB languages request failed")?;
    report_languages(&languages);
    Ok(())
}

/// Runs the `language` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_language(args: &IdArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let language = client
        .language_by_id(args.id)
        .await
        .context("TheTVDB language request failed")?;
    report_languages(std::slice::from_ref(&language));
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let params = search_params(args)?;
    let results = client
        .search_series(&params)
        .await
        .context("TheTVDB search request failed")?;
    report_search_results(&results);
    Ok(())
}

/// Runs the `search-params` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search_params(globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let params = client
        .search_series_params()
        .await
        .context("TheTVDB search params request failed")?;
    for param in &params {
        tracing::info!("{}", param);
    }
    Ok(())
}

/// Runs a `legacy` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_legacy(command: &LegacySubcommands, globals: &Globals) -> Result<()> {
    let client = build_legacy_client(globals)?;

    match command {
        LegacySubcommands::Search(args) => {
            let results = client
                .search_series(&args.name)
                .await
                .context("TheTVDB legacy search failed")?;
            tracing::info!("ID\tFirstAired\tName");
            for series in &results {
                tracing::info!(
                    "{}\t{}\t{}",
                    series.id,
                    dash(series.first_aired.as_deref()),
                    series.series_name
                );
            }
            tracing::info!("Total: {} series", results.len());
        }
        LegacySubcommands::Series(args) => {
            let series = client
                .series_by_id(args.id)
                .await
                .context("TheTVDB legacy series request failed")?;
            report_legacy_series(&series);
        }
        LegacySubcommands::Imdb(args) => {
            let series = client
                .series_by_imdb_id(&args.imdb_id)
                .await
                .context("TheTVDB legacy IMDb lookup failed")?;
            report_legacy_series(&series);
        }
        LegacySubcommands::Detail(args) => {
            let detail = client
                .series_detail(args.id)
                .await
                .context("TheTVDB legacy detail request failed")?;
            report_legacy_detail(&detail);
        }
    }

    Ok(())
}

/// Runs `search --imdb-id`, which expects exactly one matching series.
///
/// # Errors
///
/// Returns an error unless exactly one series matches.
#[instrument(skip_all)]
async fn run_series_by_imdb(imdb_id: &str, globals: &Globals) -> Result<()> {
    let client = build_client(globals)?;
    let series = find_series_by_imdb_id(&client, imdb_id)
        .await
        .context("TheTVDB IMDb lookup failed")?;
    report_series(&series);
    Ok(())
}

/// Runs a `config` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
#[instrument(skip_all)]
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;

    match command {
        ConfigSubcommands::Show => {
            tracing::info!("Config: {}", config_path.display());
            tracing::info!(
                "API key: {}",
                if config.api.key.is_some() { "(set)" } else { "(not set)" }
            );
            tracing::info!("Base URL: {}", dash(config.api.base_url.as_deref()));
            tracing::info!("Language: {}", dash(config.api.language.as_deref()));
            tracing::info!("Timeout (s): {}", dash(config.api.timeout_secs));
            tracing::info!("Legacy base URL: {}", dash(config.legacy.base_url.as_deref()));
        }
        ConfigSubcommands::Set(args) => {
            if let Some(key) = &args.key {
                config.api.key = Some(key.clone());
            }
            if let Some(language) = &args.default_language {
                config.api.language = Some(language.clone());
            }
            if let Some(base_url) = &args.base_url {
                parse_base_url(base_url)?;
                config.api.base_url = Some(base_url.clone());
            }
            if let Some(timeout_secs) = args.timeout_secs {
                config.api.timeout_secs = Some(timeout_secs);
            }
            if let Some(base_url) = &args.legacy_base_url {
                parse_base_url(base_url)?;
                config.legacy.base_url = Some(base_url.clone());
            }
            config.save(&config_path).context("failed to save config")?;
            tracing::info!("Saved {}", config_path.display());
        }
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let globals = Globals {
        dir: cli.dir,
        api_key: cli.api_key,
        language: cli.language,
    };

    match cli.command {
        Commands::Login => run_login(&globals).await,
        Commands::Series(args) => run_series(&args, &globals).await,
        Commands::Episodes(args) => run_episodes(&args, &globals).await,
        Commands::Actors(args) => run_actors(&args, &globals).await,
        Commands::Images(args) => run_images(&args, &globals).await,
        Commands::Languages => run_languages(&globals).await,
        Commands::Language(args) => run_language(&args, &globals).await,
        Commands::Search(args) => match args.imdb_id.as_deref() {
            Some(imdb_id) => run_series_by_imdb(imdb_id, &globals).await,
            None => run_search(&args, &globals).await,
        },
        Commands::SearchParams => run_search_params(&globals).await,
        Commands::Legacy(cmd) => run_legacy(&cmd.command, &globals).await,
        Commands::Config(cmd) => run_config(&cmd.command, globals.dir.as_ref()),
    }
}
