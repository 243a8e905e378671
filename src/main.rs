//! acsplot - animated ACS income/poverty scatter plot
//!
//! A CLI tool that fetches American Community Survey state tables for a
//! range of years and renders median household income against poverty
//! rate as SVG frames, either exported per year or driven interactively.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, client setup, write failure, etc.)

mod analysis;
mod cli;
mod config;
mod controller;
mod fetch;
mod models;
mod render;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use controller::{Controller, ViewState};
use fetch::{CensusClient, LoadOptions};
use indicatif::{ProgressBar, ProgressStyle};
use models::Store;
use render::Renderer;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    let set_level = init_logging(&args);

    info!("acsplot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, set_level).await {
        error!("Run failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .acsplot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize years, API endpoint, chart layout, and playback.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Returns a setter for raising the level once the config file is read.
fn init_logging(args: &Args) -> impl Fn(Level) {
    let level = args.log_level();

    let builder = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(level.as_str()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter_reloading();
    let handle = builder.reload_handle();

    if let Err(e) = tracing::subscriber::set_global_default(builder.finish()) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    move |level| {
        if let Err(e) = handle.reload(EnvFilter::new(level.as_str())) {
            eprintln!("Failed to change log level: {}", e);
        }
    }
}

/// Load, build the store, then export or run the interactive session.
async fn run(args: Args, set_level: impl Fn(Level)) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    if config.general.verbose && !args.verbose {
        set_level(args.log_level_with(true));
        debug!("Verbose logging enabled by config");
    }

    let years = config.years.range();

    // Handle --dry-run: list the requests and exit
    if args.dry_run {
        handle_dry_run(&config, &years);
        return Ok(());
    }

    // Step 1: Fetch every year
    println!(
        "📥 Fetching ACS tables for {}-{}",
        config.years.start, config.years.end
    );
    println!("   API: {}/<year>/{}", config.api.base_url, config.api.dataset);

    let client = CensusClient::new(config.api.clone())?;
    let options = LoadOptions::from(&config.api);
    let progress = make_progress(years.len() as u64, args.quiet);

    let outcomes = fetch::load_years(&client, &years, &options, Some(&progress)).await;
    progress.finish_and_clear();

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        println!("   ⚠️  {} of {} years failed and were skipped", failed, years.len());
    }

    // Step 2: Build the per-region store and the axes
    let records = fetch::flatten(&outcomes);
    let store = analysis::rollup_by_region(&records);
    info!(
        "{} records across {} regions",
        records.len(),
        store.len()
    );

    let domains = analysis::compute_domains(
        &store,
        config.chart.inner_width(),
        config.chart.inner_height(),
    );
    if domains.is_none() {
        warn!("No finite income or poverty values; the chart will be empty");
    }

    let (min_year, max_year) = match analysis::year_bounds(&store) {
        Some(bounds) => bounds,
        None => {
            warn!("No year produced any data");
            (config.years.start, config.years.end)
        }
    };

    let renderer = Renderer::new(config.chart.clone(), domains.clone());
    let duration = start_time.elapsed().as_secs_f64();

    // Step 3: Interactive session or export
    if args.interactive {
        let live_path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("live.svg"));
        return run_interactive(
            store,
            renderer,
            ViewState::new(min_year, max_year, args.size_by),
            Duration::from_millis(config.playback.interval_ms),
            live_path,
        )
        .await;
    }

    match args.format {
        OutputFormat::Svg => {
            let dir = PathBuf::from(&config.general.output);
            let frame_years: Vec<i32> = (min_year..=max_year).collect();
            let mut renderer = renderer;

            println!("\n🎨 Rendering {} frames...", frame_years.len());
            let written =
                report::write_frames(&mut renderer, &store, &frame_years, args.size_by, &dir)?;

            println!(
                "\n✅ Done! {} frames saved to: {}",
                written.len(),
                dir.display()
            );
        }
        OutputFormat::Json => {
            let path = export_path(&args, "acsplot.json");
            let output = report::generate_json_store(&store)?;
            std::fs::write(&path, &output)
                .with_context(|| format!("Failed to write store to {}", path.display()))?;
            println!("\n✅ Done! Store saved to: {}", path.display());
        }
        OutputFormat::Markdown => {
            let path = export_path(&args, "acsplot.md");
            let load_report = report::LoadReport::new(
                config.api.base_url.clone(),
                outcomes,
                &store,
                domains.as_ref(),
                duration,
            );
            let output = report::generate_markdown_summary(&load_report, &store);
            std::fs::write(&path, &output)
                .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            println!("\n✅ Done! Summary saved to: {}", path.display());
        }
    }

    print_summary(&store, duration);
    Ok(())
}

/// Run the stdin-driven session until `quit` or EOF.
async fn run_interactive(
    store: Store,
    renderer: Renderer,
    state: ViewState,
    interval: Duration,
    live_path: PathBuf,
) -> Result<()> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let reader = controller::spawn_stdin_reader(tx.clone());

    let mut controller = Controller::new(store, renderer, state, tx, interval);
    let result = controller::run_session(&mut controller, rx, &live_path).await;

    reader.abort();
    result
}

/// Handle --dry-run: print the request URLs, exit.
fn handle_dry_run(config: &Config, years: &[i32]) {
    println!("\n🔍 Dry run: listing requests (no network calls)...\n");

    let base: Vec<&str> = fetch::table::BASE_VARS.to_vec();
    let education: Vec<&str> = fetch::table::EDU_VARS.to_vec();

    for &year in years {
        println!("   {}", fetch::client::url_for(&config.api, year, &base));
        if year >= config.api.education_start_year {
            println!("   {}", fetch::client::url_for(&config.api, year, &education));
        }
    }

    println!("\n✅ Dry run complete. No requests were made.");
}

fn make_progress(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("   {spinner} [{bar:30}] {pos}/{len} years")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Explicit `--output`, or a default file name for file exports.
fn export_path(args: &Args, default: &str) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default))
}

fn print_summary(store: &Store, duration: f64) {
    println!("\n📊 Load Summary:");
    println!("   Regions: {}", store.len());
    for (year, count) in analysis::regions_per_year(store) {
        println!("   - {}: {} regions", year, count);
    }
    println!("   Duration: {:.1}s", duration);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
