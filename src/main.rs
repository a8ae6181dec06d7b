//! wantcheck - check a linter's findings against `want` annotations
//!
//! Runs an analysis command over fixture packages and reports every
//! discrepancy between its findings and the `// want "regex"` comments in
//! the package sources.
//!
//! Exit codes:
//!   0 - Every package matched its annotations
//!   1 - Runtime error (bad arguments, config, missing command, etc.)
//!   2 - At least one failure was reported

use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use wantcheck::cli::Args;
use wantcheck::config::{Config, CONFIG_FILE};
use wantcheck::{Checker, CommandAnalyzer, ConsoleReporter, LoadConfig, Sanitizer};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("wantcheck v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_check(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Check failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .wantcheck.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        anyhow::bail!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Set [analyzer].command to the linter under test.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the checker over every package. Returns exit code (0 or 2).
fn run_check(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let program = config
        .analyzer
        .command
        .clone()
        .context("No analysis command given: pass --cmd or set [analyzer].command")?;
    let analyzer = CommandAnalyzer::new(program, config.analyzer.args.clone())
        .with_format(config.analyzer.format);

    let checker = Checker::with_load_config(LoadConfig::from(&config.loader))
        .with_sanitizer(Sanitizer::new(config.sanitizer.markers.clone()));

    let mut reporter = ConsoleReporter::new();
    let outcomes = checker.run(&mut reporter, &args.dir, &analyzer, &args.packages);

    if !args.quiet {
        println!("\n📊 Check Summary:");
        for (package, outcome) in &outcomes {
            let mark = if outcome.passed() { "✅" } else { "❌" };
            println!(
                "   {} {}: {} matched, {} unexpected, {} mismatched, {} unsatisfied",
                mark,
                package,
                outcome.matched,
                outcome.unexpected,
                outcome.mismatched,
                outcome.unsatisfied
            );
        }
        let skipped = args.packages.len() - outcomes.len();
        if skipped > 0 {
            println!("   ⚠️  {} package(s) could not be checked", skipped);
        }
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    if reporter.failures() > 0 {
        eprintln!("\n⛔ {} failure(s) reported.", reporter.failures());
        return Ok(2);
    }

    Ok(0)
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
            info!("Loaded default config from {}", CONFIG_FILE);
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
