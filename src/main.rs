use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use termlink::config::Config;
use termlink::models::{FailureKind, Variant};
use termlink::pipeline::{read_terms, ArtifactWriter, Pipeline, RunReport, TermListFormat};
use termlink::render::ids::IdStrategy;

#[derive(Parser)]
#[command(
    name = "termlink",
    version,
    about = "Link domain terms to Wikidata and render them as OntoLex or SKOS Turtle",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build OntoLex lexical entries with translations
    Lexical(RunArgs),

    /// Build a SKOS concept scheme
    Taxonomic(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Term list file
    #[arg(short, long)]
    input: PathBuf,

    /// Term list layout (tsv, plain); guessed from the extension if omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Source language name, e.g. italian
    #[arg(short, long)]
    language: Option<String>,

    /// Turtle output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Term to concept id map (taxonomic)
    #[arg(long)]
    id_map: Option<PathBuf>,

    /// List of terms without facts (taxonomic)
    #[arg(long)]
    errors: Option<PathBuf>,

    /// Terms processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Identifier strategy (counter, content_hash, random)
    #[arg(long)]
    id_strategy: Option<String>,

    /// Do not consult the dictionary (lexical)
    #[arg(long, default_value = "false")]
    skip_enrichment: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    let (variant, args) = match cli.command {
        Commands::Lexical(args) => (Variant::Lexical, args),
        Commands::Taxonomic(args) => (Variant::Taxonomic, args),
    };
    apply_overrides(&mut config, variant, &args)?;
    config.validate()?;

    let format = match &args.format {
        Some(name) => name.parse::<TermListFormat>()?,
        None => TermListFormat::from_path(&args.input),
    };

    tracing::info!(
        variant = variant.as_str(),
        input = %args.input.display(),
        language = %config.run.language,
        "termlink starting"
    );

    let terms = read_terms(&args.input, format).await?;
    let pipeline = Pipeline::from_config(&config).context("Failed to set up pipeline")?;
    let writer = ArtifactWriter::new(config.output.clone());

    let report = pipeline
        .run(&terms, &writer)
        .await
        .context("Failed to write output artifacts")?;

    print_summary(&report, &config);
    Ok(())
}

fn apply_overrides(config: &mut Config, variant: Variant, args: &RunArgs) -> Result<()> {
    config.run.variant = variant;
    if let Some(language) = &args.language {
        config.run.language = language.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.run.concurrency = concurrency;
    }
    if let Some(strategy) = &args.id_strategy {
        config.run.id_strategy = strategy
            .parse::<IdStrategy>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(output) = &args.output {
        config.output.rdf_path = output.clone();
    }
    if let Some(id_map) = &args.id_map {
        config.output.id_map_path = id_map.clone();
    }
    if let Some(errors) = &args.errors {
        config.output.empty_facts_path = errors.clone();
    }
    if args.skip_enrichment {
        config.lexical.skip_enrichment = true;
    }
    Ok(())
}

fn print_summary(report: &RunReport, config: &Config) {
    println!(
        "{} run ({}) finished in {}s",
        report.variant.as_str(),
        report.language,
        report.duration().num_seconds()
    );
    println!("  Attempted: {}", report.attempted);
    println!("  Rendered:  {}", report.rendered);
    println!("  Excluded:  {}", report.excluded());
    println!("  Errors:    {}", report.errors());
    for (category, count) in report.errors_by_category() {
        println!("    {:<10} {}", category.as_str(), count);
    }
    println!("  Output:    {}", config.output.rdf_path.display());
    if report.variant == Variant::Taxonomic {
        println!("  Id map:    {}", config.output.id_map_path.display());
        println!("  No facts:  {}", config.output.empty_facts_path.display());
    }

    for failure in &report.failures {
        let marker = match failure.kind {
            FailureKind::Excluded => "excluded",
            FailureKind::Error => "error",
        };
        println!(
            "  - {} [{} {}]: {}",
            failure.term,
            failure.stage.as_str(),
            marker,
            failure.reason
        );
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("termlink=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("termlink={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
