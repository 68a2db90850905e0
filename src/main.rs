use annoview::config::Config;
use annoview::discovery::{FileFinder, FileStats};
use annoview::index::{AnnotationIndex, IndexBuilder, ParallelIndexBuilder};
use annoview::query::{ContainerMode, Query};
use annoview::report::{ReportFormat, Reporter};
use annoview::view::{ElementSite, UseSiteFilter};
use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// annoview - inspect Kotlin/Java annotations as seen from one use site
#[derive(Parser, Debug)]
#[command(name = "annoview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to scan (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Declarations to inspect: `*Entity`, `User*`, a name or a qualified name
    #[arg(short, long)]
    decl: Option<String>,

    /// Element site: declaration, field, getter, setter, setter-parameter, parameter
    #[arg(short, long, value_parser = parse_site)]
    site: Option<ElementSite>,

    /// Use-site filter preset applied instead of the site's own
    /// (field, property-setter-parameter, method-parameter, no-use-site,
    /// no-use-site-or-getter, no-use-site-or-setter)
    #[arg(long, value_parser = parse_filter)]
    filter: Option<UseSiteFilter>,

    /// Qualified annotation type to look up
    #[arg(long)]
    find: Option<String>,

    /// Container type of a repeatable annotation (disables discovery)
    #[arg(long, conflicts_with = "no_container")]
    container: Option<String>,

    /// Only look up direct instances, never a repeatable container
    #[arg(long)]
    no_container: bool,

    /// Report whether the annotation type is present (can be specified multiple times)
    #[arg(long)]
    has: Vec<String>,

    /// Report whether any annotation from this exact package is present
    #[arg(long)]
    has_package: Option<String>,

    /// Include declarations with no visible annotations
    #[arg(long)]
    show_empty: bool,

    /// Print annotation names without arguments
    #[arg(long)]
    no_arguments: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable parallel parsing
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn parse_site(name: &str) -> std::result::Result<ElementSite, String> {
    ElementSite::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = ElementSite::ALL.iter().map(|s| s.name()).collect();
        format!("unknown site `{}` (expected one of: {})", name, names.join(", "))
    })
}

fn parse_filter(name: &str) -> std::result::Result<UseSiteFilter, String> {
    UseSiteFilter::preset(name).ok_or_else(|| {
        let names: Vec<&str> = UseSiteFilter::PRESETS.iter().map(|(n, _)| *n).collect();
        format!("unknown filter `{}` (expected one of: {})", name, names.join(", "))
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("annoview v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(&config, &cli)
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();
    let format = report_format(config, cli)?;
    let query = build_query(config, cli)?;

    info!("Discovering files...");
    let files = FileFinder::new(config).find_files(&cli.path)?;
    let stats = FileStats::from_files(&files);
    info!(
        "Found {} files ({} Kotlin, {} Java)",
        stats.total(),
        stats.kotlin_files,
        stats.java_files
    );

    if files.is_empty() {
        if !cli.quiet {
            println!("{}", "No Kotlin or Java files found.".yellow());
        }
        return Ok(());
    }

    let index = if cli.parallel {
        ParallelIndexBuilder::new(config.resolution.clone()).build_from_files(&files)
    } else {
        build_sequential(config, &files, cli.quiet)?
    };
    info!(
        "Indexed {} declarations with {} annotations",
        index.len(),
        index.annotation_count()
    );

    let matches = query.run(&index);

    Reporter::new(format, cli.output.clone())
        .with_arguments(config.report.show_arguments)
        .report(&matches)?;

    if !cli.quiet && format == ReportFormat::Terminal {
        let elapsed = start_time.elapsed();
        println!(
            "{}",
            format!("Scanned {} files in {:.2}s", files.len(), elapsed.as_secs_f64()).dimmed()
        );
    }

    Ok(())
}

fn build_sequential(
    config: &Config,
    files: &[annoview::discovery::SourceFile],
    quiet: bool,
) -> Result<AnnotationIndex> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .into_diagnostic()?
            .progress_chars("#>-"),
    );

    info!("Parsing files...");
    let mut builder = IndexBuilder::new(config.resolution.clone());
    for file in files {
        if let Err(e) = builder.process_file(file) {
            warn!("Skipping {}: {:?}", file.path.display(), e);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(builder.build())
}

fn build_query(config: &Config, cli: &Cli) -> Result<Query> {
    let site = match cli.site {
        Some(site) => site,
        None => ElementSite::from_name(&config.query.site)
            .ok_or_else(|| miette::miette!("Unknown site in config: {}", config.query.site))?,
    };

    let container = if cli.no_container {
        ContainerMode::None
    } else if let Some(container) = &cli.container {
        ContainerMode::Explicit(container.clone())
    } else if config.query.auto_container {
        ContainerMode::Auto
    } else {
        ContainerMode::None
    };

    let mut query = Query::new(site)
        .with_container(container)
        .with_include_empty(config.report.show_empty);

    if let Some(pattern) = &cli.decl {
        query = query.with_pattern(pattern.clone());
    }
    if let Some(filter) = cli.filter {
        query = query.with_filter(filter);
    }
    if let Some(find) = &cli.find {
        query = query.with_find(find.clone());
    }
    for type_name in &cli.has {
        query = query.with_has(type_name.clone());
    }
    if let Some(package) = &cli.has_package {
        query = query.with_has_package(package.clone());
    }

    Ok(query)
}

fn report_format(config: &Config, cli: &Cli) -> Result<ReportFormat> {
    match cli.format {
        Some(format) => Ok(format.into()),
        None => ReportFormat::from_name(&config.report.format).ok_or_else(|| {
            miette::miette!("Unknown report format in config: {}", config.report.format)
        }),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries only results
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if cli.show_empty {
        config.report.show_empty = true;
    }
    if cli.no_arguments {
        config.report.show_arguments = false;
    }

    Ok(config)
}
