mod browser;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use timeline_core::{TimelineConfig, TimelineError, DEFAULT_CONFIG, LOCAL_CONFIG_FILE};
use timeline_history::pipeline::build_dataset_with_progress;

#[derive(Parser)]
#[command(
    name = "git-timeline",
    version,
    about = "Plot when you commit across your local git repositories",
    long_about = "Finds git repositories under the configured directories, collects your recent\n\
                   commits on the configured branches, and writes an HTML timeline of\n\
                   time-of-day against date, one colour per repository.\n\n\
                   Examples:\n  \
                     git-timeline                      Build the timeline and open it\n  \
                     git-timeline --no-open            Only write the HTML file\n  \
                     git-timeline --config work.toml   Use a specific configuration\n  \
                     git-timeline init                 Create .git-timeline.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .git-timeline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Write the timeline without opening a browser
    #[arg(long)]
    no_open: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a default .git-timeline.toml in the current directory
    Init,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Init) => init(),
        None => run(&cli),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn init() -> Result<()> {
    let path = Path::new(LOCAL_CONFIG_FILE);
    if path.exists() {
        miette::bail!(miette::miette!(
            help = "edit the existing file or delete it first",
            "{LOCAL_CONFIG_FILE} already exists"
        ));
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .into_diagnostic()
        .wrap_err_with(|| format!("writing {LOCAL_CONFIG_FILE}"))?;
    println!("Created {LOCAL_CONFIG_FILE}; set `base_dirs` and `committers`, then run git-timeline.");
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let config_path =
        TimelineConfig::locate(cli.config.as_deref(), &cwd).map_err(|e| stage_error("configuration", e))?;
    let config = TimelineConfig::from_file(&config_path).map_err(|e| stage_error("configuration", e))?;
    tracing::debug!(path = %config_path.display(), "loaded configuration");

    let spinner = if std::io::stderr().is_terminal() && !cli.verbose {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let result = build_dataset_with_progress(&config, Utc::now(), |repo| {
        if let Some(pb) = &spinner {
            pb.set_message(format!("Reading {} ({})", repo.display_name, repo.group_label));
        }
    });
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let dataset = result.map_err(|e| stage_error("collection", e))?;

    timeline_render::write_report(&dataset, config.span_days(), &config.output)
        .map_err(|e| stage_error("rendering", e))?;
    println!(
        "Timeline with {} commits saved to {}",
        dataset.len(),
        config.output.display()
    );

    if !cli.no_open {
        let target = config
            .output
            .canonicalize()
            .unwrap_or_else(|_| config.output.clone());
        browser::open(&target, &config.browser).map_err(|e| stage_error("browser", e))?;
    }

    Ok(())
}

/// Attach the failing stage and, where the user can act on it, a hint.
fn stage_error(stage: &str, err: TimelineError) -> miette::Report {
    let help = match &err {
        TimelineError::EmptyResult { .. } => Some(
            "the program worked, but the filters are too strict: widen `days`, \
             `committers`, `branches`, or the hour window",
        ),
        TimelineError::Config(_) | TimelineError::Toml(_) | TimelineError::Pattern { .. } => {
            Some("check the configuration file, or run `git-timeline init` for a template")
        }
        TimelineError::Browser { .. } => {
            Some("set `browser = \"none\"` or pass --no-open to only write the file")
        }
        _ => None,
    };
    match help {
        Some(help) => miette::miette!(help = help, "{stage} failed: {err}"),
        None => miette::miette!("{stage} failed: {err}"),
    }
}
