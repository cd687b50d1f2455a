use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covdiff::badge;
use covdiff::config::{self, Config};
use covdiff::coverage::{self, FileCoverageDiff};
use covdiff::notifications::{self, CommentTarget};
use covdiff::report::{self, ReportOptions};

const CONFIG_FILE: &str = "covdiff.toml";
const DEFAULT_BADGE_DIR: &str = "assets";

#[derive(Parser)]
#[command(name = "covdiff")]
#[command(about = "Report line and branch coverage differences between two SimpleCov result sets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: covdiff.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two result sets
    Diff {
        /// Result set of the base revision
        #[arg(long, env = "BASE_RESULTSET_PATH")]
        base: PathBuf,

        /// Result set of the head revision
        #[arg(long, env = "HEAD_RESULTSET_PATH")]
        head: PathBuf,

        /// Run identifier to read (default: RSpec)
        #[arg(long)]
        run_name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,

        /// Prefix stripped from filenames (default: $GITHUB_WORKSPACE)
        #[arg(long)]
        workspace: Option<String>,

        /// Leave delta badges out of the markdown table
        #[arg(long)]
        no_badges: bool,

        /// Post the markdown report as a pull request comment
        #[arg(long)]
        comment: bool,

        /// Pull request number (default: read from the Actions event)
        #[arg(long)]
        pr: Option<u64>,

        /// GitHub token (default: config, then $GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Generate the SVG delta badges
    Badges {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_BADGE_DIR)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Markdown,
    Console,
    Json,
}

struct DiffArgs {
    base: PathBuf,
    head: PathBuf,
    run_name: Option<String>,
    format: Format,
    workspace: Option<String>,
    no_badges: bool,
    comment: bool,
    pr: Option<u64>,
    token: Option<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Could not load {}", path.display()))?,
        None => Config::load_or_default(Path::new(CONFIG_FILE))?,
    };

    match cli.command {
        Commands::Diff {
            base,
            head,
            run_name,
            format,
            workspace,
            no_badges,
            comment,
            pr,
            token,
        } => cmd_diff(
            &config,
            DiffArgs {
                base,
                head,
                run_name,
                format,
                workspace,
                no_badges,
                comment,
                pr,
                token,
            },
        ),
        Commands::Badges { out } => cmd_badges(&out),
    }
}

fn cmd_diff(config: &Config, args: DiffArgs) -> Result<()> {
    let run_name = args.run_name.as_deref().unwrap_or(&config.run_name);

    let workspace = match args.workspace {
        Some(ref w) => Some(config::expand(w)?),
        None => config
            .workspace_prefix()
            .map(str::to_string)
            .or_else(|| std::env::var("GITHUB_WORKSPACE").ok()),
    };

    let base = load_snapshot(&args.base, run_name)?;
    let head = load_snapshot(&args.head, run_name)?;
    let diffs = coverage::diff(&base, &head)?;

    tracing::info!(files = diffs.len(), "coverage differences");

    let options = ReportOptions {
        badge_base_url: (config.badges.enabled && !args.no_badges)
            .then(|| config.badges.base_url.clone()),
        workspace,
    };
    let markdown = report::render_markdown(&diffs, &options);

    match args.format {
        Format::Markdown => print!("{}", markdown),
        Format::Console => println!("{}", report::render_console(&diffs, options.workspace.as_deref())),
        Format::Json => println!("{}", report::render_json(&diffs)?),
    }

    if args.comment {
        post_comment(config, &args, &markdown, &diffs)?;
    }

    Ok(())
}

fn load_snapshot(path: &Path, run_name: &str) -> Result<coverage::CoverageSnapshot> {
    let result_set = coverage::load_result_set(path)
        .with_context(|| format!("Could not load result set {}", path.display()))?;

    coverage::summarize(&result_set, run_name)
        .with_context(|| format!("Could not summarize {}", path.display()))
}

#[tokio::main]
async fn post_comment(
    config: &Config,
    args: &DiffArgs,
    markdown: &str,
    diffs: &[FileCoverageDiff],
) -> Result<()> {
    let target = CommentTarget::resolve(&config.github, args.token.clone(), args.pr)?;

    let Some(target) = target else {
        tracing::warn!("Cannot find the PR id.");
        if !matches!(args.format, Format::Markdown) {
            println!("{}", markdown);
        }
        return Ok(());
    };

    notifications::post_comment(&target, markdown).await?;

    println!(
        "\n{} Commented on {}#{} ({} files)",
        "💬".cyan(),
        target.repo,
        target.pull_request.to_string().green(),
        diffs.len()
    );

    Ok(())
}

fn cmd_badges(out: &Path) -> Result<()> {
    let written = badge::generate_badges(out)?;

    println!(
        "{} Generated {} badges in {}",
        "✓".green(),
        written,
        out.display().to_string().green()
    );

    Ok(())
}
