//! CLI tool for verifying repository quality

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use repo_verify::{
    render_markdown, verify, verify_many, ConfigOverrides, GitHubProvider, RepositoryProvider,
    SnapshotProvider, VerificationReport, VerifyConfig,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "repo-verify")]
#[command(about = "Verify source repositories against quality requirements", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// GitHub API token (defaults to GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Read repository data from a JSON snapshot instead of GitHub
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct OverrideArgs {
    /// Minimum stars for a repository to be considered popular
    #[arg(long, global = true)]
    min_stars: Option<u32>,

    /// Minimum number of contributors
    #[arg(long, global = true)]
    min_contributors: Option<u32>,

    /// Activity window in days
    #[arg(long, global = true)]
    activity_days: Option<u32>,

    /// Minimum number of files
    #[arg(long, global = true)]
    min_files: Option<u32>,

    /// Minimum number of directories
    #[arg(long, global = true)]
    min_directories: Option<u32>,

    /// Maximum repository size in MB
    #[arg(long, global = true)]
    max_size_mb: Option<u32>,

    /// Minimum score (0-100) required to pass
    #[arg(long, global = true)]
    pass_threshold: Option<f64>,
}

impl From<&OverrideArgs> for ConfigOverrides {
    fn from(args: &OverrideArgs) -> Self {
        ConfigOverrides {
            min_stars: args.min_stars,
            min_contributors: args.min_contributors,
            activity_days: args.activity_days,
            min_files: args.min_files,
            min_directories: args.min_directories,
            max_size_mb: args.max_size_mb,
            pass_threshold: args.pass_threshold,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a single repository
    Verify {
        /// Repository URL or owner/name
        repository: String,

        /// Output format
        #[arg(short = 'f', long, default_value = "text")]
        format: ReportFormat,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Verify every repository listed in a file (one per line)
    Batch {
        /// File with repository URLs or owner/name entries
        file: PathBuf,
    },
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let provider = match build_provider(&cli, &config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let code = match &cli.command {
        Commands::Verify {
            repository,
            format,
            output,
        } => run_verify(repository, format, output.as_deref(), provider.as_ref(), &config).await,
        Commands::Batch { file } => run_batch(file, provider.as_ref(), &config).await,
    };

    process::exit(code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<VerifyConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => VerifyConfig::default(),
    };
    if let Some(token) = &cli.token {
        config.network.github_token = Some(token.clone());
    }

    let config = config.with_overrides(&ConfigOverrides::from(&cli.overrides));
    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> anyhow::Result<VerifyConfig> {
    VerifyConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn build_provider(cli: &Cli, config: &VerifyConfig) -> anyhow::Result<Box<dyn RepositoryProvider>> {
    let provider: Box<dyn RepositoryProvider> = match &cli.snapshot {
        Some(path) => Box::new(
            SnapshotProvider::from_path(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?,
        ),
        None => Box::new(GitHubProvider::new(&config.network)?),
    };
    Ok(provider)
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

async fn run_verify(
    repository: &str,
    format: &ReportFormat,
    output: Option<&Path>,
    provider: &dyn RepositoryProvider,
    config: &VerifyConfig,
) -> i32 {
    let progress = spinner(format!("Verifying {}...", repository));
    let result = verify(repository, provider, config).await;
    progress.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} Verification failed: {}", "Error:".red().bold(), e);
            return 1;
        }
    };

    let content = match format {
        ReportFormat::Text => render_text(&report),
        ReportFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{} Failed to serialize report: {}", "Error:".red().bold(), e);
                return 1;
            }
        },
        ReportFormat::Markdown => render_markdown(&report),
    };

    if let Some(path) = output {
        if let Err(e) = std::fs::write(path, content) {
            eprintln!("{} Failed to write report: {}", "Error:".red().bold(), e);
            return 1;
        }
        println!("Report written to: {}", path.display());
    } else {
        println!("{}", content);
    }

    if report.passed {
        0
    } else {
        1
    }
}

async fn run_batch(file: &Path, provider: &dyn RepositoryProvider, config: &VerifyConfig) -> i32 {
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{} Failed to read {}: {}", "Error:".red().bold(), file.display(), e);
            return 1;
        }
    };

    let identifiers: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();

    println!("Verifying {} repositories...\n", identifiers.len());
    let results = verify_many(&identifiers, provider, config).await;

    let mut passed = 0;
    for (i, (identifier, result)) in results.iter().enumerate() {
        let prefix = format!("[{}/{}] {}", i + 1, results.len(), identifier);
        match result {
            Ok(report) if report.passed => {
                passed += 1;
                println!("{} {} {:.0}", prefix, "PASS".green().bold(), report.score);
            }
            Ok(report) => println!(
                "{} {} {:.0} ({} issues)",
                prefix,
                "FAIL".red().bold(),
                report.score,
                report.failed_checks().len()
            ),
            Err(e) => println!("{} {} {}", prefix, "ERROR".red().bold(), e),
        }
    }

    let failed = results.len() - passed;
    println!("\n{} Passed: {}/{}", "Summary:".bold(), passed, results.len());
    if failed > 0 {
        println!("{} Failed: {}", "Summary:".bold(), failed);
        1
    } else {
        0
    }
}

fn render_text(report: &VerificationReport) -> String {
    let repo = &report.repository;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", repo.full_name.cyan().bold()));
    out.push_str(&format!(
        "Stars: {} | {} | {}\n",
        report.effective_stars,
        repo.language.as_deref().unwrap_or("Unknown"),
        repo.license.as_deref().unwrap_or("No license")
    ));

    let status = if report.passed { "PASSED" } else { "FAILED" };
    let line = format!("{} - Score: {:.0}/100", status, report.score);
    let line = if report.score >= 70.0 {
        line.green()
    } else if report.score >= 50.0 {
        line.yellow()
    } else {
        line.red()
    };
    out.push_str(&format!("\n{}\n", line));

    let failed = report.failed_checks();
    let warnings = report.warnings();

    if !failed.is_empty() {
        out.push_str(&format!("\n{}\n", format!("Missing ({}):", failed.len()).red()));
        for check in &failed {
            out.push_str(&format!("  - {}: {}\n", check.name, check.message));
        }
    }

    if !warnings.is_empty() {
        out.push_str(&format!("\n{}\n", format!("Warnings ({}):", warnings.len()).yellow()));
        for check in &warnings {
            out.push_str(&format!("  - {}: {}\n", check.name, check.message));
        }
    }

    if failed.is_empty() && warnings.is_empty() {
        out.push_str(&format!("\n{}\n", "All checks passed!".green()));
    }

    out.push_str(&format!("\n{}\n", report.summary));
    out
}
