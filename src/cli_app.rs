//! Top-level CLI definition and dispatch.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::json;

use bearwatch::core::config::Config;
use bearwatch::core::errors::Result;
use bearwatch::core::paths::resolve_absolute_path;
use bearwatch::logger::JsonlLogger;
use bearwatch::platform::pal;
use bearwatch::report;
use bearwatch::report::builder::ReportArtifact;
use bearwatch::report::retention::{RetentionManager, RetentionPolicy};
use bearwatch::scanner::findings::RiskKind;
use bearwatch::scanner::policy::BenchmarkMode;
use bearwatch::scanner::{ScanOutcome, Scanner};

/// BearWatch — audits filesystem permissions for security risks.
#[derive(Debug, Parser)]
#[command(
    name = "bearwatch",
    author,
    version,
    about = "BearWatch - permission risk auditor",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run a permission audit and write a report.
    Scan(ScanArgs),
    /// Prune old report artifacts from the output directory.
    Prune(PruneArgs),
    /// List scannable mount points.
    Mounts,
    /// View or initialize configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ScanArgs {
    /// Directories to audit (default: configured roots, else per-distro safe defaults).
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,
    /// Recursion depth limit; 0 audits only entries directly under each root.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
    /// Skip files unmodified since the last recorded scan.
    #[arg(long)]
    incremental: bool,
    /// Incremental cutoff as a unix timestamp (implies --incremental).
    #[arg(long, value_name = "UNIX_TIME")]
    since: Option<u64>,
    /// Apply the strict benchmark rule set instead of the legacy OR-rule.
    #[arg(long)]
    strict: bool,
    /// Report output directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Explicit report file path (overrides --output-dir naming).
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,
    /// Retention limit for report artifacts.
    #[arg(long, value_name = "N")]
    max_reports: Option<usize>,
    /// Classify only; write no report and prune nothing.
    #[arg(long)]
    no_report: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct PruneArgs {
    /// Directory to prune (default: configured output location).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Retention limit to enforce.
    #[arg(long, value_name = "N")]
    max_reports: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Write a default config file (default path unless --config is given).
    Init,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// Dispatch the parsed CLI.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color || cli.json {
        control::set_override(false);
    }

    match &cli.command {
        Command::Scan(args) => cmd_scan(cli, args),
        Command::Prune(args) => cmd_prune(cli, args),
        Command::Mounts => cmd_mounts(cli),
        Command::Config(args) => cmd_config(cli, args),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "bearwatch", &mut io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(cli.config.as_deref())
}

fn activity_logger(config: &Config) -> Option<JsonlLogger> {
    config
        .log
        .enabled
        .then(|| JsonlLogger::new(config.log.jsonl_log.clone()))
}

fn cmd_scan(cli: &Cli, args: &ScanArgs) -> Result<()> {
    let mut config = load_config(cli)?;

    // CLI flags override the config snapshot before it is frozen for the run.
    if !args.roots.is_empty() {
        config.scan.root_paths = args
            .roots
            .iter()
            .map(|root| resolve_absolute_path(root))
            .collect();
    }
    if let Some(depth) = args.max_depth {
        config.scan.max_depth = depth;
    }
    if args.incremental || args.since.is_some() {
        config.scan.incremental_scan = true;
    }
    if let Some(since) = args.since {
        config.scan.last_scan_timestamp = Some(since);
    }
    if args.strict {
        config.scan.benchmark_mode = BenchmarkMode::Strict;
    }
    if let Some(dir) = &args.output_dir {
        config.report.output_location.clone_from(dir);
    }
    if let Some(max) = args.max_reports {
        config.report.max_reports = max;
    }
    config.validate()?;

    if config.scan.root_paths.is_empty() {
        config.scan.root_paths = pal::safe_default_roots(pal::distro_family());
        if !cli.json {
            println!(
                "No roots configured; using safe defaults: {}",
                display_roots(&config.scan.root_paths)
            );
        }
    }

    let logger = activity_logger(&config);
    let mut scanner = Scanner::new(config.scan_config());
    if let Some(logger) = logger.clone() {
        scanner = scanner.with_logger(logger);
    }
    let outcome = scanner.run()?;

    let mut report_path: Option<PathBuf> = None;
    let mut report_error: Option<String> = None;
    if !args.no_report {
        let artifact = ReportArtifact::new(
            outcome.summary,
            outcome.findings.clone(),
            outcome.policy,
        );
        let scan_unix = artifact.unix_timestamp;
        let published = report::publish(
            &artifact,
            &config.report.output_location,
            args.output_file.as_deref(),
            config.report.max_reports,
            logger.as_ref(),
        );
        match published.written {
            Ok(path) => report_path = Some(path),
            Err(err) => {
                // Recoverable: the findings below are still complete.
                eprintln!("bearwatch: report not saved: {err}");
                report_error = Some(err.to_string());
            }
        }
        if let Err(err) = published.prune {
            // Also recoverable: old artifacts linger until the next prune.
            eprintln!("bearwatch: old reports not pruned: {err}");
        }

        // Remember this scan for the next incremental run.
        if config.scan.incremental_scan && report_path.is_some() {
            config.scan.last_scan_timestamp = Some(scan_unix);
            if config.config_file.exists()
                && let Err(err) = config.save()
            {
                eprintln!("bearwatch: could not record scan time: {err}");
            }
        }
    }

    if cli.json {
        let doc = json!({
            "policy": outcome.policy,
            "summary": outcome.summary,
            "findings": outcome.findings,
            "stats": {
                "files_visited": outcome.stats.files_visited,
                "dirs_visited": outcome.stats.dirs_visited,
                "symlinks_seen": outcome.stats.symlinks_seen,
                "skipped_unmodified": outcome.stats.skipped_unmodified,
                "access_denied": outcome.stats.access_denied,
                "stat_anomalies": outcome.stats.stat_anomalies,
            },
            "report_path": report_path,
            "report_error": report_error,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_findings(&outcome, &config.scan.root_paths);
        if let Some(path) = &report_path {
            println!("Report saved to {}", path.display());
        }
    }
    Ok(())
}

fn display_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Color-coded, per-category listing in the classic BearWatch layout.
fn print_findings(outcome: &ScanOutcome, roots: &[PathBuf]) {
    if outcome.summary.is_clean() {
        println!(
            "{}",
            format!(
                "The den is secure for {}, no risky permissions found.",
                display_roots(roots)
            )
            .green()
        );
    } else {
        println!(
            "{}",
            format!("Risky permissions found under {}:", display_roots(roots)).bold()
        );

        let in_kind = |kind: RiskKind| {
            outcome
                .findings
                .iter()
                .filter(move |f| f.kinds.contains(&kind))
        };

        if outcome.summary.world_writable > 0 {
            println!("{}", "World-writable files:".red());
            for finding in in_kind(RiskKind::WorldWritable) {
                println!("  {}", finding.path.display());
            }
        }
        if outcome.summary.suid > 0 {
            println!("{}", "Files with SUID bit set:".yellow());
            for finding in in_kind(RiskKind::Suid) {
                println!("  {}", finding.path.display());
            }
        }
        if outcome.summary.sgid > 0 {
            println!("{}", "Files with SGID bit set:".yellow());
            for finding in in_kind(RiskKind::Sgid) {
                println!("  {}", finding.path.display());
            }
        }
    }

    println!(
        "Summary: world-writable {}, SUID {}, SGID {} ({} findings, {} policy)",
        outcome.summary.world_writable,
        outcome.summary.suid,
        outcome.summary.sgid,
        outcome.summary.total,
        outcome.policy
    );
    if outcome.stats.access_denied > 0 {
        println!(
            "{}",
            format!(
                "{} directories could not be opened (permission denied)",
                outcome.stats.access_denied
            )
            .yellow()
        );
    }
}

fn cmd_prune(cli: &Cli, args: &PruneArgs) -> Result<()> {
    let config = load_config(cli)?;
    let directory = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.report.output_location.clone());
    let max_reports = args.max_reports.unwrap_or(config.report.max_reports);

    let mut manager = RetentionManager::new(RetentionPolicy {
        max_reports,
        directory: directory.clone(),
    });
    if let Some(logger) = activity_logger(&config) {
        manager = manager.with_logger(logger);
    }
    let report = manager.prune()?;

    if cli.json {
        let doc = json!({
            "directory": directory,
            "max_reports": max_reports,
            "deleted": report.deleted,
            "failed": report.failed.iter().map(|(p, e)| json!({"path": p, "error": e})).collect::<Vec<_>>(),
            "remaining": report.remaining,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for path in &report.deleted {
            println!("Deleted old report {}", path.display());
        }
        println!(
            "{} deleted, {} failed, {} remaining in {}",
            report.deleted.len(),
            report.failed.len(),
            report.remaining,
            directory.display()
        );
    }
    Ok(())
}

fn cmd_mounts(cli: &Cli) -> Result<()> {
    let mounts = pal::mount_points();
    if cli.json {
        let doc: Vec<_> = mounts
            .iter()
            .map(|m| json!({"device": m.device, "path": m.path, "fs_type": m.fs_type}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else if mounts.is_empty() {
        println!("No scannable mount points found.");
    } else {
        for mount in &mounts {
            println!("{}  {}  ({})", mount.path.display(), mount.device, mount.fs_type);
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = load_config(cli)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let rendered = toml::to_string_pretty(&config).map_err(|err| {
                    bearwatch::core::errors::BwError::Serialization {
                        context: "toml",
                        details: err.to_string(),
                    }
                })?;
                print!("{rendered}");
            }
            Ok(())
        }
        ConfigAction::Init => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(Config::default_path);
            init_config_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

fn init_config_file(path: &Path) -> Result<()> {
    let mut config = Config::default();
    config.config_file = path.to_path_buf();
    config.save()
}
