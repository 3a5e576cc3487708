//! CLI entry point for the route audit.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use route_audit::utils::{fmt_int, fmt_pct};
use route_audit::{
    AuditConfig, AuditPipeline, AuditReport, AuditResult, ProfileSummary, WritePolicy,
};
use std::path::PathBuf;
use tracing::{error, info};

/// Environment variable naming the directory that holds both extracts.
const BASE_DIR_ENV: &str = "ROUTE_AUDIT_BASE_DIR";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Route and airport reconciliation audit of two flight extracts",
    long_about = "Compares an on-time reporting extract with a marketing-carrier extract of the \
                  same flights and writes KPI, exception and narrative files.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ROUTE_AUDIT_BASE_DIR  Directory holding T_ONTIME_REPORTING.csv and \
                  T_ONTIME_MARKETING.csv (also read from .env)\n\n\
                  EXAMPLES:\n  \
                  # Both extracts in ./data, outputs in ./data/output\n  \
                  route-audit --base-dir data\n\n  \
                  # Explicit paths and a stricter ratio\n  \
                  route-audit --reporting rep.csv --marketing mkt.csv -o out/ --min-ratio 4\n\n  \
                  # Preview without writing\n  \
                  route-audit --base-dir data --dry-run"
)]
struct Args {
    /// Path to the on-time reporting CSV
    #[arg(long)]
    reporting: Option<PathBuf>,

    /// Path to the marketing-carrier CSV
    #[arg(long)]
    marketing: Option<PathBuf>,

    /// Output directory for the audit files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory used for any path not given explicitly
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Routes with fewer reporting records are never flagged
    #[arg(long, default_value = "20")]
    min_reporting_count: usize,

    /// Marketing/reporting ratio at or above which a route is flagged
    #[arg(long, default_value = "3.0")]
    min_ratio: f64,

    /// Number of sample routes and flags quoted in the narrative
    #[arg(long, default_value = "5")]
    sample_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only the final JSON report is printed.
    #[arg(long)]
    json: bool,

    /// Load and profile both extracts, list the files that would be
    /// written, and write nothing
    #[arg(long)]
    dry_run: bool,

    /// Write each output directly instead of staging them all first
    ///
    /// A late failure can then leave earlier files behind.
    #[arg(long)]
    incremental_writes: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = build_config(&args)?;

    for (label, path) in [
        ("Reporting", &config.reporting_path),
        ("Marketing", &config.marketing_path),
    ] {
        if !path.is_file() {
            return Err(anyhow!("{} file not found: {}", label, path.display()));
        }
    }

    if !args.dry_run && !config.output_dir.exists() {
        std::fs::create_dir_all(&config.output_dir)?;
        info!("Created output directory: {}", config.output_dir.display());
    }

    let mut builder = AuditPipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    if args.dry_run {
        return run_dry_run(&pipeline);
    }

    info!("{}", "=".repeat(80));
    info!("Starting route audit...");
    info!("{}", "=".repeat(80));

    let result = match pipeline.run() {
        Ok(result) => result,
        Err(e) => {
            error!("Audit failed: {}", e);
            return Err(anyhow!("Audit failed: {}", e));
        }
    };

    if args.json {
        let report = AuditReport::from_result(pipeline.config(), &result);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(pipeline.config(), &result);
    Ok(())
}

/// Resolve the audit configuration from flags, `ROUTE_AUDIT_BASE_DIR` and
/// defaults, in that order.
fn build_config(args: &Args) -> Result<AuditConfig> {
    let base_dir = args
        .base_dir
        .clone()
        .or_else(|| std::env::var_os(BASE_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut builder = AuditConfig::builder()
        .base_dir(base_dir)
        .min_reporting_count(args.min_reporting_count)
        .min_ratio(args.min_ratio)
        .sample_size(args.sample_size);

    if let Some(ref path) = args.reporting {
        builder = builder.reporting_path(path);
    }
    if let Some(ref path) = args.marketing {
        builder = builder.marketing_path(path);
    }
    if let Some(ref path) = args.output {
        builder = builder.output_dir(path);
    }
    if args.incremental_writes {
        builder = builder.write_policy(WritePolicy::Incremental);
    }

    Ok(builder.build()?)
}

/// Run dry-run mode: profile both extracts and list the outputs.
///
/// Uses `println!` for user-facing output so it shows regardless of log
/// level.
fn run_dry_run(pipeline: &AuditPipeline) -> Result<()> {
    let config = pipeline.config();
    let profile = pipeline.profile()?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of the route audit");
    println!("{}\n", "=".repeat(80));

    println!("INPUTS");
    println!("{}", "-".repeat(40));
    println!("  Reporting: {}", config.reporting_path.display());
    println!("  Marketing: {}", config.marketing_path.display());
    println!();

    print_profile(&profile);

    println!("FLAG CRITERIA");
    println!("{}", "-".repeat(40));
    println!("  reporting_count >= {}", config.min_reporting_count);
    println!("  marketing/reporting ratio >= {}", config.min_ratio);
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    for path in pipeline.planned_outputs() {
        println!("  - {}", path.display());
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To execute this audit, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

fn print_profile(profile: &ProfileSummary) {
    println!("PROFILE");
    println!("{}", "-".repeat(40));
    println!("{:<24} {:>14} {:>14}", "", "Reporting", "Marketing");
    let rows = [
        ("Rows", profile.reporting.rows, profile.marketing.rows),
        ("Unique routes", profile.reporting.unique_routes, profile.marketing.unique_routes),
        (
            "Unique origin airports",
            profile.reporting.unique_origin_airports,
            profile.marketing.unique_origin_airports,
        ),
        (
            "Unique dest airports",
            profile.reporting.unique_dest_airports,
            profile.marketing.unique_dest_airports,
        ),
        ("Null cells", profile.reporting.null_cells, profile.marketing.null_cells),
    ];
    for (label, rep, mkt) in rows {
        println!("{:<24} {:>14} {:>14}", label, fmt_int(rep), fmt_int(mkt));
    }
    println!();
}

/// Print a human-readable summary of the audit.
fn print_human_readable_summary(config: &AuditConfig, result: &AuditResult) {
    let findings = &result.findings;

    println!();
    println!("{}", "=".repeat(80));
    println!("ROUTE AUDIT COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Reporting: {}", config.reporting_path.display());
    println!("Marketing: {}", config.marketing_path.display());
    println!();

    print_profile(&result.profile);

    println!("Findings:");
    println!(
        "  Coverage: {} of {} marketing routes ({})",
        fmt_int(findings.shared_routes),
        fmt_int(findings.marketing_routes),
        fmt_pct(findings.coverage)
    );
    println!(
        "  Marketing-only routes: {} ({})",
        fmt_int(findings.marketing_only_routes),
        fmt_pct(findings.marketing_only_share)
    );
    println!(
        "  Airports only in marketing: {}",
        fmt_int(findings.airports_only_in_marketing)
    );
    println!("  Overcounting flags: {}", fmt_int(findings.flagged_routes));
    for flag in &findings.sample_flags {
        println!("    - {}", flag);
    }
    println!();

    println!("Audit outputs created under: {}", config.output_dir.display());
    for path in &result.written_files {
        println!("  - {}", path.display());
    }
    println!();
    println!("{}", "=".repeat(80));
}
