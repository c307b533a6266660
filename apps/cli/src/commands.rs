//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use siteforge_pipeline::{Pipeline, validator_for};
use siteforge_shared::{
    AppConfig, CheckpointReport, DiscoveryConfig, StageName, init_config, load_config,
};
use siteforge_stages::{StagePayload, default_registry};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteForge — rebuild any website through a checkpointed pipeline.
#[derive(Parser)]
#[command(
    name = "siteforge",
    version,
    about = "Discover a website's content surface and drive the staged rebuild pipeline.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Root directory for project run directories.
    #[arg(long, global = true)]
    pub out: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the pipeline against a website, pausing on validation failure.
    Run {
        /// Root URL of the site to ingest.
        url: String,

        /// Project name (defaults to the URL hostname).
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Run a single stage for a project.
    Stage {
        /// Project name.
        project: String,

        /// Stage name (e.g. discovery, architecture-planning).
        name: String,

        /// Explicit JSON input; defaults to the previous stage's output.
        #[arg(long)]
        input: Option<String>,
    },

    /// Evaluate the checkpoint for a stage and print its report.
    Checkpoint {
        /// Project name.
        project: String,

        /// Stage name.
        name: String,
    },

    /// Apply dotted-path modifications to a stage's stored output.
    Modify {
        /// Project name.
        project: String,

        /// Stage name.
        stage: String,

        /// Modifications as path=value pairs (value parsed as JSON when
        /// possible, e.g. business_info.name="Acme LLC").
        #[arg(long = "set", required = true)]
        set: Vec<String>,
    },

    /// Advance past the current stage.
    Proceed {
        /// Project name.
        project: String,
    },

    /// Rewind the pipeline to a stage.
    Restart {
        /// Project name.
        project: String,

        /// Stage name to restart from.
        stage: String,
    },

    /// Show the pipeline status for a project.
    Status {
        /// Project name.
        project: String,
    },

    /// Print a human-readable progress report.
    Report {
        /// Project name.
        project: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "siteforge=info",
        1 => "siteforge=debug",
        _ => "siteforge=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let out = cli.out.clone();
    match cli.command {
        Command::Run { url, project } => cmd_run(&url, project.as_deref(), out.as_deref()).await,
        Command::Stage {
            project,
            name,
            input,
        } => cmd_stage(&project, &name, input.as_deref(), out.as_deref()).await,
        Command::Checkpoint { project, name } => {
            cmd_checkpoint(&project, &name, out.as_deref()).await
        }
        Command::Modify { project, stage, set } => {
            cmd_modify(&project, &stage, &set, out.as_deref()).await
        }
        Command::Proceed { project } => cmd_proceed(&project, out.as_deref()).await,
        Command::Restart { project, stage } => {
            cmd_restart(&project, &stage, out.as_deref()).await
        }
        Command::Status { project } => cmd_status(&project, out.as_deref()).await,
        Command::Report { project } => cmd_report(&project, out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Open the pipeline for a project with the default stage registry.
fn open_pipeline(project: &str, out: Option<&str>) -> Result<Pipeline> {
    let config = load_config()?;
    let output_dir = PathBuf::from(
        out.map(String::from)
            .unwrap_or_else(|| config.defaults.output_dir.clone()),
    );
    let registry = default_registry(&DiscoveryConfig::from(&config));
    Ok(Pipeline::open(project, &output_dir, registry)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(url: &str, project: Option<&str>, out: Option<&str>) -> Result<()> {
    let normalized = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let parsed_url =
        Url::parse(&normalized).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let project_name = project.map(String::from).unwrap_or_else(|| {
        parsed_url.host_str().unwrap_or("project").to_string()
    });

    let mut pipeline = open_pipeline(&project_name, out)?;

    println!();
    println!("  SiteForge pipeline: {project_name}");
    println!("  URL: {parsed_url}");
    println!();

    if pipeline.state().current_stage > 0 {
        info!(
            stage = %pipeline.state().current_stage_label(),
            "resuming from saved state"
        );
        println!("  Resuming from stage: {}", pipeline.state().current_stage_label());
    }

    let spinner = make_spinner();
    let total = StageName::ALL.len();

    loop {
        let Some(stage) = pipeline.current_stage() else {
            spinner.finish_and_clear();
            println!("  Pipeline complete.");
            break;
        };

        spinner.set_message(format!("[{}/{total}] {stage}", stage.index() + 1));

        let input = match stage {
            StageName::Discovery => Some(json!({"url": parsed_url.as_str()})),
            _ => None,
        };

        let output = pipeline.run_stage(stage, input).await?;

        // Schema check at the stage boundary; a mismatch is worth a
        // warning but does not stop the run.
        if let Err(e) = StagePayload::from_stage_output(stage, output) {
            warn!(stage = %stage, error = %e, "stage output failed schema check");
        }

        let report = pipeline.checkpoint(stage, Some(validator_for(stage)))?;
        spinner.suspend(|| print_checkpoint(&report));

        if !report.can_proceed {
            spinner.finish_and_clear();
            println!("  Pipeline paused at '{stage}'. Fix the reported errors and re-run.");
            return Ok(());
        }

        pipeline.proceed_to_next_stage()?;
    }

    println!();
    println!("{}", pipeline.progress_report());
    println!();
    println!("  Project directory: {}", pipeline.project_dir().display());

    Ok(())
}

async fn cmd_stage(
    project: &str,
    name: &str,
    input: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let stage = StageName::from_str(name)?;
    let input = input
        .map(|raw| serde_json::from_str::<Value>(raw))
        .transpose()
        .map_err(|e| eyre!("--input is not valid JSON: {e}"))?;

    let mut pipeline = open_pipeline(project, out)?;
    let output = pipeline.run_stage(stage, input).await?;

    if let Err(e) = StagePayload::from_stage_output(stage, output) {
        warn!(stage = %stage, error = %e, "stage output failed schema check");
    }

    println!("Stage '{stage}' complete. Output stored for project '{project}'.");
    Ok(())
}

async fn cmd_checkpoint(project: &str, name: &str, out: Option<&str>) -> Result<()> {
    let stage = StageName::from_str(name)?;
    let pipeline = open_pipeline(project, out)?;
    let report = pipeline.checkpoint(stage, Some(validator_for(stage)))?;
    print_checkpoint(&report);
    Ok(())
}

async fn cmd_modify(
    project: &str,
    stage: &str,
    set: &[String],
    out: Option<&str>,
) -> Result<()> {
    let stage = StageName::from_str(stage)?;

    let mut modifications = BTreeMap::new();
    for pair in set {
        let (path, raw_value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("--set expects path=value, got '{pair}'"))?;
        // Accept JSON values; fall back to treating the text as a string.
        let value = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));
        modifications.insert(path.to_string(), value);
    }

    let mut pipeline = open_pipeline(project, out)?;
    pipeline.apply_user_modifications(stage, modifications)?;

    println!("Applied {} modification(s) to stage '{stage}'.", set.len());
    Ok(())
}

async fn cmd_proceed(project: &str, out: Option<&str>) -> Result<()> {
    let mut pipeline = open_pipeline(project, out)?;
    let remaining = pipeline.proceed_to_next_stage()?;

    match pipeline.current_stage() {
        Some(stage) if remaining => println!("Advanced to stage '{stage}'."),
        _ => println!("Pipeline complete."),
    }
    Ok(())
}

async fn cmd_restart(project: &str, stage: &str, out: Option<&str>) -> Result<()> {
    let stage = StageName::from_str(stage)?;
    let mut pipeline = open_pipeline(project, out)?;
    pipeline.restart_from_stage(stage)?;
    println!("Pipeline rewound to stage '{stage}'.");
    Ok(())
}

async fn cmd_status(project: &str, out: Option<&str>) -> Result<()> {
    let pipeline = open_pipeline(project, out)?;
    let status = pipeline.status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn cmd_report(project: &str, out: Option<&str>) -> Result<()> {
    let pipeline = open_pipeline(project, out)?;
    println!("{}", pipeline.progress_report());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

fn print_checkpoint(report: &CheckpointReport) {
    println!();
    println!("  Checkpoint: {}", report.stage);
    println!(
        "  Result: {}",
        if report.can_proceed { "passed" } else { "blocked" }
    );

    for warning in &report.validation_results.warnings {
        println!("    warning: {warning}");
    }
    for error in &report.validation_results.errors {
        println!("    error: {error}");
    }

    if let Ok(summary) = serde_json::to_string(&report.output_summary) {
        println!("  Summary: {summary}");
    }
    if let Some(next) = report.next_stage {
        println!("  Next stage: {next}");
    }
}
