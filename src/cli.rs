use crate::{
    config::Config,
    engine::{Engine, SystemEngine},
    pipeline::Pipeline,
    util::ensure_dir,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "wordpdf")]
#[command(about = "Batch Word-to-PDF converter (office engine discovery + ZIP bundling)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./wordpdf.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Locate the conversion engine and report its version.
    Doctor {},
    /// Convert documents to PDF and bundle them into one ZIP.
    Convert {
        inputs: Vec<PathBuf>,
        /// Where to write the ZIP. Defaults to archive.file_name.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write a JSON batch report here.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    // Logging comes up even when the config is bad so the error is visible.
    let cfg = Config::resolve(args.config.as_deref());
    let _guard = init_logging(&args, cfg.as_ref().unwrap_or(&Config::default()))?;
    let cfg = cfg?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Convert {
            inputs,
            out,
            report,
        } => convert(&cfg, inputs, out.as_deref(), report.as_deref()),
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file || cfg.logging.file_path.is_empty() {
        return None;
    }
    Some(PathBuf::from(&cfg.logging.file_path))
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = SystemEngine::from_config(cfg);
    let diag = engine.doctor();
    println!("{}", serde_json::to_string_pretty(&diag)?);
    if !diag.ok {
        bail!(
            "conversion engine unavailable: {}",
            diag.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn convert(
    cfg: &Config,
    inputs: &[PathBuf],
    out_override: Option<&Path>,
    report_override: Option<&Path>,
) -> Result<()> {
    let pipeline = Pipeline::new(cfg, SystemEngine::from_config(cfg));
    let output = pipeline.run_inputs(inputs)?;

    for line in output.report.status_lines() {
        println!("{line}");
    }

    let archive_path = match &output.archive {
        Some(archive) => {
            let dest = out_override
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&archive.file_name));
            if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
            std::fs::write(&dest, &archive.bytes)
                .with_context(|| format!("writing archive: {}", dest.display()))?;
            info!(
                "wrote {} ({}, {} entries, {} bytes)",
                dest.display(),
                archive.mime,
                archive.entries.len(),
                archive.bytes.len()
            );
            Some(dest)
        }
        None => None,
    };

    let report_path = report_override
        .map(PathBuf::from)
        .or_else(|| {
            cfg.output
                .write_report_json
                .then(|| PathBuf::from(&cfg.output.report_filename))
        });
    if let Some(path) = report_path {
        std::fs::write(&path, serde_json::to_string_pretty(&output.report)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "documents": output.report.outcomes.len(),
                "converted": output.report.converted(),
                "failed": output.report.failed(),
                "archive": archive_path,
            }))?
        );
    }

    if !inputs.is_empty() && output.report.converted() == 0 {
        bail!("none of the {} document(s) converted", inputs.len());
    }
    Ok(())
}
