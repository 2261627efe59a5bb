//! `generate` and `check` commands

use crate::writer::DirectoryWriter;
use anyhow::{Context, Result};
use isobridge_codegen::{Orchestrator, RoundReport};
use isobridge_core::{CompilationContext, Diagnostic, GeneratorConfig, Round, TypeCache};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when `-c` is absent
pub const DEFAULT_CONFIG: &str = "isobridge.toml";

/// Options of the `generate` command after flag parsing
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub input: PathBuf,
    /// Overrides `[generator] output`
    pub output: Option<PathBuf>,
    /// Overrides `[generator] header`
    pub header: Option<String>,
    pub no_registrations: bool,
}

/// Load the configuration named by `-c`, else `isobridge.toml` if present,
/// else the defaults
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => return Ok(GeneratorConfig::default()),
    };
    GeneratorConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

pub fn load_round(path: &Path) -> Result<Round> {
    Round::from_file(path).with_context(|| format!("Failed to read round description {}", path.display()))
}

fn context() -> CompilationContext {
    CompilationContext::with_sink(TypeCache::new(), Box::new(Vec::<Diagnostic>::new()))
}

/// Lines printed for the diagnostics of a round
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| format!("error: {d}")).collect()
}

/// Fail when the round reported any diagnostic
pub fn ensure_clean(report: &RoundReport) -> Result<()> {
    if report.errors > 0 {
        anyhow::bail!("{} error(s) reported", report.errors);
    }
    Ok(())
}

/// Run a full round and write its output
pub fn run(options: &GenerateOptions, config: &GeneratorConfig) -> Result<RoundReport> {
    let round = load_round(&options.input)?;
    let mut orchestrator = Orchestrator::from_config(config);
    if let Some(header) = &options.header {
        orchestrator = orchestrator.with_header(header.clone());
    }
    if options.no_registrations {
        orchestrator = orchestrator.with_registrations(false);
    }
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| config.generator.output.clone());

    tracing::info!(input = %options.input.display(), output = %output.display(), "generating");
    let mut ctx = context();
    let mut writer = DirectoryWriter::new(&output);
    let report = orchestrator
        .generate(&mut ctx, &round, &mut writer)
        .with_context(|| format!("Failed to write generated files into {}", output.display()))?;

    for line in render_diagnostics(ctx.diagnostics()) {
        eprintln!("{line}");
    }
    println!(
        "Generated {} file(s) for {} element(s) into {}",
        writer.written(),
        report.generated().count(),
        writer.root().display()
    );
    Ok(report)
}

/// Validate a round without rendering anything
pub fn check(input: &Path, config: &GeneratorConfig, json: bool) -> Result<RoundReport> {
    let round = load_round(input)?;
    let mut ctx = context();
    let report = Orchestrator::from_config(config).check(&mut ctx, &round);

    for line in render_diagnostics(ctx.diagnostics()) {
        eprintln!("{line}");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Checked {} element(s): {} failed, {} error(s)",
            report.elements.len(),
            report.failed.len(),
            report.errors
        );
    }
    Ok(report)
}
