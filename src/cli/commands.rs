//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::cli::progress::{
    print_error, print_header, print_info, print_success, print_warning, scan_spinner,
    RunProgress,
};
use crate::cli::{Args, Commands};
use crate::core::config::{get_config_path, init_config, Config};
use crate::core::orchestrator::{self, RunOptions, RunReport};
use crate::duplicate::fingerprint::{fingerprint_file, fingerprint_hex};
use crate::duplicate::index::{HashIndex, ImageRecord};
use crate::duplicate::resolver;
use crate::fsops::namer::Disposition;
use crate::fsops::walker;
use crate::testdata::{self, GenerateOptions};
use anyhow::{Context, Result};
use dialoguer::Confirm;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Run the appropriate command based on CLI arguments
pub fn run_command(args: &Args, config: &Config, shutdown: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Commands::Run {
            path,
            disposition,
            dry_run,
            report,
        } => handle_run(config, path, *disposition, *dry_run, report.as_deref(), &shutdown),

        Commands::Batch {
            path,
            disposition,
            dry_run,
            yes,
            report,
        } => handle_batch(
            config,
            path,
            *disposition,
            *dry_run,
            *yes,
            report.as_deref(),
            &shutdown,
        ),

        Commands::Scan { path } => handle_scan(config, path),

        Commands::GenTestdata {
            output,
            count,
            duplicates,
            corrupt,
            seed,
        } => handle_gen_testdata(output, *count, *duplicates, *corrupt, *seed),

        Commands::Config { path, reset } => handle_config_command(*path, *reset),

        Commands::GenerateConfig { output } => generate_config_file(output.clone()),

        Commands::ShowConfig => show_config(config),
    }
}

fn build_options(config: &Config, disposition: Option<Disposition>, dry_run: bool) -> RunOptions {
    let mut options = RunOptions::from_config(config).with_dry_run(dry_run);
    if let Some(mode) = disposition {
        options = options.with_disposition(mode);
    }
    options
}

fn handle_run(
    config: &Config,
    path: &Path,
    disposition: Option<Disposition>,
    dry_run: bool,
    report_path: Option<&Path>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let options = build_options(config, disposition, dry_run);
    let scope = config.scope_for(path);

    print_header("Duplicate Canonicalization");
    print_info(&format!("Scope:       {}", path.display()));
    print_info(&format!("Disposition: {}", options.disposition));
    if dry_run {
        print_warning("Dry run: no files will be changed");
    }
    println!();

    let progress = RunProgress::new("Processing images");
    let report = orchestrator::run_scope(&scope, &options, shutdown, |done, total| {
        progress.update(done, total);
    })
    .with_context(|| format!("failed to process scope '{}'", path.display()))?;
    progress.finish("Processing complete");

    println!();
    print_report(&report);

    if let Some(out) = report_path {
        write_json_report(out, &report)?;
    }

    Ok(())
}

fn handle_batch(
    config: &Config,
    path: &Path,
    disposition: Option<Disposition>,
    dry_run: bool,
    yes: bool,
    report_path: Option<&Path>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let options = build_options(config, disposition, dry_run);

    print_header("Batch Canonicalization");
    print_info(&format!("Parent folder: {}", path.display()));
    print_info(&format!("Disposition:   {}", options.disposition));
    if dry_run {
        print_warning("Dry run: no files will be changed");
    }
    println!();

    if !yes && !dry_run {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Process every subfolder of '{}' and rename files in place?",
                path.display()
            ))
            .default(false)
            .interact()
            .context("failed to read confirmation")?;
        if !confirmed {
            print_info("Aborted; nothing was changed.");
            return Ok(());
        }
    }

    // One bar per scope; a new scope path in the callback rolls the bar over.
    let current: Mutex<Option<(PathBuf, RunProgress)>> = Mutex::new(None);
    let summary = orchestrator::run_batch(path, config, &options, shutdown, |scope, done, total| {
        let mut guard = current.lock().unwrap();
        let rollover = guard.as_ref().map(|(p, _)| p != scope).unwrap_or(true);
        if rollover {
            if let Some((_, bar)) = guard.take() {
                bar.finish("done");
            }
            let name = scope
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| scope.display().to_string());
            *guard = Some((scope.to_path_buf(), RunProgress::new(&name)));
        }
        if let Some((_, bar)) = guard.as_ref() {
            bar.update(done, total);
        }
    })
    .with_context(|| format!("failed to process batch '{}'", path.display()))?;

    if let Some((_, bar)) = current.lock().unwrap().take() {
        bar.finish("done");
    }

    println!();
    print_success(&format!(
        "Batch finished: {} scope(s) processed, {} skipped, {} failed",
        summary.scopes_run, summary.scopes_skipped, summary.scopes_failed
    ));
    for report in &summary.reports {
        print_info(&format!(
            "{}: {} file(s), {} group(s), {} duplicate(s), {} error(s)",
            report.scope, report.processed, report.groups, report.duplicates, report.errors
        ));
    }
    if summary.scopes_failed > 0 {
        print_warning("Some scopes failed; see the log for details.");
    }

    if let Some(out) = report_path {
        let json = serde_json::to_string_pretty(&summary)
            .context("failed to serialize batch report")?;
        fs::write(out, json)
            .with_context(|| format!("failed to write report '{}'", out.display()))?;
        print_success(&format!("Report written to {}", out.display()));
    }

    Ok(())
}

fn handle_scan(config: &Config, path: &Path) -> Result<()> {
    let scope = config.scope_for(path);
    scope
        .validate()
        .with_context(|| format!("cannot scan '{}'", path.display()))?;

    print_header("Duplicate Scan (read-only)");

    let spinner = scan_spinner("Scanning for images…");
    let files = walker::collect_files(&scope);
    spinner.finish_with_message(format!("Found {} candidate file(s)", files.len()));

    let progress = RunProgress::new("Fingerprinting");
    let mut index = HashIndex::new();
    let mut unreadable = 0usize;
    for (discovery_order, file) in files.iter().enumerate() {
        match fingerprint_file(file) {
            Ok(hashed) => index.insert(ImageRecord {
                path: file.clone(),
                fingerprint: hashed.fingerprint,
                width: hashed.width,
                height: hashed.height,
                discovery_order,
            }),
            Err(err) => {
                warn!("Skipping unreadable file during scan: {}", err);
                unreadable += 1;
            }
        }
        progress.update(discovery_order + 1, files.len());
    }
    progress.finish("Fingerprinting complete");
    println!();

    let groups = index.groups_with_duplicates();
    if groups.is_empty() {
        print_success("No duplicates found.");
    } else {
        print_success(&format!("Found {} duplicate group(s):", groups.len()));
        for (i, group) in groups.into_iter().enumerate() {
            println!();
            print_info(&format!(
                "Group {} (fingerprint {}):",
                i + 1,
                fingerprint_hex(group.fingerprint)
            ));
            for member in resolver::rank(group) {
                let marker = if member.is_canonical() {
                    " (canonical)"
                } else {
                    ""
                };
                println!(
                    "      {}. {} [{}x{}]{}",
                    member.rank,
                    member.record.path.display(),
                    member.record.width,
                    member.record.height,
                    marker
                );
            }
        }
    }

    if unreadable > 0 {
        println!();
        print_warning(&format!(
            "{} file(s) could not be decoded; a run would quarantine them.",
            unreadable
        ));
    }

    Ok(())
}

fn handle_gen_testdata(
    output: &Path,
    count: usize,
    duplicates: bool,
    corrupt: bool,
    seed: Option<u64>,
) -> Result<()> {
    let options = GenerateOptions {
        count,
        with_duplicates: duplicates,
        with_corrupt: corrupt,
        seed: seed.unwrap_or(42),
    };

    let summary = testdata::generate(output, &options)
        .with_context(|| format!("failed to generate test data in '{}'", output.display()))?;

    print_success(&format!(
        "Generated {} image(s), {} duplicate cop(ies), {} corrupt file(s) in {}",
        summary.images,
        summary.duplicates,
        summary.corrupt,
        output.display()
    ));
    Ok(())
}

fn print_report(report: &RunReport) {
    print_success(&format!(
        "Processed {}/{} file(s) in {} ms",
        report.processed, report.discovered, report.duration_ms
    ));
    print_info(&format!(
        "{} duplicate group(s), {} non-canonical duplicate(s)",
        report.groups, report.duplicates
    ));
    if report.planned > 0 {
        print_info(&format!("{} disposition(s) planned (dry run)", report.planned));
    }
    if report.renamed > 0 {
        print_info(&format!("{} file(s) renamed in place", report.renamed));
    }
    if report.moved > 0 {
        print_info(&format!("{} file(s) moved to Duplicates", report.moved));
    }
    if report.quarantined > 0 {
        print_warning(&format!("{} unreadable file(s) quarantined", report.quarantined));
    }
    if report.quarantine_conflicts > 0 {
        print_warning(&format!(
            "{} quarantine conflict(s); files left in place",
            report.quarantine_conflicts
        ));
    }
    if report.errors > 0 {
        print_error(&format!(
            "{} error(s); affected files were left untouched (see log)",
            report.errors
        ));
    }
    if report.interrupted {
        print_warning("Run was interrupted; the scope was not marked complete.");
    }
}

fn write_json_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write report '{}'", path.display()))?;
    print_success(&format!("Report written to {}", path.display()));
    Ok(())
}

fn handle_config_command(path_only: bool, reset: bool) -> Result<()> {
    let config_path = init_config().context("failed to initialize configuration")?;

    if reset {
        fs::write(&config_path, Config::generate_default_config())
            .with_context(|| format!("failed to reset config '{}'", config_path.display()))?;
        print_success(&format!(
            "Configuration reset to defaults: {}",
            config_path.display()
        ));
        return Ok(());
    }

    if path_only {
        println!("{}", config_path.display());
    } else {
        print_info(&format!("Configuration file: {}", config_path.display()));
        print_info("Edit it with any text editor; see `show-config` for current values.");
    }
    Ok(())
}

fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let target = match output {
        Some(path) => path,
        None => get_config_path().context("could not determine configuration directory")?,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }

    fs::write(&target, Config::generate_default_config())
        .with_context(|| format!("failed to write config '{}'", target.display()))?;
    print_success(&format!("Configuration written to {}", target.display()));
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
