//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the Ctrl-C handler,
//! then runs one pass and (optionally) watches until interrupted.

use anyhow::{Context, Result, bail};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use file_organizer::cli::Args;
use file_organizer::config::{CONFIG_ENV_VAR, create_template_config, load_config};
use file_organizer::logging::init_tracing;
use file_organizer::output as out;
use file_organizer::{CancelToken, Config, FileOutcome, Organizer, Subscription, default_config_path};

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Config-file housekeeping happens before logging init.
    if args.print_config {
        print_config_location(&args);
        return Ok(());
    }
    if args.write_config {
        let path = default_config_path().context("could not determine a config location")?;
        create_template_config(&path).map_err(|e| {
            out::print_error(&format!("{e:#}"));
            e
        })?;
        out::print_success(&format!("A template config was written to: {}", path.display()));
        return Ok(());
    }

    let (mut cfg, source) = load_config(args.config.as_deref()).map_err(|e| {
        out::print_error(&e.to_string());
        e
    })?;
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on exit.
    let guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;
    let guard_slot = Arc::new(Mutex::new(guard));

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            if cancel.is_requested() {
                // Second Ctrl-C: flush and leave now.
                if let Ok(mut g) = guard_slot.lock() {
                    let _ = g.take();
                }
                std::process::exit(130);
            }
            cancel.request();
            out::print_warn("Received interrupt; stopping (press Ctrl-C again to exit now)...");
        })
        .context("failed to install Ctrl-C handler")?;
    }

    debug!(config = ?source, ?args, "Starting file_organizer");

    let result = organize_and_watch(&cfg, &cancel);

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn organize_and_watch(cfg: &Config, cancel: &CancelToken) -> Result<()> {
    cfg.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        out::print_error(&e.to_string());
        e
    })?;
    let Some(directory) = cfg.directory.as_deref() else {
        bail!("no directory to organize was given");
    };

    let organizer = Organizer::new(directory, Arc::new(cfg.categories.clone()))?
        .with_in_progress_suffixes(&cfg.in_progress_suffixes);

    // Subscribe before the first pass so files landing during it are still seen.
    let subscription = if cfg.watch {
        Some(Subscription::install(organizer.root())?)
    } else {
        None
    };

    let summary = organizer.organize_until(cancel);
    out::print_summary("Organized", &summary);

    if let Some(subscription) = subscription {
        if cancel.is_requested() {
            return Ok(());
        }
        out::print_info(&format!(
            "Watching {} for new files (Ctrl-C to stop)",
            organizer.root().display()
        ));
        let watched = subscription.run(&organizer, cfg.settle, cancel, FileOutcome::log)?;
        out::print_summary("Watch session", &watched);
        return Ok(());
    }

    if !summary.is_clean() {
        bail!("{} file(s) could not be organized", summary.failed_count());
    }
    Ok(())
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config (explicit):\n  {}", p.display()));
        return;
    }
    if let Some(p) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        out::print_info(&format!(
            "Using {CONFIG_ENV_VAR} (explicit):\n  {}",
            std::path::Path::new(&p).display()
        ));
        out::print_info(&format!("To override, unset {CONFIG_ENV_VAR} or pass --config."));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there yet; built-in defaults are used. Run with --write-config to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}
