//! `padbot-mapper` – console host for a single Padbot robot.
//!
//! This binary:
//!
//! 1. Checks for `~/.padbot/config.toml`; runs a **First-Run Wizard** when the
//!    file is absent.
//! 2. Initializes the driver so the health and status pollers start mirroring
//!    the robot's HTTP gateway.
//! 3. Drops the user into an **interactive REPL** with slash-commands
//!    (`/read`, `/write`, `/health`, `/snapshot`, `/help`).
//! 4. Intercepts **Ctrl-C** to stop both pollers and exit safely.

mod config;
mod repl;
mod telemetry;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, warn};

use config::Config;
use padbot_driver::PadbotDriver;
use padbot_types::DispatchOutcome;

fn main() {
    let _telemetry = telemetry::init_tracing("padbot-mapper");

    print_banner();

    let cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start the async runtime");
            std::process::exit(1);
        }
    };

    let driver = Arc::new(PadbotDriver::new(cfg.driver.clone()));
    if let Err(e) = rt.block_on(driver.initialize(&cfg.base_url)) {
        println!("{}: {}", "Initialization failed".red(), e);
        std::process::exit(1);
    }

    if cfg.base_url.is_empty() {
        println!(
            "  {} no base URL configured; edit {} or set {}.",
            "⚠".yellow(),
            config::config_path().display().to_string().bold(),
            "PADBOT_BASE_URL".bold()
        );
    } else {
        println!("  Mirroring {}", cfg.base_url.bold());
    }
    println!("  Type {} to see available commands.", "/help".bold().cyan());
    println!();

    // ── Dispatch outcomes ─────────────────────────────────────────────────
    let mut outcomes = driver.subscribe_dispatch();
    rt.spawn(async move {
        loop {
            match outcomes.recv().await {
                Ok(event) => match event.outcome {
                    DispatchOutcome::Delivered => {
                        println!("\n  {} {}", "✓ robot accepted".green(), event.target.bold())
                    }
                    DispatchOutcome::Rejected { status } => println!(
                        "\n  {} {} (HTTP {})",
                        "✗ robot rejected".red(),
                        event.target.bold(),
                        status
                    ),
                    DispatchOutcome::Failed { reason } => println!(
                        "\n  {} {}: {}",
                        "✗ navigation failed".red(),
                        event.target.bold(),
                        reason
                    ),
                },
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "dispatch outcome printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let handle = rt.handle().clone();
    let driver_ctrlc = Arc::clone(&driver);
    let shutdown_ctrlc = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping pollers …".yellow().bold());
        shutdown_ctrlc.store(true, Ordering::SeqCst);
        if let Err(e) = handle.block_on(driver_ctrlc.shutdown()) {
            error!(error = %e, "shutdown failed");
        }
        println!("{}", "  ✓ Exiting padbot-mapper.".green());
        std::process::exit(0);
    }) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    repl::run(&driver, Arc::clone(&shutdown));

    if let Err(e) = rt.block_on(driver.shutdown()) {
        error!(error = %e, "shutdown failed");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║     Padbot Mapper First-Run Wizard   ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's point the mapper at a robot.\n");

    let mut cfg = Config {
        base_url: prompt_line(
            "  Robot gateway URL (e.g. http://192.168.1.20:5000, empty to skip): ",
            "",
        ),
        ..Config::default()
    };

    match config::save(&cfg) {
        Ok(()) => println!(
            "{} {}",
            "✓ Configuration saved to".green(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }

    config::apply_env_overrides(&mut cfg);
    cfg
}

fn print_banner() {
    println!();
    println!("{}", r#"    ___          _ _         _   "#.bold().cyan());
    println!("{}", r#"   | _ \__ _ __| | |__  ___| |_ "#.bold().cyan());
    println!("{}", r#"   |  _/ _` / _` | '_ \/ _ \  _|"#.bold().cyan());
    println!("{}", r#"   |_| \__,_\__,_|_.__/\___/\__|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Padbot Mapper".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Robot device mapper");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
