//! REPL – interactive console for a running mapper.
//!
//! Supported slash-commands:
//!   /read <property>          – read one property from the snapshot
//!   /write <property> <value> – write a property (robotLocation navigates)
//!   /health                   – show the gateway health flag
//!   /snapshot                 – show every property
//!   /help                     – show this list
//!   /quit | /exit             – stop the pollers and exit

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use padbot_driver::PadbotDriver;
use padbot_types::{Property, PropertyRead, RobotStatus};

/// One parsed console line.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Read(&'a str),
    Write(&'a str, &'a str),
    Health,
    Snapshot,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head {
        "/read" if rest.is_empty() => Command::Usage("/read <property>"),
        "/read" => Command::Read(rest),
        "/write" => match rest.split_once(char::is_whitespace) {
            Some((name, value)) => Command::Write(name, value.trim()),
            // `/write robotLocation` clears the target.
            None if !rest.is_empty() => Command::Write(rest, ""),
            None => Command::Usage("/write <property> <value>"),
        },
        "/health" => Command::Health,
        "/snapshot" => Command::Snapshot,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(line),
    }
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(driver: &PadbotDriver, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "padbot>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        match parse(cmd) {
            Command::Read(name) => cmd_read(driver, name),
            Command::Write(name, value) => cmd_write(driver, name, value),
            Command::Health => cmd_health(driver),
            Command::Snapshot => cmd_snapshot(driver),
            Command::Help => cmd_help(),
            Command::Quit => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Command::Usage(usage) => println!("{} {}", "Usage:".yellow(), usage.bold()),
            Command::Unknown(other) => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Padbot Mapper Commands".bold().underline());
    println!("  {}          – read one property", "/read <property>".bold().cyan());
    println!("  {} – write a property", "/write <property> <value>".bold().cyan());
    println!("  {}                   – gateway health", "/health".bold().cyan());
    println!("  {}                 – all properties", "/snapshot".bold().cyan());
    println!("  {}             – exit the mapper", "/quit  /exit".bold().cyan());
    println!();
    let names: Vec<&str> = Property::ALL.iter().map(|p| p.name()).collect();
    println!("  Properties: {}", names.join(", ").dimmed());
    println!();
}

fn cmd_read(driver: &PadbotDriver, name: &str) {
    match driver.read_property(name) {
        PropertyRead::Value(v) => println!("  {} = {}", name.bold(), v.yellow()),
        PropertyRead::Unknown => println!("{} '{}'", "Unknown property".red(), name.yellow()),
    }
}

fn cmd_write(driver: &PadbotDriver, name: &str, value: &str) {
    match name.parse::<Property>() {
        Ok(p) if p.is_writable() => {}
        Ok(p) => {
            println!("{} '{}' is read-only.", "Ignored:".yellow(), p.name());
            return;
        }
        Err(e) => {
            println!("{}: {}", "Ignored".yellow(), e);
            return;
        }
    }
    match driver.write_property(name, value) {
        Ok(()) if value.is_empty() || value == padbot_types::UNKNOWN => {
            println!("  {}", "No target set; nothing sent.".dimmed());
        }
        Ok(()) if driver.is_running() => {
            println!("  {} {}", "→ navigation queued to".green(), value.bold())
        }
        Ok(()) => println!("  {}", "Mapper not running; command dropped.".yellow()),
        Err(e) => println!("{}: {}", "Write failed".red(), e),
    }
}

fn cmd_health(driver: &PadbotDriver) {
    if driver.health() {
        println!("  Gateway: {}", "healthy".green());
    } else {
        println!("  Gateway: {}", "unhealthy".red());
    }
}

/// Every property of one status record, in display order.
fn snapshot_rows(status: &RobotStatus) -> Vec<(&'static str, String)> {
    Property::ALL
        .into_iter()
        .map(|p| (p.name(), status.value_of(p)))
        .collect()
}

fn cmd_snapshot(driver: &PadbotDriver) {
    println!();
    for (name, value) in snapshot_rows(&driver.snapshot()) {
        println!("  {:<18} {}", name.bold(), value.yellow());
    }
    println!();
}
