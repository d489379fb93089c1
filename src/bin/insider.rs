//! insider: weave a module image
//!
//! Opens the target image with its references, walks every weaver attribute and
//! prints the resulting messages:
//!
//! | Prefix | Importance |
//! |--------|------------|
//! | `[+]` | info |
//! | `[*]` | debug (only with `EmitDebugMessages`) |
//! | `[-]` | warning |
//! | `[!]` | error |
//!
//! The process exits with 1 when a message stopped weaving or the session could
//! not be opened or saved, and with 0 otherwise.
//!
//! ## Example Usage
//!
//! ```bash
//! insider build/Acme.App.json out/Acme.App.json "lib/Acme.Weavers.json;lib/Insider.json"
//!
//! # Fail on warnings, show debug messages
//! insider app.json out.json "" --treat-warnings-as-errors --setting EmitDebugMessages=true
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use insider::{WeaveSession, Weaver};
use insider_core::settings::TREAT_WARNINGS_AS_ERRORS;
use insider_core::{MessageLog, Settings};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "insider",
    author,
    version,
    about = "Post-compilation weaver for module images"
)]
struct Cli {
    /// Path to the module image to process
    target: PathBuf,

    /// Path to the file that will be created
    save: PathBuf,

    /// Semicolon-separated list of the module's reference images
    references: String,

    /// Weave setting as KEY=VALUE; VALUE is JSON or a plain string. Repeatable.
    #[arg(long = "setting", value_name = "KEY=VALUE", value_parser = parse_setting)]
    settings: Vec<(String, Value)>,

    /// JSON object of settings; --setting entries override it
    #[arg(long, value_name = "PATH")]
    settings_file: Option<PathBuf>,

    /// Stop weaving on the first warning
    #[arg(long)]
    treat_warnings_as_errors: bool,

    /// Verbose diagnostics on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_setting(raw: &str) -> Result<(String, Value), String> {
    Settings::parse_assignment(raw).ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("[!] {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Weave and save. Returns false when a message stopped weaving.
fn run(cli: &Cli) -> Result<bool> {
    let settings = load_settings(cli)?;
    let references = split_references(&cli.references);

    let session = WeaveSession::open(&cli.target, &references, settings)?;
    let log = MessageLog::new(session.weave_settings()).with_listener(|message| {
        println!("{}", message);
    });

    let mut weaver = Weaver::with_log(&session, log);
    let summary = weaver.process();
    if summary.stopped {
        return Ok(false);
    }

    session.save(&cli.save)?;
    Ok(true)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read settings file {}", path.display()))?;
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("parse settings file {}", path.display()))?;
            Settings::from_json(value)
                .ok_or_else(|| anyhow!("settings file {} is not a JSON object", path.display()))?
        }
        None => Settings::new(),
    };
    for (key, value) in &cli.settings {
        settings.insert(key.clone(), value.clone());
    }
    if cli.treat_warnings_as_errors {
        settings.insert(TREAT_WARNINGS_AS_ERRORS, Value::Bool(true));
    }
    Ok(settings)
}

fn split_references(list: &str) -> Vec<PathBuf> {
    list.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_references_ignores_empty_entries() {
        assert_eq!(
            split_references("a.json;;b.json; "),
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
        assert!(split_references("").is_empty());
    }

    #[test]
    fn test_parse_setting_rejects_missing_value() {
        assert!(parse_setting("Timeout").is_err());
        assert_eq!(
            parse_setting("Timeout=5").unwrap(),
            ("Timeout".to_string(), Value::from(5))
        );
    }
}
