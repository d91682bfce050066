//! WhatsApp Sticker CLI - Compliance checks from the shell
//!
//! Commands: limits, check, check-data, scan
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on compliance failure, 1 on usage or config errors

use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

use wasticker_core::{
    check_file, scan_bundle, ComplianceConfig, ComplianceReport, DirectoryBundle, ImageFormat,
    StickerRole, Validator,
};

#[derive(Parser)]
#[command(name = "wasticker-cli")]
#[command(about = "WhatsApp sticker image compliance checks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with role limits (tray limits are only available from here)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective limits
    Limits,

    /// Check one file from a sticker directory
    Check {
        /// Directory holding the sticker files
        #[arg(short, long)]
        bundle: PathBuf,

        /// File name inside the directory
        #[arg(short, long)]
        file: String,

        /// Check against tray icon limits
        #[arg(long)]
        tray: bool,

        /// Emoji assigned to the sticker (repeatable)
        #[arg(short, long = "emoji")]
        emojis: Vec<String>,
    },

    /// Check base64-encoded image data
    CheckData {
        /// Declared image format
        #[arg(short, long, value_enum)]
        format: FormatArg,

        /// Base64 payload
        #[arg(short, long)]
        data: String,

        /// Check against tray icon limits
        #[arg(long)]
        tray: bool,
    },

    /// Check every .png and .webp file in a directory
    Scan {
        #[arg(short, long)]
        bundle: PathBuf,

        #[arg(long)]
        tray: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

fn role(tray: bool) -> StickerRole {
    if tray { StickerRole::Tray } else { StickerRole::Message }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> Result<(), ExitCode> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| fail(&format!("Failed to serialize output: {}", e)))?;
    println!("{}", s);
    Ok(())
}

fn fail(message: &str) -> ExitCode {
    println!("{}", serde_json::json!({ "valid": false, "error": message }));
    ExitCode::FAILURE
}

fn exit_for(printed: Result<(), ExitCode>, compliant: bool) -> ExitCode {
    match printed {
        Err(code) => code,
        Ok(()) if compliant => ExitCode::SUCCESS,
        Ok(()) => ExitCode::from(2),  // Compliance failure
    }
}

fn report_exit(report: &ComplianceReport) -> ExitCode {
    exit_for(print_json(report), report.valid)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match ComplianceConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(&e.to_string()),
        },
        None => ComplianceConfig::default(),
    };
    let validator = Validator::new(config);

    match cli.command {
        Commands::Limits => {
            let limits = serde_json::json!({
                "limits": validator.config(),
                "checks": validator.rule_names(),
            });
            exit_for(print_json(&limits), true)
        }

        Commands::Check { bundle, file, tray, emojis } => {
            info!(bundle = %bundle.display(), file = %file, "checking sticker");
            let bundle = DirectoryBundle::new(bundle);
            let report = check_file(&validator, &bundle, &file, role(tray), &emojis);
            report_exit(&report)
        }

        Commands::CheckData { format, data, tray } => {
            let bytes = match base64::engine::general_purpose::STANDARD.decode(data.trim()) {
                Ok(b) => b,
                Err(e) => return fail(&format!("Invalid base64 payload: {}", e)),
            };
            let role = role(tray);
            let outcome = validator.validate(bytes, format.into(), role);
            report_exit(&ComplianceReport::from_outcome("<data>", role, &outcome))
        }

        Commands::Scan { bundle, tray } => {
            let bundle = DirectoryBundle::new(bundle);
            match scan_bundle(&validator, &bundle, role(tray)) {
                Ok(summary) => exit_for(print_json(&summary), summary.all_compliant()),
                Err(e) => fail(&e.to_string()),
            }
        }
    }
}
