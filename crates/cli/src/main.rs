use chrono::Utc;
use clap::{Parser, Subcommand};
use solace_core::backfill::BackfillService;
use solace_core::config::{nudge_quiet_hours_from_env_value, retention_days_from_env_value};
use solace_core::constants::{DEFAULT_CHAT_DATA_DIR, SERVER_MIN_CLEAN_CHARS};
use solace_core::nudge::NudgeService;
use solace_core::report::ComplianceService;
use solace_core::repositories::conversations::list_conversations;
use solace_core::retention::RetentionService;
use solace_core::{CoreConfig, FallbackPolicy, PatternSet, Sanitiser};
use solace_types::Language;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "solace")]
#[command(about = "Solace chat service CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter reasoning leakage from text (file or stdin)
    Sanitise {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
        /// Display language for the fallback sentence (en/he)
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Report which lines the filter would remove, without removing them
    Check {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// List all conversations
    List,
    /// Delete conversations past the retention window
    Sweep,
    /// Print the compliance report
    Report,
    /// Re-apply the current filter to every stored conversation
    Backfill,
    /// List conversations due a proactive check-in
    Nudges,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Sanitise { file, language }) => {
            let language = Language::parse(&language)?;
            let text = read_input(file)?;
            let sanitiser = build_sanitiser()?;
            match sanitiser.sanitise(&text, language).text {
                Some(clean) => println!("{}", clean),
                None => eprintln!("Message suppressed by safety policy."),
            }
        }
        Some(Commands::Check { file }) => {
            let text = read_input(file)?;
            let sanitiser = build_sanitiser()?;
            let matches = sanitiser.extract_matches(&text);
            if matches.is_empty() {
                println!("No leakage detected.");
            } else {
                for m in matches {
                    println!("line {} [{}]: {}", m.line_number, m.family, m.fragment);
                }
            }
        }
        Some(Commands::List) => {
            let cfg = resolve_config()?;
            let conversations = list_conversations(&cfg);
            if conversations.is_empty() {
                println!("No conversations found.");
            } else {
                for meta in conversations {
                    println!(
                        "ID: {}, Owner: {}, Language: {}, Created: {}",
                        meta.conversation_id, meta.owner, meta.language, meta.created_at
                    );
                }
            }
        }
        Some(Commands::Sweep) => {
            let cfg = resolve_config()?;
            let outcome = RetentionService::new(cfg).sweep(Utc::now())?;
            println!(
                "Examined {} conversations, removed {}.",
                outcome.examined, outcome.removed
            );
        }
        Some(Commands::Report) => {
            let cfg = resolve_config()?;
            let sanitiser = build_sanitiser()?;
            let report = ComplianceService::new(cfg, sanitiser).generate(Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(Commands::Backfill) => {
            let cfg = resolve_config()?;
            let sanitiser = build_sanitiser()?;
            let outcome = BackfillService::new(cfg, sanitiser).run()?;
            println!(
                "Inspected {} conversations: {} messages rewritten, {} suppressed.",
                outcome.conversations, outcome.rewritten, outcome.suppressed
            );
        }
        Some(Commands::Nudges) => {
            let cfg = resolve_config()?;
            let candidates = NudgeService::new(cfg).candidates(Utc::now())?;
            if candidates.is_empty() {
                println!("No conversations due a check-in.");
            } else {
                for c in candidates {
                    println!("ID: {}, Owner: {}, Language: {}", c.conversation_id, c.owner, c.language);
                }
            }
        }
        None => {
            println!("Use --help to see available commands.");
        }
    }

    Ok(())
}

/// Reads the input text from a file, or stdin when no file is given.
fn read_input(file: Option<PathBuf>) -> Result<String, std::io::Error> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Resolves configuration from the environment, as the server binaries do.
fn resolve_config() -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    let chat_data_dir =
        std::env::var("SOLACE_DATA_DIR").unwrap_or_else(|_| DEFAULT_CHAT_DATA_DIR.into());
    let retention_days = retention_days_from_env_value(std::env::var("SOLACE_RETENTION_DAYS").ok())?;
    let nudge_quiet_hours =
        nudge_quiet_hours_from_env_value(std::env::var("SOLACE_NUDGE_QUIET_HOURS").ok())?;

    let fallback_policy = match std::env::var("SOLACE_FALLBACK_POLICY") {
        Ok(value) if !value.trim().is_empty() => FallbackPolicy::parse(&value)?,
        _ => FallbackPolicy::FailOpen,
    };

    let extra_pattern_file = std::env::var("SOLACE_PATTERN_FILE").ok().map(PathBuf::from);

    Ok(Arc::new(CoreConfig::new(
        PathBuf::from(chat_data_dir),
        retention_days,
        nudge_quiet_hours,
        fallback_policy,
        extra_pattern_file,
    )?))
}

/// Builds the sanitiser with the configured pattern set and policy.
fn build_sanitiser() -> Result<Sanitiser, Box<dyn std::error::Error>> {
    let cfg = resolve_config()?;
    let patterns = match cfg.extra_pattern_file() {
        Some(path) => PatternSet::from_file(path)?,
        None => PatternSet::default_set(),
    };
    Ok(Sanitiser::new(
        patterns,
        cfg.fallback_policy(),
        SERVER_MIN_CLEAN_CHARS,
    ))
}
