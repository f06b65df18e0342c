//! AJ OS input guard CLI.
//!
//! Runs the sanitizers and id helpers from the command line and reports
//! the effective configuration.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use ajos_guard::config::load_or_default;
use ajos_guard::observability::logging;
use ajos_guard::security::sanitize::{check_email, check_text, check_url, sanitize_object, Verdict};
use ajos_guard::security::{generate_secure_id, is_valid_uuid, mask_sensitive};

#[derive(Parser)]
#[command(name = "ajos-guard")]
#[command(about = "Input sanitization and configuration tools for AJ OS", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize free text
    Text {
        input: String,
        /// Print the tagged verdict as JSON
        #[arg(long)]
        explain: bool,
    },
    /// Validate a URL or relative path
    Url {
        input: String,
        #[arg(long)]
        explain: bool,
    },
    /// Validate an email address
    Email {
        input: String,
        #[arg(long)]
        explain: bool,
    },
    /// Sanitize every field of a JSON object read from a file or `-` for stdin
    Record {
        file: String,
        #[arg(long = "url-field")]
        url_fields: Vec<String>,
        #[arg(long = "email-field")]
        email_fields: Vec<String>,
    },
    /// Generate a record id, or check one
    Uuid {
        #[arg(long)]
        check: Option<String>,
    },
    /// Mask a secret for display
    Mask {
        value: String,
        #[arg(long, default_value_t = 4)]
        visible: usize,
    },
    /// Show configuration status with credentials masked
    Status,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Log settings come from the config, so nothing is emitted before init.
    let config = load_or_default(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::debug!(
        path = ?cli.config,
        app = %config.app.name,
        version = %config.app.version,
        backend_configured = config.is_backend_configured(),
        ai_configured = config.is_ai_configured(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Text { input, explain } => print_verdict(check_text(&input), explain)?,
        Commands::Url { input, explain } => print_verdict(check_url(&input), explain)?,
        Commands::Email { input, explain } => print_verdict(check_email(&input), explain)?,
        Commands::Record { file, url_fields, email_fields } => {
            let record = read_record(&file)?;
            let cleaned = sanitize_object(&record, url_fields.as_slice(), email_fields.as_slice());
            println!("{}", serde_json::to_string_pretty(&cleaned)?);
        }
        Commands::Uuid { check: Some(id) } => {
            if is_valid_uuid(&id) {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Uuid { check: None } => println!("{}", generate_secure_id()),
        Commands::Mask { value, visible } => println!("{}", mask_sensitive(&value, visible)),
        Commands::Status => println!("{}", serde_json::to_string_pretty(&config.status())?),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_verdict(verdict: Verdict, explain: bool) -> Result<(), serde_json::Error> {
    if explain {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        println!("{}", verdict.into_string());
    }
    Ok(())
}

fn read_record(file: &str) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    let content = if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(file)?
    };

    let value: Value = serde_json::from_str(&content)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object, got {}", type_name(&other)).into()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
