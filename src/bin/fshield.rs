//! FormShield CLI - Offline tooling for recorded client sessions
//!
//! Commands:
//! - aggregate: Replay a session trace and emit the submission payload
//! - fingerprint: Compute a device fingerprint from recorded attributes
//! - validate: Check a session trace for schema and consistency problems

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use formshield::fingerprint::{DeviceFingerprintGenerator, EnvironmentAttributes};
use formshield::{SessionTrace, SignalError, FORMSHIELD_VERSION};

/// FormShield - Anti-fraud signal collection engine
#[derive(Parser)]
#[command(name = "fshield")]
#[command(version = FORMSHIELD_VERSION)]
#[command(about = "Replay and inspect recorded form-session signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session trace and emit the submission payload
    Aggregate {
        /// Input trace file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Emit the payload even when no liveness capture is present
        #[arg(long)]
        allow_missing_liveness: bool,

        /// Pretty-print the payload (default when writing to a TTY)
        #[arg(long)]
        pretty: bool,
    },

    /// Compute a device fingerprint from recorded environment attributes
    Fingerprint {
        /// Input attributes file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check a session trace for schema and consistency problems
    Validate {
        /// Input trace file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ShieldCliError> {
    match cli.command {
        Commands::Aggregate {
            input,
            output,
            allow_missing_liveness,
            pretty,
        } => cmd_aggregate(&input, &output, allow_missing_liveness, pretty),

        Commands::Fingerprint { input } => cmd_fingerprint(&input),

        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn read_input(path: &PathBuf) -> Result<String, ShieldCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn cmd_aggregate(
    input: &PathBuf,
    output: &PathBuf,
    allow_missing_liveness: bool,
    pretty: bool,
) -> Result<(), ShieldCliError> {
    let trace_json = read_input(input)?;
    let trace = SessionTrace::from_json(&trace_json)?;
    trace.validate()?;

    let session = trace.replay(Utc::now())?;
    let snapshot = trace.value_snapshot();

    let signals = if allow_missing_liveness {
        session.finalize_unchecked(&snapshot)
    } else {
        session.finalize(&snapshot)?
    };

    let to_stdout = output.to_string_lossy() == "-";
    let pretty = pretty || (to_stdout && atty::is(atty::Stream::Stdout));
    let payload = if pretty {
        serde_json::to_string_pretty(&signals)?
    } else {
        serde_json::to_string(&signals)?
    };

    if to_stdout {
        println!("{}", payload);
    } else {
        fs::write(output, payload)?;
    }
    Ok(())
}

fn cmd_fingerprint(input: &PathBuf) -> Result<(), ShieldCliError> {
    let attrs_json = read_input(input)?;
    let attrs: EnvironmentAttributes = serde_json::from_str(&attrs_json)?;

    let fingerprint = DeviceFingerprintGenerator::new().generate(&attrs);
    match fingerprint.as_hex() {
        Some(hex) => {
            println!("{}", hex);
            Ok(())
        }
        None => Err(ShieldCliError::FingerprintUnavailable),
    }
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), ShieldCliError> {
    let trace_json = read_input(input)?;
    let trace = SessionTrace::from_json(&trace_json)?;

    let error = trace.validate().err().map(|e| e.to_string());
    let report = ValidationReport {
        tracked_fields: trace.tracked_fields.len(),
        events: trace.events.len(),
        has_environment: trace.environment.is_some(),
        has_face_capture: trace.face_capture.is_some(),
        valid: error.is_none(),
        error,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trace: {} fields, {} events", report.tracked_fields, report.events);
        println!(
            "Environment attributes: {}",
            if report.has_environment { "present" } else { "absent" }
        );
        println!(
            "Face capture: {}",
            if report.has_face_capture { "present" } else { "absent" }
        );
        match &report.error {
            None => println!("Result: valid"),
            Some(error) => println!("Result: invalid - {}", error),
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(ShieldCliError::ValidationFailed)
    }
}

enum ShieldCliError {
    Io(io::Error),
    Signal(SignalError),
    Json(serde_json::Error),
    FingerprintUnavailable,
    ValidationFailed,
}

impl From<io::Error> for ShieldCliError {
    fn from(e: io::Error) -> Self {
        ShieldCliError::Io(e)
    }
}

impl From<SignalError> for ShieldCliError {
    fn from(e: SignalError) -> Self {
        ShieldCliError::Signal(e)
    }
}

impl From<serde_json::Error> for ShieldCliError {
    fn from(e: serde_json::Error) -> Self {
        ShieldCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ShieldCliError> for CliError {
    fn from(e: ShieldCliError) -> Self {
        match e {
            ShieldCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ShieldCliError::Signal(e) => CliError {
                code: "SIGNAL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'fshield validate' on the trace for details".to_string()),
            },
            ShieldCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ShieldCliError::FingerprintUnavailable => CliError {
                code: "FINGERPRINT_UNAVAILABLE".to_string(),
                message: "No environment attributes available to hash".to_string(),
                hint: Some("Provide at least one attribute in the input".to_string()),
            },
            ShieldCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "Session trace failed validation".to_string(),
                hint: Some("Fix the reported problem and retry".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    tracked_fields: usize,
    events: usize,
    has_environment: bool,
    has_face_capture: bool,
    valid: bool,
    error: Option<String>,
}
