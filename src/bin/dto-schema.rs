//! DTO Schema CLI
//!
//! Command-line interface for validating payloads against DTO schemas and
//! inspecting schema catalogs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dto_schema::{
    accounts, load_catalog_auto, load_json, to_json_schema, validate_value, Catalog,
    ValidateOptions, ValidationResult,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dto-schema")]
#[command(about = "Validate and whitelist payloads against DTO schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload against a schema
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Schema id (e.g., AccountRegisterRequest)
        #[arg(long, short)]
        schema: String,

        /// Catalog source: file path or URL (default: built-in account schemas)
        #[arg(long)]
        catalog: Option<String>,

        /// Strict mode: report undeclared keys instead of dropping them
        #[arg(long)]
        strict: bool,

        /// Coerce values to each field's declared type before validating
        #[arg(long)]
        coerce: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print a schema definition
    Show {
        /// Schema id
        schema: String,

        /// Catalog source: file path or URL (default: built-in account schemas)
        #[arg(long)]
        catalog: Option<String>,

        /// Print the JSON Schema export instead of the definition
        #[arg(long)]
        json_schema: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List schema ids in a catalog
    List {
        /// Catalog source: file path or URL (default: built-in account schemas)
        #[arg(long)]
        catalog: Option<String>,
    },
}

fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            catalog,
            strict,
            coerce,
            json,
            pretty,
        } => run_validate(ValidateArgs {
            payload,
            schema,
            catalog,
            options: ValidateOptions::new().strict(strict).coerce(coerce),
            json_output: json,
            pretty,
        }),

        Commands::Show {
            schema,
            catalog,
            json_schema,
            pretty,
            output,
        } => run_show(&schema, catalog.as_deref(), json_schema, pretty, output),

        Commands::List { catalog } => run_list(catalog.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load the requested catalog, or the built-in account schemas.
fn open_catalog(source: Option<&str>) -> Result<Catalog, (String, u8)> {
    match source {
        Some(source) => load_catalog_auto(source)
            .map_err(|e| (format!("loading catalog: {}", e), e.exit_code() as u8)),
        None => accounts::builtin_catalog().map_err(|e| (e.to_string(), e.exit_code() as u8)),
    }
}

struct ValidateArgs {
    payload: PathBuf,
    schema: String,
    catalog: Option<String>,
    options: ValidateOptions,
    json_output: bool,
    pretty: bool,
}

fn run_validate(args: ValidateArgs) -> Result<(), u8> {
    let ValidateArgs {
        payload: payload_path,
        schema: schema_id,
        catalog,
        options,
        json_output,
        pretty,
    } = args;

    let catalog = open_catalog(catalog.as_deref()).map_err(|(msg, code)| {
        report_error(json_output, &msg);
        code
    })?;

    let schema = catalog.require(&schema_id).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })?;

    let payload = load_json(&payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let result = validate_value(schema, &payload, &options);

    if json_output {
        println!("{}", to_json(&result, pretty)?);
    } else {
        match &result {
            ValidationResult::Ok { value } => println!("{}", to_json(value, pretty)?),
            ValidationResult::Fail { errors } => {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  [{}] {}", error.rule, error);
                }
            }
        }
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_show(
    schema_id: &str,
    catalog: Option<&str>,
    json_schema: bool,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let catalog = open_catalog(catalog).map_err(|(msg, code)| {
        eprintln!("Error: {}", msg);
        code
    })?;

    let schema = catalog.require(schema_id).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let rendered = if json_schema {
        to_json(&to_json_schema(schema), pretty)?
    } else {
        to_json(schema, pretty)?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn run_list(catalog: Option<&str>) -> Result<(), u8> {
    let catalog = open_catalog(catalog).map_err(|(msg, code)| {
        eprintln!("Error: {}", msg);
        code
    })?;

    for schema in catalog.iter() {
        println!("{} ({} fields)", schema.id(), schema.len());
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
