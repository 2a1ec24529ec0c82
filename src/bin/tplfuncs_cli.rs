//! tplfuncs CLI - call registry functions from the shell
//!
//! Commands: funcs, call, describe
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero when a call fails

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tplfuncs_core::{is_empty, kind_of, type_of, FuncConfig, FuncMap, Value, ENGINE_VERSION};

#[derive(Parser)]
#[command(name = "tplfuncs-cli")]
#[command(about = "tplfuncs CLI - Template Function Registry")]
#[command(version = ENGINE_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON registry config
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered function names
    Funcs,

    /// Call a function
    Call {
        /// Function name
        name: String,

        /// JSON array of positional arguments
        #[arg(short, long, default_value = "[]")]
        args: String,
    },

    /// Show kind, type label and emptiness of a JSON value
    Describe {
        /// JSON value
        value: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args(raw: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => Ok(items.into_iter().map(Value::from).collect()),
        Ok(_) => Err("arguments must be a JSON array".to_string()),
        Err(e) => Err(format!("Invalid arguments: {}", e)),
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match FuncConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                let output = serde_json::json!({ "success": false, "error": e.to_string() });
                println!("{}", output);
                return ExitCode::FAILURE;
            }
        },
        None => FuncConfig::default(),
    };

    match cli.command {
        Commands::Funcs => {
            let funcs = FuncMap::with_config(&config);
            println!("{}", serde_json::to_string_pretty(&funcs.names()).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Call { name, args } => {
            let args = match parse_args(&args) {
                Ok(a) => a,
                Err(e) => {
                    println!("{}", serde_json::json!({ "success": false, "error": e }));
                    return ExitCode::FAILURE;
                }
            };

            let funcs = FuncMap::with_config(&config);
            match funcs.call(&name, &args) {
                Ok(result) => {
                    let output = serde_json::json!({
                        "success": true,
                        "result": result,
                        "rendered": result.to_string(),
                        "kind": kind_of(&result),
                        "type": type_of(&result),
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    println!("{}", serde_json::to_string(&output).unwrap());
                    ExitCode::from(2)
                }
            }
        }

        Commands::Describe { value } => {
            let value = match serde_json::from_str::<serde_json::Value>(&value) {
                Ok(v) => Value::from(v),
                Err(e) => {
                    println!("{}", serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            };
            let output = serde_json::json!({
                "kind": kind_of(&value),
                "type": type_of(&value),
                "empty": is_empty(&value),
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }
    }
}
