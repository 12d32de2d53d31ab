//! `son` CLI: decode XML-encoded SON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Decode an XML response to pretty-printed, order-preserving JSON (stdin → stdout)
//! cat response.xml | son decode
//!
//! # Decode from file to file, compact output
//! son decode -i response.xml -o doc.json --compact
//!
//! # Flatten to plain maps first (key order is discarded, output keys sorted)
//! son decode -i response.xml --flat
//!
//! # Tighter nesting limit for untrusted input
//! son decode -i response.xml --max-depth 32
//!
//! # Print the ordered debug representation
//! son inspect -i response.xml
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use son_core::{DecodeOptions, Document, PlainValue};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "son",
    version,
    about = "Decode XML-encoded SON documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an XML document to JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Flatten to plain maps and lists before rendering
        #[arg(long)]
        flat: bool,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Maximum element nesting depth
        #[arg(long, default_value_t = DecodeOptions::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Print the ordered debug representation of a document
    Inspect {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            output,
            flat,
            compact,
            max_depth,
        } => {
            let xml = read_input(input.as_deref())?;
            let options = DecodeOptions::default().with_max_depth(max_depth);
            let doc = son_core::from_xml_with(&xml, options)
                .context("Failed to decode XML document")?;

            let json = if flat {
                son_core::plain_to_json(&PlainValue::Map(doc.to_dict()))
            } else {
                son_core::to_json(&doc)
            };
            let mut rendered = if compact {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            rendered.push('\n');
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Inspect { input } => {
            let xml = read_input(input.as_deref())?;
            let doc = Document::from_xml(&xml).context("Failed to decode XML document")?;
            println!("{doc}");
        }
    }

    Ok(())
}

/// Stderr subscriber filtered by `RUST_LOG`, falling back to `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
