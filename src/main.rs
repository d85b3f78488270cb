//! csvnest - convert between JSON and CSV with nested cells

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use csvnest::config::{ByteArrayFormat, CodecConfig};
use csvnest::model::{TargetType, Value};
use csvnest::output::CsvSerializer;
use csvnest::parser::ParserSession;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTarget {
    /// Rows as maps with inferred leaf types; a single row becomes a map
    Dynamic,
    /// Always a sequence of maps with inferred leaf types
    Rows,
    /// Always a sequence of maps with string values
    Text,
}

impl From<CliTarget> for TargetType {
    fn from(t: CliTarget) -> Self {
        match t {
            CliTarget::Dynamic => TargetType::Dynamic,
            CliTarget::Rows => TargetType::seq_of(TargetType::map_of(TargetType::Dynamic)),
            CliTarget::Text => TargetType::seq_of(TargetType::map_of(TargetType::string())),
        }
    }
}

/// Convert between JSON and CSV whose cells hold nested maps and sequences
#[derive(Parser, Debug)]
#[command(name = "csvnest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Literal used for null cells
    #[arg(long, global = true, default_value = "null")]
    null: String,

    /// CSV quote character
    #[arg(long, global = true, default_value_t = '"')]
    quote: char,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read CSV and print it as JSON
    Decode {
        /// CSV file to read ("-" for stdin)
        file: PathBuf,

        /// Shape to decode rows into
        #[arg(short, long, value_enum, default_value = "dynamic")]
        target: CliTarget,

        /// Trim whitespace around cells before conversion
        #[arg(long)]
        trim: bool,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Read JSON and print it as CSV
    Encode {
        /// JSON file to read ("-" for stdin)
        file: PathBuf,

        /// Byte array encoding (base64 or semicolon)
        #[arg(long, default_value = "base64")]
        bytes: ByteArrayFormat,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let quote = u8::try_from(cli.quote)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Quote character must be ASCII: {}", cli.quote))?;
    let config = CodecConfig::default()
        .with_null_marker(cli.null)
        .with_quote(quote);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Decode {
            file,
            target,
            trim,
            compact,
        } => {
            let input = open(&file)?;
            let value = ParserSession::new(config.with_trim_strings(trim))
                .parse(input, &target.into())
                .with_context(|| format!("Failed to decode CSV file: {}", file.display()))?;

            let json = value.to_json();
            if compact {
                serde_json::to_writer(&mut out, &json)?;
            } else {
                serde_json::to_writer_pretty(&mut out, &json)?;
            }
            writeln!(out)?;
        }
        Command::Encode { file, bytes } => {
            let input = open(&file)?;
            let json: serde_json::Value = serde_json::from_reader(input)
                .with_context(|| format!("Failed to parse JSON file: {}", file.display()))?;

            CsvSerializer::new(config.with_byte_array_format(bytes))
                .serialize(&Value::from(json), &mut out)
                .context("Failed to write CSV")?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin()));
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}
