//! shapecodec CLI
//!
//! Inspects files holding one or more encoded values back to back.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shapecodec::{Codec, CodecConfig, Result, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// shapecodec CLI
#[derive(Parser, Debug)]
#[command(name = "shapecodec-cli")]
#[command(about = "Inspect self-describing binary values")]
#[command(version)]
struct Args {
    /// Input is hex text rather than raw bytes
    #[arg(long)]
    hex: bool,

    /// Register an opaque extension width, e.g. `--ext 18:12` (repeatable)
    #[arg(long = "ext", value_name = "TAG:WIDTH", value_parser = parse_extension)]
    extensions: Vec<(u8, usize)>,

    /// Maximum region nesting depth
    #[arg(long, default_value = "64")]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every value in the file as a tree
    Dump {
        /// File to read
        file: PathBuf,
    },

    /// Validate every value in the file without printing it
    Check {
        /// File to read
        file: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shapecodec=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let codec = match build_codec(&args) {
        Ok(codec) => codec,
        Err(e) => {
            tracing::error!("Invalid options: {}", e);
            std::process::exit(2);
        }
    };

    let result = match &args.command {
        Commands::Dump { file } => load(file, args.hex).and_then(|bytes| dump(&codec, &bytes)),
        Commands::Check { file } => load(file, args.hex).and_then(|bytes| check(&codec, &bytes)),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn build_codec(args: &Args) -> Result<Codec> {
    let config = CodecConfig::builder().max_depth(args.max_depth).build();
    let mut builder = Codec::builder().config(config);
    for &(tag, width) in &args.extensions {
        builder = builder.raw_extension(tag, width)?;
    }
    builder.build()
}

fn load(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let raw = std::fs::read(path)?;
    tracing::debug!("Read {} bytes from {}", raw.len(), path.display());
    if hex {
        parse_hex(&raw)
    } else {
        Ok(raw)
    }
}

fn dump(codec: &Codec, bytes: &[u8]) -> Result<()> {
    let mut reader = Cursor::new(bytes);
    let mut index = 0;
    while let Some(frame) = codec.read_frame(&mut reader)? {
        let value: Value = codec.decode_uncached(&frame)?;
        println!("# value {} ({} bytes)", index, frame.len());
        println!("{}", value);
        index += 1;
    }
    tracing::info!("Dumped {} values", index);
    Ok(())
}

fn check(codec: &Codec, bytes: &[u8]) -> Result<()> {
    let mut reader = Cursor::new(bytes);
    let mut count = 0usize;
    let mut offset = 0usize;
    while let Some(frame) = codec.read_frame(&mut reader)? {
        if let Err(e) = codec.decode_uncached::<Value>(&frame) {
            println!("value {} at offset {}: {}", count, offset, e);
            return Err(e);
        }
        offset += frame.len();
        count += 1;
    }
    println!("OK: {} values, {} bytes", count, offset);
    Ok(())
}

/// Parse `TAG:WIDTH`
fn parse_extension(s: &str) -> std::result::Result<(u8, usize), String> {
    let (tag, width) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TAG:WIDTH, got `{}`", s))?;
    let tag = tag.trim().parse::<u8>().map_err(|e| format!("bad tag `{}`: {}", tag, e))?;
    let width = width
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad width `{}`: {}", width, e))?;
    Ok((tag, width))
}

/// Decode hex text, ignoring whitespace
fn parse_hex(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(shapecodec::CodecError::CorruptData(
            "Hex input has an odd number of digits".to_string(),
        ));
    }

    digits
        .chunks(2)
        .map(|pair| -> Result<u8> {
            let high = hex_digit(pair[0])?;
            let low = hex_digit(pair[1])?;
            Ok((high << 4) | low)
        })
        .collect()
}

fn hex_digit(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(shapecodec::CodecError::CorruptData(format!(
            "Invalid hex digit `{}`",
            c as char
        ))),
    }
}
