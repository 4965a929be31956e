//! TWOAES recrypt tool
//!
//! Re-keys AES-ECB ciphertext from one key to another without writing the
//! plaintext out: the key file holds `k1 || k2`, the input file ciphertext
//! under `k1`, and the output file receives the same data encrypted under
//! `k2`.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cipher_engine::{CipherContext, ContextOptions, TwoAes, DEFAULT_WINDOW};
use clap::Parser;
use log::{debug, info};
use zeroize::Zeroizing;

/// Command-line arguments for the TWOAES recrypt program.
#[derive(Parser, Debug)]
#[command(version, about = "Re-key AES-ECB ciphertext with TWOAES")]
struct Cli {
    /// Path to the input file.
    #[arg(short, long, help = "Hex file with ciphertext under the first key")]
    input: PathBuf,

    /// Key for the cipher.
    #[arg(short, long, help = "Hex file containing k1 || k2 (32, 48 or 64 bytes)")]
    key: PathBuf,

    /// Path to the output file.
    #[arg(short, long, help = "Path to the output file")]
    output: PathBuf,

    /// Blocks per processing window.
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Log every window.
    #[arg(short, long)]
    verbose: bool,
}

/// Reads hex data from a file, ignoring spaces and line breaks
fn read_hex_from_file(path: &Path) -> Result<Vec<u8>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_hex(&content).with_context(|| format!("Invalid hex in {}", path.display()))
}

fn parse_hex(content: &str) -> Result<Vec<u8>> {
    let hex_string: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    if hex_string.is_empty() {
        bail!("File is empty or contains no valid characters");
    }

    Ok(hex::decode(&hex_string)?)
}

/// Writes bytes as space separated hex
fn write_hex_to_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, format_hex(data))
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn format_hex(data: &[u8]) -> String {
    data.chunks(1)
        .map(hex::encode)
        .collect::<Vec<String>>()
        .join(" ")
}

fn run(cli: &Cli) -> Result<()> {
    let key = Zeroizing::new(read_hex_from_file(&cli.key)?);
    let ciphertext = read_hex_from_file(&cli.input)?;

    let options = ContextOptions::default().with_window(cli.window);
    let ctx = CipherContext::<TwoAes>::with_options(&key, options)
        .context("Failed to set up the TWOAES context")?;
    debug!("{ctx:?}");

    let recrypted = ctx
        .encrypt_with_progress(&ciphertext, |report| {
            debug!(
                "window {} done, {}/{} bytes",
                report.index, report.processed, report.total
            );
            ControlFlow::Continue(())
        })
        .context("Recrypt failed")?;

    write_hex_to_file(&cli.output, &recrypted)?;
    info!(
        "recrypted {} bytes into {}",
        recrypted.len(),
        cli.output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    run(&cli)
}
