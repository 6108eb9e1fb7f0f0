//! # Stego Binary Entry Point
//!
//! Thin wrapper that maps command-line flags onto the [`Encrypter`] and
//! [`Decrypter`] pipelines.
//!
//! ## Usage
//!
//! ```bash
//! echo "hello world!" | cargo run --bin stego -- encrypt --parts 5 --threshold 3
//! cargo run --bin stego -- decrypt -f out/secret.enc --key out/001.key --img out/002.png --key out/003.key
//! cargo run --bin stego -- decrypt -f out/secret.enc --master-key out/secret.enc.key
//! ```
//!
//! Settings can also come from a TOML file (`--config stego.toml`); flags
//! given on the command line override it.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use stego_secrets::common::config::load_config;
use stego_secrets::{Config, Decrypter, Encrypter, KeySource};

/// Split a secret into shares hidden inside ordinary photographs
#[derive(Parser, Debug)]
#[command(name = "stego", author, version, long_about = None)]
struct Cli {
    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    silent: bool,

    /// Also print created files and key material
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file (or stdin) and split its key
    Encrypt(EncryptArgs),
    /// Decrypt a file with a master key or enough partial keys
    Decrypt(DecryptArgs),
}

#[derive(Args, Debug)]
struct EncryptArgs {
    /// File to encrypt; reads stdin when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Logical name of the outputs (defaults to the input file name, or "secret")
    #[arg(short, long)]
    name: Option<String>,

    /// Number of partial keys to generate
    #[arg(short, long)]
    parts: Option<u8>,

    /// Partial keys needed to decrypt
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory of carrier images (jpg/jpeg/png)
    #[arg(short, long)]
    images: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecryptArgs {
    /// Encrypted file (`<name>.enc`)
    #[arg(short, long)]
    file: PathBuf,

    /// Master key file; partial keys are ignored when given
    #[arg(long)]
    master_key: Option<PathBuf>,

    /// Partial key file (repeatable)
    #[arg(long = "key")]
    keys: Vec<PathBuf>,

    /// Image with an embedded partial key (repeatable)
    #[arg(long = "img")]
    images: Vec<PathBuf>,

    /// Skip checksum verification
    #[arg(long)]
    no_verify: bool,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger(if cli.silent {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config: Config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Encrypt(args) => encrypt(config, args),
        Command::Decrypt(args) => decrypt(config, args),
    }
}

fn encrypt(config: Config, args: EncryptArgs) -> anyhow::Result<()> {
    let mut settings = config.encrypt;
    settings.parts = args.parts.unwrap_or(settings.parts);
    settings.threshold = args.threshold.unwrap_or(settings.threshold);
    settings.output_dir = args.output.unwrap_or(settings.output_dir);
    settings.images_dir = args.images.unwrap_or(settings.images_dir);

    let encrypter = Encrypter::new(settings)?;

    match &args.file {
        Some(path) => {
            let name = match args.name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("input path has no file name")?,
            };
            let input = File::open(path)
                .with_context(|| format!("failed opening input file '{}'", path.display()))?;
            encrypter.encrypt(input, &name)?;
        }
        None => {
            let name = args.name.unwrap_or_else(|| "secret".to_string());
            encrypter.encrypt(io::stdin().lock(), &name)?;
        }
    }

    Ok(())
}

fn decrypt(config: Config, args: DecryptArgs) -> anyhow::Result<()> {
    let mut settings = config.decrypt;
    if args.no_verify {
        settings.verify_checksums = false;
    }

    let source = KeySource::resolve(args.master_key, args.keys, args.images);
    Decrypter::new(settings, source).decrypt(&args.file)?;

    Ok(())
}
