use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chunkwright_core::Platform;
use chunkwright_core::payload::Compression;

mod commands;

/// Default target when `--target-version` and `MC_DATA_VERSION` are both unset.
pub const DEFAULT_DATA_VERSION: i32 = 4671;

#[derive(Parser)]
#[command(name = "chunkwright", about = "Read and rewrite chunk NBT across save format revisions")]
pub struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode chunk files and summarize them
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Inputs are framed region payloads rather than bare NBT
        #[arg(short, long)]
        payload: bool,
        #[arg(long)]
        json: bool,
        /// Print a timing report when done
        #[arg(long)]
        report: bool,
    },
    /// Re-encode one chunk for another data version
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, env = "MC_DATA_VERSION", default_value_t = DEFAULT_DATA_VERSION)]
        target_version: i32,
        /// gzip, zlib, lz4 or none
        #[arg(short, long, default_value = "zlib")]
        compression: Compression,
        /// Read and write framed region payloads
        #[arg(short, long)]
        payload: bool,
        #[arg(long)]
        report: bool,
    },
    /// Show the feature table resolved for a version, or every interface
    Describe {
        #[arg(long, default_value = "java")]
        platform: Platform,
        #[arg(long)]
        version: Option<i32>,
    },
    /// Summarize a .schematic file
    Schematic {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Inspect { files, payload, json, report } => commands::inspect(&files, payload, json, report),
        Command::Convert { input, output, target_version, compression, payload, report } => {
            commands::convert(&input, &output, target_version, compression, payload, report)
        }
        Command::Describe { platform, version } => commands::describe(platform, version),
        Command::Schematic { file, json } => commands::schematic(&file, json),
    }
}
