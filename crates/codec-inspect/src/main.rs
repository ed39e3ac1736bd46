//! Command line front end for codec-inspect.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use codec_inspect::config::Config;
use codec_protocol::CodecCache;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "codec-inspect")]
#[clap(about = "Inspect descriptor streams and transcode row payloads")]
struct Cli {
    /// TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Descriptor dialect (v1 or v2)
    #[clap(short, long)]
    dialect: Option<String>,

    /// Print JSON on a single line
    #[clap(long)]
    compact: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the descriptor tree
    Describe {
        /// Descriptor stream, hex
        descriptor: String,
    },
    /// Decode one value payload to JSON
    Decode {
        /// Descriptor stream, hex
        descriptor: String,
        /// Value payload without its length prefix, hex
        data: String,
    },
    /// Encode a JSON value to a payload
    Encode {
        /// Descriptor stream, hex
        descriptor: String,
        /// Value as JSON
        json: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if cli.compact {
        config.pretty = false;
    }
    let dialect = config.dialect()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(%dialect, pretty = config.pretty, "codec-inspect starting");

    let cache = CodecCache::new();
    let output = match &cli.command {
        Command::Describe { descriptor } => codec_inspect::describe(descriptor, dialect)?,
        Command::Decode { descriptor, data } => {
            codec_inspect::decode(&cache, descriptor, data, dialect, config.pretty)?
        }
        Command::Encode { descriptor, json } => {
            codec_inspect::encode(&cache, descriptor, json, dialect)?
        }
    };
    println!("{}", output);

    Ok(())
}
