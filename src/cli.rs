//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fastdog", version, about = "Transcode GLTF/GLB models into FASTDOG containers and serve them")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address, overriding the configuration
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Convert a .gltf or .glb file into a FASTDOG container
    Transcode {
        input: PathBuf,
        /// Defaults to the input path with a .fastdog extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Unpack a FASTDOG container back into its JSON document
    Decode {
        input: PathBuf,
        /// Defaults to standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the header of a FASTDOG container
    Inspect { input: PathBuf },
}
