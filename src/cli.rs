use crate::configs::{ExtractionMode, FileContent, GlobalConfig};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, str::FromStr};

#[derive(Debug, Parser)]
#[command(name = "x509-viewer")]
#[command(version)]
#[command(about = "Inspect X.509 certificates and keep a shelf of the ones you have seen", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Extra configuration file, layered over ./config and /etc/x509-viewer/config
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Shelf file
    #[arg(short, long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Keep the shelf in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Where the name and issuer fields are read from
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<ExtractionMode>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a certificate file (`-` for stdin), shelve it and show it
    Open {
        #[arg(value_name = "FILE", value_parser = FileContent::from_str)]
        file: FileContent,
    },
    /// List shelved certificates
    List {
        /// Print the shelf as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a shelved certificate
    Show {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Interactive session (default)
    Shell,
}

impl Cli {
    /// Flags win over every configuration source.
    pub fn apply(&self, config: &mut GlobalConfig) {
        if let Some(path) = &self.store {
            config.store.path = path.clone();
        }
        if self.ephemeral {
            config.store.ephemeral = true;
        }
        if let Some(mode) = self.mode {
            config.extraction.mode = mode;
        }
    }
}
