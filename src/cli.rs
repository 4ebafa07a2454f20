use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Browse image sequences inside archives and jump between scenes")]
pub struct Cli {
    /// Configuration file, layered over the user's config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the image entries of a container in reading order
    Entries {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,
    },

    /// List the containers next to this one, marking it
    Siblings {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,
    },

    /// Print entry fingerprints
    Hash {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,

        /// Entries to fingerprint (all entries when omitted)
        indices: Vec<usize>,
    },

    /// Compare the fingerprints of two entries
    Diff {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,
        a: usize,
        b: usize,
    },

    /// Find the nearest scene boundary from an entry
    Scene {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,

        /// Entry to start from
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Search towards the start of the container
        #[arg(long)]
        backward: bool,

        /// Stride between compared entries (overrides configuration)
        #[arg(long)]
        skip: Option<usize>,

        /// Normalised distance above which entries differ (overrides configuration)
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Print every scene boundary of a container, from the first entry on
    Walk {
        /// Archive (.zip, .cbz) or directory
        path: PathBuf,
    },
}

impl Cli {
    /// Default log filter when `RUST_LOG` isn't set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
