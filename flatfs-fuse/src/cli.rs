use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about = "Inspect and edit flatfs disk images")]
pub struct Cli {
    /// Disk image
    pub image: PathBuf,

    /// Directories allowed under the root
    #[arg(long)]
    pub max_dirs: Option<usize>,

    /// Files allowed in one directory
    #[arg(long)]
    pub max_files: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or wipe) the image and format it
    Format {
        /// Image size in blocks
        #[arg(long, short)]
        blocks: Option<u64>,
    },
    /// Create a directory under the root
    Mkdir { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Copy a host file into the image
    Put {
        path: String,
        source: PathBuf,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print a file's contents
    Cat {
        path: String,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        length: Option<usize>,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Show attributes of a path
    Stat { path: String },
}
