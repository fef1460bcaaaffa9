//! File integrity client

mod constants;
mod download;
mod http;
mod local;
mod logger;
mod manage;
mod upload;
mod verify;

use clap::{Args, Parser, Subcommand};
use constants::DEFAULT_SERVER_URL;
use http::ApiClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "integrity-client")]
#[command(about = "HMAC-SHA256 file integrity client")]
struct Cli {
    /// Server URL
    #[arg(short, long, global = true, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ExpectedHmac {
    /// Expected base64 HMAC value
    #[arg(long)]
    hmac: Option<String>,
    /// Read the expected HMAC from a .hmac document
    #[arg(long)]
    hmac_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the HMAC of a local file
    Generate {
        file: PathBuf,
        /// Secret key
        #[arg(short, long)]
        key: String,
        /// Also write <file>.hmac
        #[arg(long)]
        save: bool,
    },
    /// Check a local file against an expected HMAC (exit code 1 when it does not match)
    Check {
        file: PathBuf,
        /// Secret key
        #[arg(short, long)]
        key: String,
        #[command(flatten)]
        expected: ExpectedHmac,
    },
    /// Upload files to the server
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Secret key
        #[arg(short, long)]
        key: String,
    },
    /// List stored files
    List,
    /// Verify a file on the server against an expected HMAC
    Verify {
        file: PathBuf,
        /// Secret key
        #[arg(short, long)]
        key: String,
        #[command(flatten)]
        expected: ExpectedHmac,
    },
    /// Find the stored version of a file and verify it
    QuickVerify {
        file: PathBuf,
        /// Secret key
        #[arg(short, long)]
        key: String,
    },
    /// Download a stored file
    Download {
        stored_id: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Download the .hmac document of a stored file
    DownloadHmac {
        stored_id: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Append a tamper marker to a stored file
    Tamper { stored_id: String },
    /// Delete a stored file and its record
    Delete { stored_id: String },
    /// Delete every stored file and record
    Reset,
}

impl ExpectedHmac {
    fn resolve(self) -> anyhow::Result<String> {
        match (self.hmac, self.hmac_file) {
            (Some(hmac), _) => Ok(hmac),
            (None, Some(path)) => local::read_hmac_file(&path),
            (None, None) => anyhow::bail!("Either --hmac or --hmac-file is required"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let api = ApiClient::new(&cli.server);

    let is_valid = match cli.command {
        Commands::Generate { file, key, save } => {
            local::generate(&file, &key, save)?;
            true
        }
        Commands::Check {
            file,
            key,
            expected,
        } => local::check(&file, &key, &expected.resolve()?)?,
        Commands::Upload { files, key } => {
            upload::upload_files(&api, &files, &key)?;
            true
        }
        Commands::List => {
            upload::list_files(&api)?;
            true
        }
        Commands::Verify {
            file,
            key,
            expected,
        } => verify::verify_remote(&api, &file, &key, &expected.resolve()?)?,
        Commands::QuickVerify { file, key } => verify::quick_verify(&api, &file, &key)?,
        Commands::Download {
            stored_id,
            output_dir,
        } => {
            download::download_file(&api, &stored_id, &output_dir)?;
            true
        }
        Commands::DownloadHmac {
            stored_id,
            output_dir,
        } => {
            download::download_hmac(&api, &stored_id, &output_dir)?;
            true
        }
        Commands::Tamper { stored_id } => {
            manage::tamper(&api, &stored_id)?;
            true
        }
        Commands::Delete { stored_id } => {
            manage::delete(&api, &stored_id)?;
            true
        }
        Commands::Reset => {
            manage::reset(&api)?;
            true
        }
    };

    if !is_valid {
        std::process::exit(1);
    }
    Ok(())
}
