use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Vellum — deterministic, content-addressed document generation",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Content store directory
    #[arg(long, global = true, default_value = ".vellum/store")]
    pub store_dir: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the content hash of a file
    Hash(HashArgs),
    /// Store a file under its content address
    Store(StoreArgs),
    /// Resolve a doc://, file://, or http(s):// URI
    Resolve(ResolveArgs),
    /// Promote a non-canonical source URI to doc:// form
    Canonicalize(CanonicalizeArgs),
    /// Check the environment for reproducibility hazards
    Doctor(DoctorArgs),
}

#[derive(Args)]
pub struct HashArgs {
    pub file: String,
    #[arg(long, default_value = "sha256")]
    pub algorithm: String,
}

#[derive(Args)]
pub struct StoreArgs {
    pub file: String,
    #[arg(long, default_value = "sha256")]
    pub algorithm: String,
    /// Declared document kind recorded in metadata
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub uri: String,
    /// Write resolved content to this path instead of reporting metadata
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct CanonicalizeArgs {
    pub uri: String,
    #[arg(long, default_value = "sha256")]
    pub algorithm: String,
}

#[derive(Args)]
pub struct DoctorArgs {}
