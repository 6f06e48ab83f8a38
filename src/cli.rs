use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "brandlens",
    version,
    about = "Brand-mention vs reference-page correlation tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze(AnalyzeArgs),
    Lookup(LookupArgs),
    Summarize(SummarizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long, default_value = "brands.csv")]
    pub dataset: PathBuf,

    #[arg(long, default_value = ";")]
    pub delimiter: char,

    #[arg(long)]
    pub page_index: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long, default_value = "brands.csv")]
    pub dataset: PathBuf,

    #[arg(long, default_value = ";")]
    pub delimiter: char,

    #[arg(long)]
    pub page_index: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    #[arg(long, default_value = "brands.csv")]
    pub dataset: PathBuf,

    #[arg(long, default_value = ";")]
    pub delimiter: char,
}
