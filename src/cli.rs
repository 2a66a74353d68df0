use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "eduscore",
    version,
    about = "Rubric scoring and triage for AI-generated educational answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every record of a delimited input file.
    Evaluate(EvaluateArgs),
    /// Summarize a batch and rank the issues it shows.
    Analyze(AnalyzeArgs),
    /// Print the effective rubric configuration as JSON.
    Rubric(RubricArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long, conflicts_with = "report")]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RubricArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
}
