use clap::{Args, Parser, Subcommand, ValueEnum};
use guardian_classifiers::Threshold;
use guardian_youtube::CommentOrder;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "guardian")]
#[command(author, version, about = "Guardian comment toxicity analysis")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Web(WebArgs),

    /// Analyze the comments of a YouTube video
    Youtube(YoutubeArgs),

    /// Analyze a single comment
    Comment(CommentArgs),

    /// Predict toxicity for a comment or a file of comments
    Predict(PredictArgs),
}

/// Overrides for the model files named in settings
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Path to the toxicity model (.safetensors)
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Path to the vectorizer file
    #[arg(long)]
    pub vectorizer_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WebArgs {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Accepted for compatibility; hot reload is not supported
    #[arg(long)]
    pub reload: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct YoutubeArgs {
    /// YouTube video URL
    pub url: String,

    /// Maximum comments to analyze
    #[arg(long, default_value = "100")]
    pub max_comments: usize,

    /// Toxicity threshold
    #[arg(long, default_value = "0.5", value_parser = parse_threshold)]
    pub threshold: Threshold,

    /// Comment order: time or relevance
    #[arg(long, default_value = "relevance", value_parser = parse_order)]
    pub order: CommentOrder,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: ReportFormat,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Comment text to analyze
    pub text: String,

    /// Toxicity threshold
    #[arg(long, default_value = "0.5", value_parser = parse_threshold)]
    pub threshold: Threshold,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Single comment to predict
    #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
    pub comment: Option<String>,

    /// Input file with comments, one per line
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Classification threshold
    #[arg(short, long, default_value = "0.5", value_parser = parse_threshold)]
    pub threshold: Threshold,

    /// Output format
    #[arg(short, long, value_enum, default_value = "simple")]
    pub format: PredictFormat,

    /// Output file for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// YouTube report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Text,
}

/// Batch prediction format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PredictFormat {
    Json,
    Csv,
    Simple,
}

fn parse_threshold(s: &str) -> Result<Threshold, String> {
    let value: f32 = s.parse().map_err(|_| format!("invalid threshold '{}'", s))?;
    Threshold::new(value).map_err(|e| e.to_string())
}

fn parse_order(s: &str) -> Result<CommentOrder, String> {
    s.parse()
}
