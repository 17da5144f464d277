use crate::cli::{PredictArgs, PredictFormat};
use crate::output::{predictions_to_csv, predictions_to_simple, write_output};
use anyhow::{bail, Context, Result};
use std::path::Path;

pub fn run(args: PredictArgs) -> Result<()> {
    let comments = match (&args.comment, &args.input) {
        (Some(comment), _) => vec![comment.clone()],
        (None, Some(path)) => read_comments(path)?,
        (None, None) => bail!("Must provide either --input file or --comment text"),
    };

    let settings = super::load_settings(&args.model)?;
    let scorer = super::load_scorer(&settings)?;
    let predictions = scorer.predict(&comments, args.threshold)?;

    let rendered = match args.format {
        PredictFormat::Json => serde_json::to_string_pretty(&predictions)?,
        PredictFormat::Csv => predictions_to_csv(&predictions),
        PredictFormat::Simple => predictions_to_simple(&predictions),
    };

    write_output(&rendered, args.output.as_deref())
}

/// Non-blank lines of a file, trimmed
fn read_comments(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
