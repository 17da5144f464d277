use crate::cli::CommentArgs;
use anyhow::{anyhow, Result};

pub fn run(args: CommentArgs) -> Result<()> {
    let settings = super::load_settings(&args.model)?;
    let scorer = super::load_scorer(&settings)?;

    let prediction = scorer
        .predict(&[args.text.as_str()], args.threshold)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No prediction returned"))?;

    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}
