//! Report building and output formatting

use guardian_classifiers::prediction::serialize_predictions;
use guardian_classifiers::{CommentPrediction, LabelPrediction};
use guardian_core::{Comment, VideoInfo};
use serde::Serialize;
use std::path::Path;

/// Characters of comment text shown per line of the text report
const TEXT_PREVIEW_CHARS: usize = 100;

/// Aggregate figures for a video's analyzed comments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_comments: usize,
    pub toxic_comments: usize,
    /// Share of toxic comments in percent, two decimals
    pub toxicity_percentage: f64,
    /// Mean of per-comment maximum probability, three decimals
    pub average_toxicity_score: f64,
}

/// A fetched comment with its thresholded prediction
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub toxicity_score: f32,
    pub is_toxic: bool,
    #[serde(serialize_with = "serialize_predictions")]
    pub toxicity_predictions: Vec<(&'static str, LabelPrediction)>,
}

/// Full analysis of one video's comments
#[derive(Debug, Clone, Serialize)]
pub struct YoutubeReport {
    pub video_info: VideoInfo,
    pub analysis_summary: AnalysisSummary,
    pub comments: Vec<AnalyzedComment>,
}

impl YoutubeReport {
    /// Pair comments with their predictions and summarize
    pub fn build(
        video_info: VideoInfo,
        comments: Vec<Comment>,
        predictions: Vec<CommentPrediction>,
    ) -> Self {
        let comments: Vec<AnalyzedComment> = comments
            .into_iter()
            .zip(predictions)
            .map(|(comment, prediction)| AnalyzedComment {
                toxicity_score: prediction.max_probability(),
                is_toxic: prediction.any_toxic,
                toxicity_predictions: prediction.predictions,
                comment,
            })
            .collect();

        let total_comments = comments.len();
        let toxic_comments = comments.iter().filter(|c| c.is_toxic).count();
        let (toxicity_percentage, average_toxicity_score) = if total_comments == 0 {
            (0.0, 0.0)
        } else {
            let total_score: f64 = comments.iter().map(|c| f64::from(c.toxicity_score)).sum();
            (
                round_to(toxic_comments as f64 / total_comments as f64 * 100.0, 2),
                round_to(total_score / total_comments as f64, 3),
            )
        };

        Self {
            video_info,
            analysis_summary: AnalysisSummary {
                total_comments,
                toxic_comments,
                toxicity_percentage,
                average_toxicity_score,
            },
            comments,
        }
    }

    /// Plain-text rendering: a summary header then one line per comment
    pub fn to_text(&self) -> String {
        let summary = &self.analysis_summary;
        let mut lines = vec![
            format!("Video: {}", self.video_info.title),
            format!("Channel: {}", self.video_info.channel_title),
            format!("Total Comments: {}", summary.total_comments),
            format!(
                "Toxic Comments: {} ({:?}%)",
                summary.toxic_comments, summary.toxicity_percentage
            ),
            format!("Average Toxicity Score: {:?}", summary.average_toxicity_score),
            String::new(),
            "Comments:".to_string(),
        ];

        for analyzed in &self.comments {
            let status = if analyzed.is_toxic { "TOXIC" } else { "CLEAN" };
            let preview: String = analyzed.comment.text.chars().take(TEXT_PREVIEW_CHARS).collect();
            lines.push(format!(
                "{} | {:.3} | {}: {}...",
                status, analyzed.toxicity_score, analyzed.comment.author, preview
            ));
        }

        lines.join("\n")
    }
}

/// Predictions as CSV with one `_prob`/`_toxic` column pair per label
pub fn predictions_to_csv(predictions: &[CommentPrediction]) -> String {
    let labels: Vec<&str> = predictions
        .first()
        .map(|p| p.predictions.iter().map(|(label, _)| *label).collect())
        .unwrap_or_default();

    let mut header = vec!["comment".to_string(), "any_toxic".to_string()];
    for label in &labels {
        header.push(format!("{}_prob", label));
        header.push(format!("{}_toxic", label));
    }

    let mut out = header.join(",");
    out.push('\n');

    for prediction in predictions {
        let mut row = vec![csv_field(&prediction.comment), csv_bool(prediction.any_toxic)];
        for (_, label) in &prediction.predictions {
            row.push(label.probability.to_string());
            row.push(csv_bool(label.is_toxic));
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// One `TOXIC|CLEAN | labels | comment` line per prediction
pub fn predictions_to_simple(predictions: &[CommentPrediction]) -> String {
    predictions
        .iter()
        .map(|prediction| {
            let status = if prediction.any_toxic { "TOXIC" } else { "CLEAN" };
            let labels = prediction.toxic_labels();
            let categories = if labels.is_empty() {
                "none".to_string()
            } else {
                labels.join(", ")
            };
            format!("{} | {} | {}", status, categories, prediction.comment)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write to `path` when given, otherwise print to stdout
pub fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            tracing::info!("Results saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn csv_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
