//! Guardian Core
//!
//! Types shared across the Guardian crates:
//! - The fixed toxicity label set and per-text score mappings
//! - Batch aggregates and YouTube comment records
//! - The closed error enumeration used by every component

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{coerce_text, Aggregate, Comment, LabelScores, VideoInfo, LABELS, PRIMARY_LABEL};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Aggregate, Comment, LabelScores, VideoInfo, LABELS, PRIMARY_LABEL};
}
