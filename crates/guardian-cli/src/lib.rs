//! Guardian command-line interface
//!
//! Subcommands for running the HTTP API, analyzing a YouTube video's
//! comments, and thresholded prediction on literal text or a file.

pub mod cli;
pub mod commands;
pub mod output;
