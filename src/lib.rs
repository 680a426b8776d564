// Library exports for salesgraph

pub mod aggregate;
pub mod compiler;
pub mod csv_reader;
pub mod data;
pub mod filter;
pub mod ir;
pub mod preprocessor;
pub mod render;
pub mod runtime;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `{"container", "spec"}` object per line
    #[serde(rename = "json")]
    #[default]
    Json,
    /// A standalone page embedding every chart
    #[serde(rename = "html")]
    Html,
    /// One `<container>.vl.json` file per chart
    #[serde(rename = "dir")]
    Dir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum InputFormat {
    #[serde(rename = "csv")]
    #[default]
    Csv,
    #[serde(rename = "json")]
    Json,
}

/// Knobs for the chart set. Every field is optional in an options file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportOptions {
    /// Pixel width of unfaceted charts. Unset means fill the container.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Width of each facet column in faceted charts
    #[serde(default = "default_facet_width")]
    pub facet_width: u32,
    #[serde(default = "default_top_platforms")]
    pub top_platforms: usize,
    #[serde(default = "default_top_genres")]
    pub top_genres: usize,
    /// Platforms drawn as separate lines in the sales-over-time chart
    #[serde(default = "default_top_line_platforms")]
    pub top_line_platforms: usize,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_height() -> u32 { 350 }
fn default_facet_width() -> u32 { 360 }
fn default_top_platforms() -> usize { 10 }
fn default_top_genres() -> usize { 10 }
fn default_top_line_platforms() -> usize { 5 }
fn default_schema() -> String { ir::VEGA_LITE_SCHEMA.to_string() }

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: default_height(),
            facet_width: default_facet_width(),
            top_platforms: default_top_platforms(),
            top_genres: default_top_genres(),
            top_line_platforms: default_top_line_platforms(),
            schema: default_schema(),
            format: OutputFormat::Json,
        }
    }
}

impl ReportOptions {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Invalid report options")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}
