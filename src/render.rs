// Renderer collaborators: hand each chart spec to its named container

use crate::ir::ChartSpec;
use crate::runtime::Report;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait Renderer {
    /// Draw (or emit) one chart into `container`.
    fn render(&mut self, container: &str, spec: &ChartSpec<'_>) -> Result<()>;

    /// Called once after the last chart.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct RenderFailure {
    pub container: String,
    pub error: anyhow::Error,
}

/// Render every chart in report order. A failing chart is logged and skipped.
pub fn render_all<R: Renderer + ?Sized>(report: &Report<'_>, renderer: &mut R) -> Vec<RenderFailure> {
    let mut failures = Vec::new();
    for chart in &report.charts {
        match renderer.render(&chart.container, &chart.spec) {
            Ok(()) => tracing::debug!(container = %chart.container, "rendered chart"),
            Err(error) => {
                tracing::warn!(container = %chart.container, "failed to render chart: {:#}", error);
                failures.push(RenderFailure {
                    container: chart.container.clone(),
                    error,
                });
            }
        }
    }
    failures
}

fn container_id(container: &str) -> &str {
    container.trim_start_matches('#')
}

#[derive(Serialize)]
struct Emitted<'s, 'a> {
    container: &'s str,
    spec: &'s ChartSpec<'a>,
}

/// Writes one JSON object per chart, one per line.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, container: &str, spec: &ChartSpec<'_>) -> Result<()> {
        // A line reaches the stream whole or not at all.
        let mut line = serde_json::to_vec(&Emitted { container, spec })
            .context("Failed to serialize chart spec")?;
        line.push(b'\n');
        self.out.write_all(&line).context("Failed to write output")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush output")
    }
}

/// Writes `<dir>/<container>.vl.json` per chart.
pub struct DirectoryRenderer {
    dir: PathBuf,
}

impl DirectoryRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, container: &str) -> PathBuf {
        self.dir.join(format!("{}.vl.json", container_id(container)))
    }
}

impl Renderer for DirectoryRenderer {
    fn render(&mut self, container: &str, spec: &ChartSpec<'_>) -> Result<()> {
        let path = self.path_for(container);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, spec)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

/// Collects charts and writes a single page that embeds them with vega-embed.
pub struct HtmlRenderer<W: Write> {
    out: W,
    title: String,
    charts: Vec<(String, String)>,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out,
            title: title.into(),
            charts: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl HtmlRenderer<BufWriter<File>> {
    pub fn create(path: &Path, title: impl Into<String>) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create '{}'", path.display()))?;
        Ok(Self::new(BufWriter::new(file), title))
    }
}

// JSON placed inside <script> must not close the tag early.
fn script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn render(&mut self, container: &str, spec: &ChartSpec<'_>) -> Result<()> {
        let json = script_safe_json(spec).context("Failed to serialize chart spec")?;
        self.charts.push((container.to_string(), json));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(out, "<head>")?;
        writeln!(out, "  <meta charset=\"utf-8\">")?;
        writeln!(out, "  <title>{}</title>", escape_html(&self.title))?;
        writeln!(out, "  <script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
        writeln!(out, "  <script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>")?;
        writeln!(out, "  <script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>")?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;
        for (container, _) in &self.charts {
            writeln!(out, "  <div id=\"{}\"></div>", escape_html(container_id(container)))?;
        }
        writeln!(out, "  <script>")?;
        for (container, json) in &self.charts {
            writeln!(
                out,
                "    vegaEmbed({}, {}, {{ actions: false }});",
                script_safe_json(container.as_str())?,
                json
            )?;
        }
        writeln!(out, "  </script>")?;
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        out.flush().context("Failed to flush HTML output")
    }
}
