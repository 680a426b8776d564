use anyhow::{bail, Context, Result};
use clap::Parser;
use salesgraph::csv_reader;
use salesgraph::data::Dataset;
use salesgraph::render::{self, DirectoryRenderer, HtmlRenderer, JsonLinesRenderer, Renderer};
use salesgraph::runtime;
use salesgraph::{InputFormat, OutputFormat, ReportOptions};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "salesgraph")]
#[command(about = "Build Vega-Lite chart specs from a long-format video game sales table", long_about = None)]
struct Args {
    /// Sales table to read (stdin when omitted)
    input: Option<PathBuf>,

    /// Format of the sales table
    #[arg(long, value_enum, default_value_t = InputFormat::Csv)]
    input_format: InputFormat,

    /// JSON file with report options (top-N sizes, chart height, ...)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Output format; overrides the options file
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (json/html) or directory (dir); stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only emit these charts, e.g. `--charts 1a,4b`
    #[arg(long, value_delimiter = ',')]
    charts: Vec<String>,

    /// Log progress at info level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "salesgraph=info"
    } else {
        "salesgraph=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut options = match &args.options {
        Some(path) => ReportOptions::from_json_file(path)?,
        None => ReportOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }

    let dataset = load(&args).context("Failed to load sales table")?;
    tracing::info!(records = dataset.len(), "loaded dataset");

    let mut report = runtime::build_report(&dataset, &options).context("Failed to build charts")?;
    if !args.charts.is_empty() {
        report = report.select(&args.charts)?;
    }

    let mut renderer: Box<dyn Renderer> = match (options.format, &args.output) {
        (OutputFormat::Json, None) => Box::new(JsonLinesRenderer::new(io::stdout().lock())),
        (OutputFormat::Json, Some(path)) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            Box::new(JsonLinesRenderer::new(io::BufWriter::new(file)))
        }
        (OutputFormat::Html, None) => Box::new(HtmlRenderer::new(io::stdout().lock(), "Video Game Sales")),
        (OutputFormat::Html, Some(path)) => Box::new(HtmlRenderer::create(path, "Video Game Sales")?),
        (OutputFormat::Dir, Some(path)) => Box::new(DirectoryRenderer::new(path)?),
        (OutputFormat::Dir, None) => bail!("--format dir requires --output <DIR>"),
    };

    let failures = render::render_all(&report, renderer.as_mut());
    renderer.finish()?;

    if !failures.is_empty() {
        bail!("{} of {} charts failed to render", failures.len(), report.charts.len());
    }
    Ok(())
}

fn load(args: &Args) -> Result<Dataset> {
    match args.input_format {
        InputFormat::Csv => {
            let dataset = match &args.input {
                Some(path) => csv_reader::read_dataset_from_path(path)?,
                None => csv_reader::read_dataset_from_stdin()?,
            };
            Ok(dataset)
        }
        InputFormat::Json => {
            let text = match &args.input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
                    buf
                }
            };
            let value: serde_json::Value = serde_json::from_str(&text).context("Input is not valid JSON")?;
            Dataset::from_json(&value)
        }
    }
}
