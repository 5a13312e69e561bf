//! sectorsheet command line
//!
//! 単一ファイルまたはディレクトリ単位でワークブックを抽出し、JSONを書き出す。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use sectorsheet::{
    BatchRunner, ExtractionDocument, Extractor, ExtractorBuilder, TemplateLayout,
    DEFAULT_SKIP_NAMES,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MAX_LISTED_PRODUCTS: usize = 10;

#[derive(Debug, Parser)]
#[command(
    name = "sectorsheet",
    version,
    about = "Extract fixed-layout business workbooks into JSON"
)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "batch"])))]
struct Cli {
    /// Workbook to extract
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Directory of workbooks to extract one by one
    #[arg(short, long, value_name = "DIR")]
    batch: Option<PathBuf>,

    /// Output JSON path (single-file mode; defaults to <input>.json)
    #[arg(short, long, value_name = "FILE", requires = "file")]
    output: Option<PathBuf>,

    /// TOML file overriding the template layout
    #[arg(long, value_name = "FILE", env = "SECTORSHEET_LAYOUT")]
    layout: Option<PathBuf>,

    /// Append every successful document as one JSON line (batch mode)
    #[arg(long, value_name = "FILE", requires = "batch")]
    append: Option<PathBuf>,

    /// File names to skip in batch mode (replaces the default list)
    #[arg(long, value_name = "NAME")]
    skip: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let layout = match &cli.layout {
        Some(path) => TemplateLayout::from_path(path)
            .with_context(|| format!("failed to load layout {}", path.display()))?,
        None => TemplateLayout::default(),
    };
    let extractor = ExtractorBuilder::new().with_layout(layout).build()?;

    if let Some(dir) = &cli.batch {
        return run_batch(&extractor, dir, &cli);
    }
    match &cli.file {
        Some(file) => run_single(&extractor, file, cli.output.as_deref()),
        None => Ok(ExitCode::FAILURE),
    }
}

fn run_single(
    extractor: &Extractor,
    file: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<ExitCode> {
    if !file.exists() {
        error!("File not found: {}", file.display());
        return Ok(ExitCode::FAILURE);
    }

    info!("Processing: {}", file.display());
    let (document, output) = extractor
        .extract_to_json_file(file, output)
        .with_context(|| format!("failed to extract {}", file.display()))?;

    log_summary(&document);
    info!("Saved to: {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn run_batch(extractor: &Extractor, dir: &std::path::Path, cli: &Cli) -> Result<ExitCode> {
    let skip = if cli.skip.is_empty() {
        DEFAULT_SKIP_NAMES.iter().map(|s| s.to_string()).collect()
    } else {
        cli.skip.clone()
    };

    let mut runner = BatchRunner::new(extractor).with_skip_names(skip);
    if let Some(append) = &cli.append {
        runner = runner.with_append_file(append);
    }

    let report = runner
        .run(dir)
        .with_context(|| format!("failed to process directory {}", dir.display()))?;

    info!("Successful: {}", report.processed.len());
    info!("Failed: {}", report.failed.len());
    for (path, reason) in &report.failed {
        info!("  {}: {}", path.display(), reason);
    }
    Ok(ExitCode::SUCCESS)
}

fn log_summary(document: &ExtractionDocument) {
    info!("Company: {}", document.company_name());
    info!("Fields extracted: {}", document.setup.total_fields);
    info!("Products: {}", document.cost_of_sales.total_products);

    let categories = document.cost_of_sales_categories();
    info!("Cost of sales categories: {}", categories.len());
    for category in categories {
        info!("  - {}", category);
    }

    for product in document.cost_of_sales.products.iter().take(MAX_LISTED_PRODUCTS) {
        info!("  {} ({})", product.product_name, product.cost_of_sales_category);
    }
    if document.cost_of_sales.total_products > MAX_LISTED_PRODUCTS {
        info!(
            "  ... and {} more",
            document.cost_of_sales.total_products - MAX_LISTED_PRODUCTS
        );
    }

    info!("Info metrics: {}", document.info.len());
    info!("Financials line items: {}", document.financials.line_items());
}
