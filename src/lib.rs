//! sectorsheet - Fixed-layout business workbook extractor
//!
//! This crate reads business-assessment workbooks (XLSX/XLSM) built from a
//! known template and turns them into a single JSON document that downstream
//! sector-classification tooling consumes.
//!
//! Four logical sheets are located by tolerant name matching:
//!
//! - `i_Setup`: numbered fields, Industry Details and the sub-table sections
//! - `i_COS`: product / cost-of-sales category pairs
//! - `info`: label / value metrics with normalized keys
//! - `financials`: category → subcategory → line-item hierarchy
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sectorsheet::ExtractorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new().build()?;
//!
//!     // Writes business.json next to the workbook
//!     let (document, output) = extractor.extract_to_json_file("business.xlsm", None)?;
//!     println!("{}: {}", document.company_name(), output.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! For in-memory extraction, use `Cursor`:
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use sectorsheet::ExtractorBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = ExtractorBuilder::new().build()?;
//! let workbook_bytes: Vec<u8> = vec![]; // Your workbook bytes
//! let document = extractor.extract(Cursor::new(workbook_bytes), "business.xlsx")?;
//! println!("{}", document.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Layout
//!
//! Template coordinates can be overridden from a TOML file. Keys that are
//! not given keep their defaults.
//!
//! ```rust,no_run
//! use sectorsheet::{ExtractorBuilder, TemplateLayout};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = TemplateLayout::from_toml_str(
//!         r#"
//!         [cost_of_sales]
//!         name = "B"
//!         category = "C"
//!         "#,
//!     )?;
//!     let extractor = ExtractorBuilder::new().with_layout(layout).build()?;
//!     let document = extractor.extract_path("business.xlsx")?;
//!     println!("{} products", document.cost_of_sales.total_products);
//!
//!     Ok(())
//! }
//! ```

mod batch;
mod builder;
mod document;
mod error;
mod extract;
mod layout;
mod normalize;
mod parser;
mod resolver;
mod security;
mod taxonomy;
mod types;

// 公開API
pub use batch::{list_workbooks, BatchReport, BatchRunner, DEFAULT_SKIP_NAMES};
pub use builder::{default_output_path, Extractor, ExtractorBuilder};
pub use document::{
    CostOfSalesSection, ExtractionDocument, FieldRecord, FinancialsHierarchy, IndustryItem,
    InfoMetrics, ProductEntry, SetupSection, SubTableEntry, SubTableItem,
};
pub use error::ExtractError;
pub use layout::{
    FieldColumns, FinancialsLayout, IndustryLayout, MetricsLayout, ProductLayout, SectionSpec,
    SetupLayout, SheetRole, SheetRoles, SubTableColumns, TemplateLayout,
};
pub use normalize::normalize_key;
pub use resolver::resolve_sheet;
pub use security::SecurityConfig;
pub use taxonomy::{Category, CategoryRules, CATEGORY_RULES};
pub use types::Column;
