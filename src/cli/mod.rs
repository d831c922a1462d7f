//! Support code for the `wit-layout` command-line tool.
//!
//! The binary only parses arguments; loading, layout and rendering live here
//! so they can be tested without spawning a process.

mod config;
mod logging;

pub use config::{Config, ConfigError, LogFormat, LoggingConfig, OutputConfig, OutputFormat};
pub use logging::{LoggingError, init as init_logging};

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use wit_parser::Resolve;

use crate::descriptor::Target;
use crate::layout::{Layout, LayoutCache, LayoutError, VariantLayout};
use crate::report::{TypeReport, describe, describe_all};

/// Errors surfaced by the command-line tool.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Layout(#[from] crate::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("Invalid case '{0}': expected <size>:<align>")]
    InvalidCase(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LayoutError> for CliError {
    fn from(err: LayoutError) -> Self {
        CliError::Layout(err.into())
    }
}

/// A case given on the command line as `<size>:<align>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseArg(pub Layout);

impl FromStr for CaseArg {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidCase(s.to_string());
        let (size, align) = s.split_once(':').ok_or_else(invalid)?;
        let size = size.trim().parse().map_err(|_| invalid())?;
        let align = align.trim().parse().map_err(|_| invalid())?;
        Ok(CaseArg(Layout::new(size, align)))
    }
}

/// Parse a WIT file or directory.
pub fn load_resolve(path: &Path) -> Result<Resolve, CliError> {
    let mut resolve = Resolve::new();
    resolve
        .push_path(path)
        .map_err(|e| CliError::Layout(crate::Error::WitParse(e)))?;
    Ok(resolve)
}

/// Reports for one named type, or for every named type when `type_name` is
/// `None`.
pub fn reports(
    resolve: &Resolve,
    type_name: Option<&str>,
    target: Target,
) -> Result<Vec<TypeReport>, CliError> {
    Ok(match type_name {
        Some(name) => vec![describe(resolve, name, target)?],
        None => describe_all(resolve, target)?,
    })
}

/// Layout of an ad-hoc variant given its discriminant width and cases.
pub fn compute(discriminant: usize, cases: &[CaseArg]) -> Result<VariantLayout, CliError> {
    let cases: Vec<Layout> = cases.iter().map(|c| c.0).collect();
    Ok(LayoutCache::new().variant(discriminant, &cases)?)
}

pub fn render_reports(reports: &[TypeReport], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => Ok(reports.iter().map(render_report).collect()),
    }
}

fn render_report(report: &TypeReport) -> String {
    let mut out = format!(
        "{} ({}): size {}, align {}\n  {}\n",
        report.name, report.target, report.size, report.align, report.shape
    );
    if let Some(variant) = &report.variant {
        out.push_str(&format!(
            "  discriminant {} byte(s), payload at offset {}\n",
            variant.discriminant_width, variant.data_offset
        ));
        for (tag, case) in variant.cases.iter().enumerate() {
            let name = case.name.as_deref().unwrap_or("_");
            out.push_str(&format!(
                "  [{tag}] {name}: size {}, align {}, slack {}\n",
                case.size, case.align, case.slack
            ));
        }
    }
    out
}

pub fn render_layout(layout: &VariantLayout, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(layout)?),
        OutputFormat::Text => Ok(format!(
            "size {}, alignment {}, data offset {}\n",
            layout.size, layout.alignment, layout.data_offset
        )),
    }
}
