//! Yield Report
//!
//! The structured per-request output and its document exports (Markdown,
//! standalone HTML, JSON) for offline download.

pub mod formatters;
pub mod types;

pub use formatters::{HtmlFormatter, JsonFormatter, MarkdownFormatter};
pub use types::{FeatureRow, YieldReport, YIELD_UNIT};

use std::path::Path;

/// Export document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Html,
    Json,
}

impl ReportFormat {
    /// Pick a format from a file extension (`md`, `html`, `json`, ...)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(ReportFormat::Markdown),
            "html" | "htm" => Some(ReportFormat::Html),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }

    /// Render `report` as a standalone document
    pub fn render(&self, report: &YieldReport) -> Result<String, serde_json::Error> {
        match self {
            ReportFormat::Markdown => Ok(MarkdownFormatter::format(report)),
            ReportFormat::Html => Ok(HtmlFormatter::format(report)),
            ReportFormat::Json => JsonFormatter::format(report),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ReportFormat::from_path(Path::new("out/report.MD")), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::from_path(Path::new("report.htm")), Some(ReportFormat::Html));
        assert_eq!(ReportFormat::from_path(Path::new("report.json")), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_path(Path::new("report.pdf")), None);
        assert_eq!(ReportFormat::from_path(Path::new("report")), None);
    }

    #[test]
    fn test_render_dispatch() {
        let report = fixtures::sample_report();
        let md = ReportFormat::Markdown.render(&report).unwrap();
        let html = ReportFormat::Html.render(&report).unwrap();
        let json = ReportFormat::Json.render(&report).unwrap();

        assert!(md.starts_with("# "));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(json.starts_with('{'));
    }
}
