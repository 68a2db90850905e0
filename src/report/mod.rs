mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::query::QueryMatch;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "terminal" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Reporter for query results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_arguments: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_arguments: true,
        }
    }

    pub fn with_arguments(mut self, show: bool) -> Self {
        self.show_arguments = show;
        self
    }

    pub fn report(&self, matches: &[QueryMatch]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new()
                .with_arguments(self.show_arguments)
                .report(matches),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(matches),
        }
    }
}
