use crate::query::QueryMatch;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, matches: &[QueryMatch]) -> Result<()> {
        let json = self.render(matches)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, matches: &[QueryMatch]) -> Result<String> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            total_matches: matches.len(),
            total_annotations: matches.iter().map(|m| m.annotations.len()).sum(),
            matches,
        };
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_matches: usize,
    total_annotations: usize,
    matches: &'a [QueryMatch],
}
