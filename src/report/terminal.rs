use crate::model::AnnotationInstance;
use crate::query::QueryMatch;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Print annotation arguments
    show_arguments: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_arguments: true,
        }
    }

    pub fn with_arguments(mut self, show: bool) -> Self {
        self.show_arguments = show;
        self
    }

    pub fn report(&self, matches: &[QueryMatch]) -> Result<()> {
        print!("{}", self.render(matches));
        Ok(())
    }

    /// Render the report, grouped by file
    pub fn render(&self, matches: &[QueryMatch]) -> String {
        let mut out = String::new();

        if matches.is_empty() {
            out.push_str(&format!("{}\n", "No matching declarations.".yellow()));
            return out;
        }

        let mut by_file: BTreeMap<&PathBuf, Vec<&QueryMatch>> = BTreeMap::new();
        for item in matches {
            by_file.entry(&item.location.file).or_default().push(item);
        }

        for (file, items) in by_file {
            out.push_str(&format!("{}\n", file.display().to_string().cyan().bold()));
            for item in items {
                self.render_item(&mut out, item);
            }
            out.push('\n');
        }

        let annotation_count: usize = matches.iter().map(|m| m.annotations.len()).sum();
        out.push_str(&format!(
            "{}\n",
            format!(
                "{} declarations, {} annotations",
                matches.len(),
                annotation_count
            )
            .bold()
        ));

        out
    }

    fn render_item(&self, out: &mut String, item: &QueryMatch) {
        let location = format!("{}:{}", item.location.line, item.location.column);
        out.push_str(&format!(
            "  {} {} [{}]\n",
            location.dimmed(),
            item.display().bold(),
            item.filter.dimmed()
        ));

        for annotation in &item.annotations {
            out.push_str(&format!("      {}\n", self.annotation_text(annotation)));
        }

        if let Some(found) = &item.found {
            let via = match &found.container {
                Some(container) => format!(" (via {})", container),
                None => String::new(),
            };
            out.push_str(&format!(
                "    {} {}{}: {}\n",
                "find".blue(),
                found.type_name,
                via,
                found.instances.len()
            ));
            for instance in &found.instances {
                out.push_str(&format!("      {}\n", self.annotation_text(instance)));
            }
            if let Some(error) = &found.error {
                out.push_str(&format!("      {}\n", error.red()));
            }
        }

        for has in &item.has {
            out.push_str(&format!(
                "    {} {}: {}\n",
                "has".blue(),
                has.type_name,
                yes_no(has.present)
            ));
        }

        if let Some(package) = &item.has_package {
            out.push_str(&format!(
                "    {} {}: {}\n",
                "has package".blue(),
                package.package,
                yes_no(package.present)
            ));
        }
    }

    fn annotation_text(&self, annotation: &AnnotationInstance) -> String {
        if self.show_arguments {
            return annotation.to_string();
        }
        match annotation.use_site_target() {
            Some(target) => format!("@{}:{}", target.label(), annotation.qualified_name()),
            None => format!("@{}", annotation.qualified_name()),
        }
    }
}

fn yes_no(present: bool) -> colored::ColoredString {
    if present {
        "yes".green()
    } else {
        "no".red()
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
