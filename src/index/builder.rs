use super::AnnotationIndex;
use crate::config::ResolutionConfig;
use crate::discovery::{FileType, SourceFile};
use crate::parser::{JavaParser, KotlinParser, ParseResult, Parser as SourceParser};
use miette::{Result, WrapErr};
use std::path::Path;
use tracing::{debug, warn};

/// Builder for the annotation index, one file at a time
pub struct IndexBuilder {
    index: AnnotationIndex,
    kotlin_parser: KotlinParser,
    java_parser: JavaParser,
    files_processed: usize,
}

impl IndexBuilder {
    pub fn new(resolution: ResolutionConfig) -> Self {
        Self {
            index: AnnotationIndex::new(),
            kotlin_parser: KotlinParser::with_resolution(resolution.clone()),
            java_parser: JavaParser::with_resolution(resolution),
            files_processed: 0,
        }
    }

    /// Parse a source file and add its declarations to the index
    pub fn process_file(&mut self, file: &SourceFile) -> Result<()> {
        let contents = file.read_contents()?;
        self.process_source(&file.path, file.file_type, &contents)
    }

    /// Parse in-memory source and add its declarations to the index
    pub fn process_source(
        &mut self,
        path: &Path,
        file_type: FileType,
        contents: &str,
    ) -> Result<()> {
        debug!("Parsing {:?} file: {}", file_type, path.display());

        let parse_result: ParseResult = match file_type {
            FileType::Kotlin => self.kotlin_parser.parse(path, contents),
            FileType::Java => self.java_parser.parse(path, contents),
        }
        .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

        for decl in parse_result.declarations {
            self.index.add_declaration(decl);
        }
        self.files_processed += 1;

        Ok(())
    }

    /// Process every file, logging and skipping the ones that fail
    pub fn process_files(&mut self, files: &[SourceFile]) {
        for file in files {
            if let Err(e) = self.process_file(file) {
                warn!("Skipping {}: {:?}", file.path.display(), e);
            }
        }
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    pub fn build(self) -> AnnotationIndex {
        debug!(
            "Indexed {} declarations from {} files",
            self.index.len(),
            self.files_processed
        );
        self.index
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new(ResolutionConfig::default())
    }
}
