use super::AnnotationIndex;
use crate::config::ResolutionConfig;
use crate::discovery::{FileType, SourceFile};
use crate::model::Declaration;
use crate::parser::{JavaParser, KotlinParser, Parser as SourceParser};
use miette::Result;
use rayon::prelude::*;
use tracing::{info, warn};

/// Index builder that parses files on the rayon thread pool
pub struct ParallelIndexBuilder {
    resolution: ResolutionConfig,
}

impl ParallelIndexBuilder {
    pub fn new(resolution: ResolutionConfig) -> Self {
        Self { resolution }
    }

    /// Build the index from source files using parallel processing.
    ///
    /// Declarations are added in file order, so the result matches
    /// [`super::IndexBuilder`] for the same input.
    pub fn build_from_files(&self, files: &[SourceFile]) -> AnnotationIndex {
        info!("Parsing {} files in parallel...", files.len());

        let results: Vec<Result<Vec<Declaration>>> =
            files.par_iter().map(|file| self.parse_file(file)).collect();

        let mut index = AnnotationIndex::new();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(declarations) => {
                    for decl in declarations {
                        index.add_declaration(decl);
                    }
                }
                Err(e) => {
                    warn!("Skipping {}: {:?}", file.path.display(), e);
                }
            }
        }

        info!(
            "Indexed {} declarations, {} annotations",
            index.len(),
            index.annotation_count()
        );
        index
    }

    fn parse_file(&self, file: &SourceFile) -> Result<Vec<Declaration>> {
        let contents = file.read_contents()?;

        let result = match file.file_type {
            FileType::Kotlin => {
                KotlinParser::with_resolution(self.resolution.clone()).parse(&file.path, &contents)?
            }
            FileType::Java => {
                JavaParser::with_resolution(self.resolution.clone()).parse(&file.path, &contents)?
            }
        };

        Ok(result.declarations)
    }
}

impl Default for ParallelIndexBuilder {
    fn default() -> Self {
        Self::new(ResolutionConfig::default())
    }
}
