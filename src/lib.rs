//! annoview - use-site aware annotation views for Kotlin and Java sources
//!
//! Kotlin lets one annotation written on a property apply to the backing
//! field, the getter, the setter or the setter parameter (`@field:Foo`,
//! `@get:Foo`, ...). This library parses Kotlin and Java sources, keeps the
//! annotations exactly as written, and answers lookups against the subset
//! that applies to one element.
//!
//! # Architecture
//!
//! 1. **File Discovery** - Find all .kt and .java files
//! 2. **Parsing** - Parse source files using tree-sitter and read annotation text
//! 3. **Indexing** - Store declarations and their annotations
//! 4. **Views** - Filter annotations by use-site target and combine views
//! 5. **Queries** - Look up annotation types, repeatable containers and packages
//! 6. **Reporting** - Output results in terminal or JSON form

pub mod config;
pub mod discovery;
pub mod index;
pub mod model;
pub mod parser;
pub mod query;
pub mod report;
pub mod view;

pub use config::Config;
pub use discovery::FileFinder;
pub use index::{AnnotationIndex, IndexBuilder, ParallelIndexBuilder};
pub use model::{
    AnnotationError, AnnotationInstance, AnnotationValue, Declaration, DeclarationKind,
    UseSiteTarget,
};
pub use query::{ContainerMode, Query, QueryMatch};
pub use report::{ReportFormat, Reporter};
pub use view::{AnnotationProvider, AnnotationView, ElementSite, UseSiteFilter};
