use super::annotation_tree::RawAnnotation;
use super::scope::ImportScope;
use crate::model::{AnnotationInstance, Declaration, Location};
use miette::Result;
use std::path::Path;

/// Result of parsing a source file
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Declarations found in the file, with their annotations
    pub declarations: Vec<Declaration>,

    /// Package/namespace of the file
    pub package: Option<String>,

    /// Import statements (`a.b.C`, `a.b.*`, `a.b.C as D`)
    pub imports: Vec<String>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotation_count(&self) -> usize {
        self.declarations.iter().map(|d| d.annotations.len()).sum()
    }
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Parse a source file and extract declarations with their annotations
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult>;
}

/// Helper to convert a tree-sitter node position to a Location
pub fn node_location(file: &Path, node: tree_sitter::Node) -> Location {
    let start = node.start_position();
    Location::new(
        file.to_path_buf(),
        start.row + 1,    // tree-sitter uses 0-indexed lines
        start.column + 1, // and 0-indexed columns
    )
}

/// Extract text from a node
pub fn node_text<'a>(node: tree_sitter::Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// First child of a specific kind
pub fn child_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Find all children of a specific kind
pub fn children_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Vec<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// Resolve annotations read from the tree against the file's imports
pub fn resolve_annotations(
    raw: impl IntoIterator<Item = RawAnnotation>,
    scope: &ImportScope<'_>,
) -> Vec<AnnotationInstance> {
    raw.into_iter().map(|r| scope.resolve_annotation(&r)).collect()
}

pub fn build_fqn(package: &Option<String>, name: &str) -> String {
    match package {
        Some(pkg) => format!("{}.{}", pkg, name),
        None => name.to_string(),
    }
}
