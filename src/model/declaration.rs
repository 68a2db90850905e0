use super::annotation::AnnotationInstance;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unique identifier for a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclarationId {
    /// File path
    pub file: PathBuf,
    /// Starting byte offset in file
    pub start: usize,
    /// Ending byte offset in file
    pub end: usize,
}

impl DeclarationId {
    pub fn new(file: PathBuf, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }
}

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.start, self.end)
    }
}

/// Kind of declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    // Types
    Class,
    Interface,
    Object,
    Enum,
    EnumEntry,
    AnnotationClass,

    // Callables
    Function,
    Method,
    Constructor,

    // Members
    Property,
    Field,
    Parameter,

    // Property accessors (Kotlin)
    Getter,
    Setter,
}

impl DeclarationKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Object
                | DeclarationKind::Enum
                | DeclarationKind::AnnotationClass
        )
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, DeclarationKind::Getter | DeclarationKind::Setter)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Object => "object",
            DeclarationKind::Enum => "enum",
            DeclarationKind::EnumEntry => "enum entry",
            DeclarationKind::AnnotationClass => "annotation class",
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
            DeclarationKind::Constructor => "constructor",
            DeclarationKind::Property => "property",
            DeclarationKind::Field => "field",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::Getter => "getter",
            DeclarationKind::Setter => "setter",
        }
    }
}

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Kotlin,
    Java,
}

/// A declaration in the source code, together with its raw annotations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    /// Unique identifier
    pub id: DeclarationId,

    /// Simple name (e.g., "UserEntity")
    pub name: String,

    /// Fully qualified name for types and top-level declarations
    pub fully_qualified_name: Option<String>,

    /// Kind of declaration
    pub kind: DeclarationKind,

    /// Location in source code
    pub location: Location,

    /// Enclosing declaration (class for a method, function for a parameter)
    pub parent: Option<DeclarationId>,

    /// Annotations as written on this declaration, in source order
    pub annotations: Vec<AnnotationInstance>,

    /// Keyword modifiers (`val`, `var`, `private`, ...)
    pub modifiers: Vec<String>,

    /// Language (Kotlin or Java)
    pub language: Language,
}

impl Declaration {
    pub fn new(
        id: DeclarationId,
        name: String,
        kind: DeclarationKind,
        location: Location,
        language: Language,
    ) -> Self {
        Self {
            id,
            name,
            fully_qualified_name: None,
            kind,
            location,
            parent: None,
            annotations: Vec::new(),
            modifiers: Vec::new(),
            language,
        }
    }

    /// A Kotlin constructor parameter that also declares a property (`val`/`var`)
    pub fn is_property_parameter(&self) -> bool {
        self.kind == DeclarationKind::Parameter
            && self.modifiers.iter().any(|m| m == "val" || m == "var")
    }

    /// Whether this property (or property parameter) has a setter
    pub fn is_mutable(&self) -> bool {
        self.modifiers.iter().any(|m| m == "var")
    }

    /// Check if this declaration matches a selection pattern
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else {
            self.name == pattern
                || self
                    .fully_qualified_name
                    .as_ref()
                    .map(|fqn| fqn == pattern)
                    .unwrap_or(false)
        }
    }

    /// Get a display string for this declaration
    pub fn display(&self) -> String {
        format!(
            "{} {} ({})",
            self.kind.display_name(),
            self.name,
            self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(name: &str, kind: DeclarationKind) -> Declaration {
        Declaration::new(
            DeclarationId::new(PathBuf::from("test.kt"), 0, 100),
            name.to_string(),
            kind,
            Location::new(PathBuf::from("test.kt"), 1, 1),
            Language::Kotlin,
        )
    }

    #[test]
    fn test_declaration_kind_display() {
        assert_eq!(DeclarationKind::Class.display_name(), "class");
        assert_eq!(DeclarationKind::AnnotationClass.display_name(), "annotation class");
        assert!(DeclarationKind::Getter.is_accessor());
        assert!(!DeclarationKind::Property.is_accessor());
    }

    #[test]
    fn test_matches_pattern() {
        let mut decl = declaration("UserEntity", DeclarationKind::Class);
        decl.fully_qualified_name = Some("com.example.UserEntity".to_string());

        assert!(decl.matches_pattern("*Entity"));
        assert!(decl.matches_pattern("User*"));
        assert!(decl.matches_pattern("UserEntity"));
        assert!(decl.matches_pattern("com.example.UserEntity"));
        assert!(!decl.matches_pattern("*Dao"));
    }

    #[test]
    fn test_property_parameter() {
        let mut param = declaration("id", DeclarationKind::Parameter);
        assert!(!param.is_property_parameter());

        param.modifiers.push("val".to_string());
        assert!(param.is_property_parameter());
        assert!(!param.is_mutable());
    }

    #[test]
    fn test_display() {
        let decl = declaration("name", DeclarationKind::Property);
        assert_eq!(decl.display(), "property name (test.kt:1:1)");
    }
}
