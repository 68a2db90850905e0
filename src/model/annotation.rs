use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when an annotation argument does not have the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    #[error("annotation {annotation} has no argument named `{argument}`")]
    MissingArgument { annotation: String, argument: String },

    #[error("argument `{argument}` of {annotation} is {found}, expected {expected}")]
    UnexpectedValue {
        annotation: String,
        argument: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Explicit use-site target of an annotation (`@field:`, `@get:`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseSiteTarget {
    Field,
    File,
    Property,
    PropertyGetter,
    PropertySetter,
    Receiver,
    ConstructorParameter,
    SetterParameter,
    Delegate,
}

impl UseSiteTarget {
    /// Parse the label as written before the colon in Kotlin source
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "field" => Some(UseSiteTarget::Field),
            "file" => Some(UseSiteTarget::File),
            "property" => Some(UseSiteTarget::Property),
            "get" => Some(UseSiteTarget::PropertyGetter),
            "set" => Some(UseSiteTarget::PropertySetter),
            "receiver" => Some(UseSiteTarget::Receiver),
            "param" => Some(UseSiteTarget::ConstructorParameter),
            "setparam" => Some(UseSiteTarget::SetterParameter),
            "delegate" => Some(UseSiteTarget::Delegate),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UseSiteTarget::Field => "field",
            UseSiteTarget::File => "file",
            UseSiteTarget::Property => "property",
            UseSiteTarget::PropertyGetter => "get",
            UseSiteTarget::PropertySetter => "set",
            UseSiteTarget::Receiver => "receiver",
            UseSiteTarget::ConstructorParameter => "param",
            UseSiteTarget::SetterParameter => "setparam",
            UseSiteTarget::Delegate => "delegate",
        }
    }
}

impl fmt::Display for UseSiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a single annotation argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    /// Class literal, holding the resolved qualified name
    Class(String),
    /// Enum entry or constant reference, as written
    Constant(String),
    Annotation(AnnotationInstance),
    Array(Vec<AnnotationValue>),
    /// Constant expression the parser does not evaluate
    Expression(String),
}

impl AnnotationValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnnotationValue::Bool(_) => "a boolean",
            AnnotationValue::Int(_) => "an integer",
            AnnotationValue::Float(_) => "a float",
            AnnotationValue::Char(_) => "a char",
            AnnotationValue::String(_) => "a string",
            AnnotationValue::Class(_) => "a class literal",
            AnnotationValue::Constant(_) => "a constant reference",
            AnnotationValue::Annotation(_) => "an annotation",
            AnnotationValue::Array(_) => "an array",
            AnnotationValue::Expression(_) => "an expression",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationInstance> {
        match self {
            AnnotationValue::Annotation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            AnnotationValue::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Bool(b) => write!(f, "{}", b),
            AnnotationValue::Int(i) => write!(f, "{}", i),
            AnnotationValue::Float(x) => write!(f, "{}", x),
            AnnotationValue::Char(c) => write!(f, "'{}'", c),
            AnnotationValue::String(s) => write!(f, "{:?}", s),
            AnnotationValue::Class(name) => write!(f, "{}::class", name),
            AnnotationValue::Constant(text) | AnnotationValue::Expression(text) => {
                f.write_str(text)
            }
            AnnotationValue::Annotation(a) => write!(f, "{}", a),
            AnnotationValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A named argument of an annotation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationArgument {
    pub name: String,
    pub value: AnnotationValue,
}

/// One applied annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInstance {
    /// Qualifier of the type name: the package, or the outer type of a
    /// nested annotation ("androidx.room", "com.example.Outer")
    package: String,

    /// Last segment of the type name
    name: String,

    /// Explicit use-site target, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_site_target: Option<UseSiteTarget>,

    /// Arguments in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    arguments: Vec<AnnotationArgument>,
}

impl AnnotationInstance {
    /// Create an instance from a fully qualified type name
    pub fn new(qualified_name: &str) -> Self {
        let (package, name) = split_qualified_name(qualified_name);
        Self::with_package(package, name)
    }

    /// Create an instance from a qualifier and a simple type name
    pub fn with_package(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            use_site_target: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: UseSiteTarget) -> Self {
        self.use_site_target = Some(target);
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.arguments.push(AnnotationArgument {
            name: name.into(),
            value,
        });
        self
    }

    pub fn set_target(&mut self, target: Option<UseSiteTarget>) {
        self.use_site_target = target;
    }

    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// Compare the type against a qualified name without allocating
    pub fn is_type(&self, qualified_name: &str) -> bool {
        if self.package.is_empty() {
            return self.name == qualified_name;
        }
        qualified_name.len() == self.package.len() + 1 + self.name.len()
            && qualified_name.starts_with(self.package.as_str())
            && qualified_name.as_bytes()[self.package.len()] == b'.'
            && qualified_name.ends_with(self.name.as_str())
    }

    /// Namespace prefix before the last segment of the type name
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn use_site_target(&self) -> Option<UseSiteTarget> {
        self.use_site_target
    }

    pub fn arguments(&self) -> &[AnnotationArgument] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&AnnotationValue> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }

    /// Unwrap an argument holding annotation instances.
    ///
    /// A single annotation value counts as a one-element array, matching the
    /// shorthand both Kotlin and Java allow for array-typed arguments.
    pub fn annotation_array(
        &self,
        name: &str,
    ) -> Result<Vec<&AnnotationInstance>, AnnotationError> {
        let value = self
            .argument(name)
            .ok_or_else(|| AnnotationError::MissingArgument {
                annotation: self.qualified_name(),
                argument: name.to_string(),
            })?;

        match value {
            AnnotationValue::Annotation(single) => Ok(vec![single]),
            AnnotationValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_annotation()
                        .ok_or_else(|| AnnotationError::UnexpectedValue {
                            annotation: self.qualified_name(),
                            argument: name.to_string(),
                            expected: "an array of annotations",
                            found: item.kind_name(),
                        })
                })
                .collect(),
            other => Err(AnnotationError::UnexpectedValue {
                annotation: self.qualified_name(),
                argument: name.to_string(),
                expected: "an array of annotations",
                found: other.kind_name(),
            }),
        }
    }
}

impl fmt::Display for AnnotationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@")?;
        if let Some(target) = self.use_site_target {
            write!(f, "{}:", target)?;
        }
        f.write_str(&self.qualified_name())?;
        if !self.arguments.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} = {}", arg.name, arg.value)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Split "com.example.Outer.Inner" into ("com.example.Outer", "Inner")
pub fn split_qualified_name(qualified_name: &str) -> (String, String) {
    match qualified_name.rsplit_once('.') {
        Some((qualifier, name)) => (qualifier.to_string(), name.to_string()),
        None => (String::new(), qualified_name.to_string()),
    }
}
