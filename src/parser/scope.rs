use super::annotation_tree::{RawAnnotation, RawArgument, RawValue};
use crate::config::ResolutionConfig;
use crate::model::{split_qualified_name, AnnotationInstance, AnnotationValue, Language};
use std::collections::HashMap;

/// Names available without an import in Kotlin sources
const KOTLIN_DEFAULTS: &[(&str, &str)] = &[
    ("Deprecated", "kotlin"),
    ("DeprecatedSinceKotlin", "kotlin"),
    ("DslMarker", "kotlin"),
    ("OptIn", "kotlin"),
    ("PublishedApi", "kotlin"),
    ("ReplaceWith", "kotlin"),
    ("RequiresOptIn", "kotlin"),
    ("SinceKotlin", "kotlin"),
    ("Suppress", "kotlin"),
    ("Throws", "kotlin"),
    ("JvmField", "kotlin.jvm"),
    ("JvmInline", "kotlin.jvm"),
    ("JvmName", "kotlin.jvm"),
    ("JvmOverloads", "kotlin.jvm"),
    ("JvmRepeatable", "kotlin.jvm"),
    ("JvmStatic", "kotlin.jvm"),
    ("JvmSuppressWildcards", "kotlin.jvm"),
    ("JvmWildcard", "kotlin.jvm"),
    ("Strictfp", "kotlin.jvm"),
    ("Synchronized", "kotlin.jvm"),
    ("Transient", "kotlin.jvm"),
    ("Volatile", "kotlin.jvm"),
    ("MustBeDocumented", "kotlin.annotation"),
    ("Repeatable", "kotlin.annotation"),
    ("Retention", "kotlin.annotation"),
    ("Target", "kotlin.annotation"),
];

/// Names available without an import in Java sources (`java.lang.*`)
const JAVA_DEFAULTS: &[(&str, &str)] = &[
    ("Deprecated", "java.lang"),
    ("FunctionalInterface", "java.lang"),
    ("Override", "java.lang"),
    ("SafeVarargs", "java.lang"),
    ("SuppressWarnings", "java.lang"),
];

/// Resolves names written in one source file to qualified names
#[derive(Debug, Clone)]
pub struct ImportScope<'c> {
    package: Option<String>,
    language: Language,
    /// Simple name (or Kotlin alias) to qualified name
    explicit: HashMap<String, String>,
    config: &'c ResolutionConfig,
}

impl<'c> ImportScope<'c> {
    /// Build a scope from import strings (`a.b.C`, `a.b.*`, `a.b.C as D`)
    pub fn new(
        package: Option<String>,
        imports: &[String],
        language: Language,
        config: &'c ResolutionConfig,
    ) -> Self {
        let mut explicit = HashMap::new();

        for import in imports {
            if import.ends_with(".*") {
                continue;
            }
            match import.split_once(" as ") {
                Some((original, alias)) => {
                    explicit.insert(alias.trim().to_string(), original.trim().to_string());
                }
                None => {
                    if let Some(simple) = import.rsplit('.').next() {
                        explicit.insert(simple.to_string(), import.clone());
                    }
                }
            }
        }

        Self {
            package,
            language,
            explicit,
            config,
        }
    }

    /// Resolve a type name as written to a qualified name
    pub fn resolve(&self, written: &str) -> String {
        let (first, rest) = match written.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (written, None),
        };

        let join = |base: &str| match rest {
            Some(rest) => format!("{}.{}", base, rest),
            None => base.to_string(),
        };

        if let Some(imported) = self.explicit.get(first) {
            return join(imported);
        }

        // Already qualified: `androidx.room.Entity`
        if rest.is_some() && first.chars().next().map(|c| c.is_lowercase()).unwrap_or(false) {
            return written.to_string();
        }

        if let Some(alias) = self.config.aliases.get(first) {
            return join(alias);
        }

        if self.config.builtins {
            let defaults = match self.language {
                Language::Kotlin => KOTLIN_DEFAULTS,
                Language::Java => JAVA_DEFAULTS,
            };
            if let Some((_, package)) = defaults.iter().find(|(name, _)| *name == first) {
                return format!("{}.{}", package, written);
            }
        }

        match &self.package {
            Some(package) => format!("{}.{}", package, written),
            None => written.to_string(),
        }
    }

    /// Turn a raw annotation into an instance with resolved names.
    ///
    /// Positional arguments are stored under `value`; several positional
    /// arguments (a Kotlin vararg) become one array.
    pub fn resolve_annotation(&self, raw: &RawAnnotation) -> AnnotationInstance {
        let (package, name) = split_qualified_name(&self.resolve(&raw.name));
        let mut instance = AnnotationInstance::with_package(package, name);
        instance.set_target(raw.target);

        let positional: Vec<&RawArgument> =
            raw.arguments.iter().filter(|a| a.name.is_none()).collect();
        let mut positional_done = false;

        for argument in &raw.arguments {
            match &argument.name {
                Some(name) => {
                    let value = self.resolve_value(&argument.value);
                    instance = instance.with_argument(name.clone(), value);
                }
                None if !positional_done => {
                    positional_done = true;
                    let value = if positional.len() == 1 {
                        self.resolve_value(&argument.value)
                    } else {
                        AnnotationValue::Array(
                            positional.iter().map(|a| self.resolve_value(&a.value)).collect(),
                        )
                    };
                    instance = instance.with_argument("value", value);
                }
                None => {}
            }
        }

        instance
    }

    fn resolve_value(&self, raw: &RawValue) -> AnnotationValue {
        match raw {
            RawValue::Bool(b) => AnnotationValue::Bool(*b),
            RawValue::Int(i) => AnnotationValue::Int(*i),
            RawValue::Float(x) => AnnotationValue::Float(*x),
            RawValue::Char(c) => AnnotationValue::Char(*c),
            RawValue::String(s) => AnnotationValue::String(s.clone()),
            RawValue::Class(name) => AnnotationValue::Class(self.resolve(name)),
            RawValue::Constant(text) => AnnotationValue::Constant(text.clone()),
            RawValue::Annotation(nested) => {
                AnnotationValue::Annotation(self.resolve_annotation(nested))
            }
            RawValue::Array(items) => {
                AnnotationValue::Array(items.iter().map(|item| self.resolve_value(item)).collect())
            }
            RawValue::Expression(text) => AnnotationValue::Expression(text.clone()),
        }
    }
}
