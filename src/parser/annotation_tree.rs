//! Annotations as read from the syntax tree, before name resolution.
//!
//! The Kotlin and Java parsers build these from annotation nodes; literal
//! tokens are decoded here so both languages agree on values.

use crate::model::UseSiteTarget;

/// An annotation as written, before name resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub name: String,
    pub target: Option<UseSiteTarget>,
    pub arguments: Vec<RawArgument>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawArgument {
    /// `None` for positional arguments
    pub name: Option<String>,
    pub value: RawValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    /// Class literal with the type name as written
    Class(String),
    Constant(String),
    Annotation(RawAnnotation),
    Array(Vec<RawValue>),
    Expression(String),
}

impl RawAnnotation {
    pub fn new(name: impl Into<String>, target: Option<UseSiteTarget>) -> Self {
        Self {
            name: name.into(),
            target,
            arguments: Vec::new(),
        }
    }
}

/// Numeric literal token (`-1`, `0x10`, `1_000L`, `0.5f`, `1e-3`)
pub fn number_value(text: &str) -> Option<RawValue> {
    let text: String = text.chars().filter(|c| *c != '_' && !c.is_whitespace()).collect();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };
    let sign = |value: i64| if negative { -value } else { value };

    let radix_digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .map(|d| (16, d))
        .or_else(|| {
            digits
                .strip_prefix("0b")
                .or_else(|| digits.strip_prefix("0B"))
                .map(|d| (2, d))
        });

    if let Some((radix, body)) = radix_digits {
        let body = body.trim_end_matches(['L', 'l', 'u', 'U']);
        return i64::from_str_radix(body, radix).ok().map(|v| RawValue::Int(sign(v)));
    }

    let is_float = digits.ends_with(['f', 'F', 'd', 'D']) || digits.contains(['.', 'e', 'E']);
    if is_float {
        let body = digits.trim_end_matches(['f', 'F', 'd', 'D']);
        let value: f64 = body.parse().ok()?;
        return Some(RawValue::Float(if negative { -value } else { value }));
    }

    let body = digits.trim_end_matches(['L', 'l', 'u', 'U']);
    body.parse().ok().map(|v| RawValue::Int(sign(v)))
}

/// Java octal literal (`017`, `0_17L`)
pub fn octal_value(text: &str) -> Option<RawValue> {
    let digits: String = text
        .trim_end_matches(['L', 'l'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let digits = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
        .unwrap_or(&digits);
    i64::from_str_radix(digits, 8).ok().map(RawValue::Int)
}

/// Decode backslash escapes of a string or char literal body
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Char literal token including its quotes (`'x'`, `'\n'`)
pub fn char_value(text: &str) -> Option<RawValue> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let decoded = unescape(body);
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(RawValue::Char(c)),
        _ => None,
    }
}

/// Kotlin `arrayOf(...)`, `intArrayOf(...)`, `emptyArray()`
pub fn is_array_factory(callee: &str) -> bool {
    let simple = callee.rsplit('.').next().unwrap_or(callee);
    simple == "arrayOf" || simple == "emptyArray" || simple.ends_with("ArrayOf")
}

/// Type named by a Kotlin class reference (`Foo::class`, `a.b.Foo::class.java`)
pub fn class_reference(text: &str) -> Option<&str> {
    let text = text.trim();
    let text = text.strip_suffix(".java").unwrap_or(text);
    let name = text.strip_suffix("::class")?.trim();
    (!name.is_empty()).then_some(name)
}

/// Identifier or dotted reference such as `RetentionPolicy.RUNTIME`
pub fn is_reference(text: &str) -> bool {
    let identifier_char = |c: char| c.is_alphanumeric() || c == '_' || c == '$' || c == '`';
    !text.is_empty()
        && text
            .split('.')
            .all(|segment| !segment.is_empty() && segment.chars().all(identifier_char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(number_value("-1"), Some(RawValue::Int(-1)));
        assert_eq!(number_value("0x10"), Some(RawValue::Int(16)));
        assert_eq!(number_value("0b101"), Some(RawValue::Int(5)));
        assert_eq!(number_value("1_000L"), Some(RawValue::Int(1000)));
        assert_eq!(number_value("42u"), Some(RawValue::Int(42)));
        assert_eq!(number_value("0.5f"), Some(RawValue::Float(0.5)));
        assert_eq!(number_value("1e-3"), Some(RawValue::Float(0.001)));
        assert_eq!(number_value("- 2"), Some(RawValue::Int(-2)));
        assert_eq!(number_value("abc"), None);
        assert_eq!(octal_value("017"), Some(RawValue::Int(15)));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"tab\there"), "tab\there");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r"A"), "A");
        assert_eq!(char_value(r"'\n'"), Some(RawValue::Char('\n')));
        assert_eq!(char_value("'x'"), Some(RawValue::Char('x')));
        assert_eq!(char_value("'xy'"), None);
    }

    #[test]
    fn test_class_references() {
        assert_eq!(class_reference("Foo::class"), Some("Foo"));
        assert_eq!(class_reference("a.b.Foo::class.java"), Some("a.b.Foo"));
        assert_eq!(class_reference("Foo.BAR"), None);
        assert!(is_array_factory("arrayOf"));
        assert!(is_array_factory("kotlin.intArrayOf"));
        assert!(!is_array_factory("Index"));
        assert!(is_reference("RetentionPolicy.RUNTIME"));
        assert!(!is_reference("\"a\" + B"));
    }
}
