use super::annotation_tree::{
    char_value, is_reference, number_value, octal_value, unescape, RawAnnotation, RawArgument,
    RawValue,
};
use super::common::{
    build_fqn, child_of_kind, children_of_kind, node_location, node_text, resolve_annotations,
    ParseResult, Parser,
};
use super::scope::ImportScope;
use crate::config::ResolutionConfig;
use crate::model::{AnnotationInstance, Declaration, DeclarationId, DeclarationKind, Language};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tree_sitter::{Node, Parser as TsParser};
use tracing::debug;

/// Java source code parser using tree-sitter
pub struct JavaParser {
    resolution: ResolutionConfig,
}

struct FileContext<'a> {
    path: &'a Path,
    source: &'a str,
    package: Option<String>,
    scope: ImportScope<'a>,
}

impl JavaParser {
    pub fn new() -> Self {
        Self::with_resolution(ResolutionConfig::default())
    }

    pub fn with_resolution(resolution: ResolutionConfig) -> Self {
        Self { resolution }
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let package = child_of_kind(root, "package_declaration")?;
        let mut cursor = package.walk();
        let name = package
            .children(&mut cursor)
            .find(|c| c.kind() == "scoped_identifier" || c.kind() == "identifier")
            .map(|c| node_text(c, source).to_string());
        name
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<String> {
        let mut imports = Vec::new();

        for import in children_of_kind(root, "import_declaration") {
            let mut cursor = import.walk();
            let mut path = None;
            let mut wildcard = false;
            let mut is_static = false;

            for child in import.children(&mut cursor) {
                match child.kind() {
                    "scoped_identifier" | "identifier" => {
                        path = Some(node_text(child, source));
                    }
                    "asterisk" => wildcard = true,
                    "static" => is_static = true,
                    _ => {}
                }
            }

            // Static imports bring members, never annotation types
            if is_static {
                continue;
            }

            if let Some(path) = path {
                if wildcard {
                    imports.push(format!("{}.*", path));
                } else {
                    imports.push(path.to_string());
                }
            }
        }

        imports
    }

    fn extract_declarations(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "annotation_type_declaration"
                | "record_declaration" => {
                    self.extract_type(ctx, child, parent, result)?;
                }
                "method_declaration" | "annotation_type_element_declaration" => {
                    if let Some(parent) = parent {
                        self.extract_method(ctx, child, parent, result)?;
                    }
                }
                "constructor_declaration" | "compact_constructor_declaration" => {
                    if let Some(parent) = parent {
                        self.extract_constructor(ctx, child, parent, result)?;
                    }
                }
                "field_declaration" | "constant_declaration" => {
                    if let Some(parent) = parent {
                        self.extract_fields(ctx, child, parent, result);
                    }
                }
                "enum_constant" => {
                    if let Some(parent) = parent {
                        self.extract_enum_constant(ctx, child, parent, result);
                    }
                }
                "class_body"
                | "interface_body"
                | "enum_body"
                | "enum_body_declarations"
                | "annotation_type_body" => {
                    self.extract_declarations(ctx, child, parent, result)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn new_declaration(
        &self,
        ctx: &FileContext,
        node: Node,
        name: String,
        kind: DeclarationKind,
        parent: Option<DeclarationId>,
    ) -> Declaration {
        let id = DeclarationId::new(ctx.path.to_path_buf(), node.start_byte(), node.end_byte());
        let location = node_location(ctx.path, node);
        let mut decl = Declaration::new(id, name, kind, location, Language::Java);
        decl.parent = parent;
        if let Some(modifiers) = child_of_kind(node, "modifiers") {
            decl.annotations = self.extract_annotations(ctx, modifiers);
            decl.modifiers = self.keyword_modifiers(modifiers, ctx.source);
        }
        decl
    }

    fn extract_type(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let name = self.get_name(node, ctx.source)?;
        let kind = match node.kind() {
            "interface_declaration" => DeclarationKind::Interface,
            "enum_declaration" => DeclarationKind::Enum,
            "annotation_type_declaration" => DeclarationKind::AnnotationClass,
            _ => DeclarationKind::Class,
        };

        let parent_id = parent.map(|p| p.id.clone());
        let mut decl = self.new_declaration(ctx, node, name.clone(), kind, parent_id);
        let outer = parent.and_then(|p| p.fully_qualified_name.as_ref());
        decl.fully_qualified_name = Some(match outer {
            Some(outer) => format!("{}.{}", outer, name),
            None => build_fqn(&ctx.package, &name),
        });
        let type_decl = decl.clone();
        result.declarations.push(decl);

        // Record components: their annotations apply to the generated fields
        if node.kind() == "record_declaration" {
            if let Some(params) = node.child_by_field_name("parameters") {
                for component in children_of_kind(params, "formal_parameter") {
                    let kind = DeclarationKind::Field;
                    self.extract_parameter(ctx, component, kind, &type_decl.id, result);
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.extract_declarations(ctx, body, Some(&type_decl), result)?;
        }

        Ok(())
    }

    fn extract_method(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let name = self.get_name(node, ctx.source)?;
        let decl = self.new_declaration(
            ctx,
            node,
            name,
            DeclarationKind::Method,
            Some(parent.id.clone()),
        );
        let id = decl.id.clone();
        result.declarations.push(decl);

        if let Some(params) = node.child_by_field_name("parameters") {
            self.extract_formal_parameters(ctx, params, &id, result);
        }

        Ok(())
    }

    fn extract_constructor(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let decl = self.new_declaration(
            ctx,
            node,
            parent.name.clone(),
            DeclarationKind::Constructor,
            Some(parent.id.clone()),
        );
        let id = decl.id.clone();
        result.declarations.push(decl);

        if let Some(params) = node.child_by_field_name("parameters") {
            self.extract_formal_parameters(ctx, params, &id, result);
        }

        Ok(())
    }

    fn extract_formal_parameters(
        &self,
        ctx: &FileContext,
        params: Node,
        parent: &DeclarationId,
        result: &mut ParseResult,
    ) {
        let mut cursor = params.walk();
        for param in params.children(&mut cursor) {
            if param.kind() == "formal_parameter" || param.kind() == "spread_parameter" {
                self.extract_parameter(ctx, param, DeclarationKind::Parameter, parent, result);
            }
        }
    }

    fn extract_parameter(
        &self,
        ctx: &FileContext,
        param: Node,
        kind: DeclarationKind,
        parent: &DeclarationId,
        result: &mut ParseResult,
    ) {
        // `String... names` keeps its name inside a variable_declarator
        let name_node = param.child_by_field_name("name").or_else(|| {
            child_of_kind(param, "variable_declarator").and_then(|d| d.child_by_field_name("name"))
        });
        let Some(name_node) = name_node else {
            return;
        };

        let name = node_text(name_node, ctx.source).to_string();
        let decl = self.new_declaration(ctx, param, name, kind, Some(parent.clone()));
        result.declarations.push(decl);
    }

    /// `int a, b;` declares one field per declarator, all sharing the modifiers
    fn extract_fields(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) {
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(name_node, ctx.source).to_string();
            let mut decl = self.new_declaration(
                ctx,
                node,
                name,
                DeclarationKind::Field,
                Some(parent.id.clone()),
            );
            decl.id = DeclarationId::new(
                ctx.path.to_path_buf(),
                declarator.start_byte(),
                declarator.end_byte(),
            );
            decl.location = node_location(ctx.path, declarator);
            result.declarations.push(decl);
        }
    }

    fn extract_enum_constant(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, ctx.source).to_string();
        let decl = self.new_declaration(
            ctx,
            node,
            name,
            DeclarationKind::EnumEntry,
            Some(parent.id.clone()),
        );
        result.declarations.push(decl);
    }

    fn extract_annotations(&self, ctx: &FileContext, modifiers: Node) -> Vec<AnnotationInstance> {
        let mut cursor = modifiers.walk();
        let raw: Vec<RawAnnotation> = modifiers
            .children(&mut cursor)
            .filter_map(|c| self.read_annotation(c, ctx.source))
            .collect();

        resolve_annotations(raw, &ctx.scope)
    }

    /// `@Marker` or `@Name(arguments)`; other nodes yield `None`
    fn read_annotation(&self, node: Node, source: &str) -> Option<RawAnnotation> {
        if node.kind() != "annotation" && node.kind() != "marker_annotation" {
            return None;
        }
        let name = node.child_by_field_name("name")?;
        let mut annotation = RawAnnotation::new(node_text(name, source), None);

        if let Some(arguments) = node.child_by_field_name("arguments") {
            annotation.arguments = self.read_arguments(arguments, source);
        }

        Some(annotation)
    }

    /// A single element value is positional; otherwise `key = value` pairs
    fn read_arguments(&self, list: Node, source: &str) -> Vec<RawArgument> {
        let mut cursor = list.walk();
        let arguments = list
            .named_children(&mut cursor)
            .filter(|c| !is_comment(c.kind()))
            .map(|child| {
                if child.kind() == "element_value_pair" {
                    RawArgument {
                        name: child
                            .child_by_field_name("key")
                            .map(|k| node_text(k, source).to_string()),
                        value: match child.child_by_field_name("value") {
                            Some(value) => self.read_value(value, source),
                            None => RawValue::Expression(String::new()),
                        },
                    }
                } else {
                    RawArgument {
                        name: None,
                        value: self.read_value(child, source),
                    }
                }
            })
            .collect();
        arguments
    }

    fn read_value(&self, node: Node, source: &str) -> RawValue {
        let text = node_text(node, source).trim();
        let expression = || RawValue::Expression(text.to_string());

        match node.kind() {
            "annotation" | "marker_annotation" => match self.read_annotation(node, source) {
                Some(nested) => RawValue::Annotation(nested),
                None => expression(),
            },
            "element_value_array_initializer" => {
                let mut cursor = node.walk();
                let items = node
                    .named_children(&mut cursor)
                    .filter(|c| !is_comment(c.kind()))
                    .map(|c| self.read_value(c, source))
                    .collect();
                RawValue::Array(items)
            }
            "true" => RawValue::Bool(true),
            "false" => RawValue::Bool(false),
            "string_literal" => self.read_string(node, source),
            "character_literal" => char_value(text).unwrap_or_else(expression),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal" => number_value(text).unwrap_or_else(expression),
            "octal_integer_literal" => octal_value(text).unwrap_or_else(expression),
            "unary_expression" => number_value(text).unwrap_or_else(expression),
            "class_literal" => match node.named_child(0) {
                Some(class) => RawValue::Class(node_text(class, source).to_string()),
                None => expression(),
            },
            "parenthesized_expression" => match node.named_child(0) {
                Some(inner) => self.read_value(inner, source),
                None => expression(),
            },
            "null_literal" => RawValue::Constant(text.to_string()),
            _ if is_reference(text) => RawValue::Constant(text.to_string()),
            _ => expression(),
        }
    }

    /// Text blocks keep their contents as written; templates stay expressions
    fn read_string(&self, node: Node, source: &str) -> RawValue {
        let mut content = String::new();
        let mut cursor = node.walk();

        for part in node.named_children(&mut cursor) {
            match part.kind() {
                "string_fragment" | "multiline_string_fragment" => {
                    content.push_str(node_text(part, source))
                }
                "escape_sequence" => content.push_str(&unescape(node_text(part, source))),
                _ => return RawValue::Expression(node_text(node, source).to_string()),
            }
        }

        RawValue::String(content)
    }

    fn keyword_modifiers(&self, modifiers: Node, source: &str) -> Vec<String> {
        let mut cursor = modifiers.walk();
        modifiers
            .children(&mut cursor)
            .filter(|c| c.kind() != "annotation" && c.kind() != "marker_annotation")
            .map(|c| node_text(c, source).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn get_name(&self, node: Node, source: &str) -> Result<String> {
        node.child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .ok_or_else(|| miette::miette!("Could not find name in node: {}", node.kind()))
    }
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment")
}

impl Parser for JavaParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .into_diagnostic()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Java file"))?;

        let root = tree.root_node();
        let mut result = ParseResult::new();

        result.package = self.extract_package(root, contents);
        result.imports = self.extract_imports(root, contents);

        let ctx = FileContext {
            path,
            source: contents,
            package: result.package.clone(),
            scope: ImportScope::new(
                result.package.clone(),
                &result.imports,
                Language::Java,
                &self.resolution,
            ),
        };

        self.extract_declarations(&ctx, root, None, &mut result)?;

        debug!(
            "Parsed {}: {} declarations, {} annotations",
            path.display(),
            result.declarations.len(),
            result.annotation_count()
        );

        Ok(result)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}
