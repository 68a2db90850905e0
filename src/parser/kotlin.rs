use super::annotation_tree::{
    char_value, class_reference, is_array_factory, is_reference, number_value, unescape,
    RawAnnotation, RawArgument, RawValue,
};
use super::common::{
    build_fqn, child_of_kind, children_of_kind, node_location, node_text, resolve_annotations,
    ParseResult, Parser,
};
use super::scope::ImportScope;
use crate::config::ResolutionConfig;
use crate::model::{
    AnnotationInstance, Declaration, DeclarationId, DeclarationKind, Language, UseSiteTarget,
};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tree_sitter::{Node, Parser as TsParser};
use tracing::debug;

/// Modifier keywords that change what a `class_declaration` declares
const CLASS_KIND_MODIFIERS: &[(&str, DeclarationKind)] = &[
    ("annotation", DeclarationKind::AnnotationClass),
    ("enum", DeclarationKind::Enum),
];

/// Kotlin source code parser using tree-sitter
pub struct KotlinParser {
    resolution: ResolutionConfig,
}

/// Per-file state shared by the extraction methods
struct FileContext<'a> {
    path: &'a Path,
    source: &'a str,
    package: Option<String>,
    scope: ImportScope<'a>,
}

impl KotlinParser {
    pub fn new() -> Self {
        Self::with_resolution(ResolutionConfig::default())
    }

    pub fn with_resolution(resolution: ResolutionConfig) -> Self {
        Self { resolution }
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let header = child_of_kind(root, "package_header")?;
        let identifier = child_of_kind(header, "identifier")?;
        Some(node_text(identifier, source).to_string())
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<String> {
        let mut imports = Vec::new();

        // Imports are normally grouped in an import_list, but accept bare headers too
        let mut headers = children_of_kind(root, "import_header");
        for list in children_of_kind(root, "import_list") {
            headers.extend(children_of_kind(list, "import_header"));
        }

        for header in headers {
            // tree-sitter-kotlin doesn't use field names for import identifiers
            let Some(identifier) = child_of_kind(header, "identifier") else {
                continue;
            };
            let path = node_text(identifier, source);

            let mut cursor = header.walk();
            let mut wildcard = false;
            let mut alias = None;
            for child in header.children(&mut cursor) {
                match child.kind() {
                    "*" | "wildcard_import" => wildcard = true,
                    "import_alias" => {
                        let text = node_text(child, source).trim();
                        alias = text.strip_prefix("as").map(|a| a.trim().to_string());
                    }
                    _ => {}
                }
            }

            imports.push(match (wildcard, alias) {
                (true, _) => format!("{}.*", path),
                (false, Some(alias)) => format!("{} as {}", path, alias),
                (false, None) => path.to_string(),
            });
        }

        imports
    }

    fn extract_declarations(
        &self,
        ctx: &FileContext,
        node: Node,
        result: &mut ParseResult,
    ) -> Result<()> {
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_declaration" => {
                    self.extract_class(ctx, child, None, result)?;
                }
                "object_declaration" => {
                    self.extract_object(ctx, child, None, result)?;
                }
                "function_declaration" => {
                    self.extract_function(ctx, child, None, result)?;
                }
                "property_declaration" => {
                    self.extract_property(ctx, child, None, result)?;
                }
                "package_header" | "import_list" | "import_header" | "file_annotation" => {}
                _ => {
                    // Recurse into other nodes
                    self.extract_declarations(ctx, child, result)?;
                }
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
        let mut decl = Declaration::new(id, name, kind, location, Language::Kotlin);
        decl.parent = parent;
        decl.annotations = self.extract_annotations(ctx, node);
        decl.modifiers = self.extract_modifiers(node, ctx.source);
        decl
    }

    fn extract_class(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let name = self.get_type_name(node, ctx.source)?;
        let kind = self.determine_class_kind(node, ctx.source);

        let parent_id = parent.map(|p| p.id.clone());
        let mut decl = self.new_declaration(ctx, node, name.clone(), kind, parent_id);
        decl.fully_qualified_name = Some(self.nested_fqn(ctx, parent, &name));
        let class = decl.clone();
        result.declarations.push(decl);

        if let Some(constructor) = child_of_kind(node, "primary_constructor") {
            self.extract_primary_constructor(ctx, constructor, &class, result)?;
        }

        // tree-sitter-kotlin doesn't use field names for class_body
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "class_body" || child.kind() == "enum_class_body" {
                self.extract_class_members(ctx, child, &class, result)?;
                break;
            }
        }

        Ok(())
    }

    fn extract_object(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let name = if node.kind() == "companion_object" {
            child_of_kind(node, "type_identifier")
                .map(|n| node_text(n, ctx.source).to_string())
                .unwrap_or_else(|| "Companion".to_string())
        } else {
            self.get_type_name(node, ctx.source)?
        };

        let mut decl = self.new_declaration(
            ctx,
            node,
            name.clone(),
            DeclarationKind::Object,
            parent.map(|p| p.id.clone()),
        );
        decl.fully_qualified_name = Some(self.nested_fqn(ctx, parent, &name));
        let object = decl.clone();
        result.declarations.push(decl);

        if let Some(body) = child_of_kind(node, "class_body") {
            self.extract_class_members(ctx, body, &object, result)?;
        }

        Ok(())
    }

    fn extract_class_members(
        &self,
        ctx: &FileContext,
        body: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let mut cursor = body.walk();

        for child in body.children(&mut cursor) {
            match child.kind() {
                "class_declaration" => {
                    self.extract_class(ctx, child, Some(parent), result)?;
                }
                "object_declaration" | "companion_object" => {
                    self.extract_object(ctx, child, Some(parent), result)?;
                }
                "function_declaration" => {
                    self.extract_function(ctx, child, Some(parent), result)?;
                }
                "property_declaration" => {
                    self.extract_property(ctx, child, Some(parent), result)?;
                }
                "secondary_constructor" => {
                    self.extract_secondary_constructor(ctx, child, parent, result)?;
                }
                "enum_entry" => {
                    self.extract_enum_entry(ctx, child, parent, result)?;
                }
                // Some grammar versions wrap members in class_member_declarations
                "class_member_declarations" | "enum_entries" => {
                    self.extract_class_members(ctx, child, parent, result)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn extract_enum_entry(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let Some(name_node) = child_of_kind(node, "simple_identifier") else {
            return Ok(());
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
        Ok(())
    }

    fn extract_function(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let name = self.extract_function_name(node, ctx.source);
        let kind = if parent.is_some() {
            DeclarationKind::Method
        } else {
            DeclarationKind::Function
        };

        let parent_id = parent.map(|p| p.id.clone());
        let mut decl = self.new_declaration(ctx, node, name.clone(), kind, parent_id);
        if parent.is_none() {
            decl.fully_qualified_name = Some(build_fqn(&ctx.package, &name));
        }
        let id = decl.id.clone();
        result.declarations.push(decl);

        if let Some(params) = child_of_kind(node, "function_value_parameters") {
            self.extract_value_parameters(ctx, params, &id, result);
        }

        Ok(())
    }

    /// Parameters of a function or secondary constructor.
    ///
    /// Annotations on these parameters live in a `parameter_modifiers`
    /// sibling placed before the `parameter` node.
    fn extract_value_parameters(
        &self,
        ctx: &FileContext,
        params: Node,
        parent: &DeclarationId,
        result: &mut ParseResult,
    ) {
        let mut cursor = params.walk();
        let mut pending_modifiers: Option<Node> = None;

        for child in params.children(&mut cursor) {
            match child.kind() {
                "parameter_modifiers" => pending_modifiers = Some(child),
                "parameter" => {
                    let Some(name_node) = child_of_kind(child, "simple_identifier") else {
                        pending_modifiers = None;
                        continue;
                    };
                    let name = node_text(name_node, ctx.source).to_string();
                    let mut decl = self.new_declaration(
                        ctx,
                        child,
                        name,
                        DeclarationKind::Parameter,
                        Some(parent.clone()),
                    );
                    if let Some(modifiers) = pending_modifiers.take() {
                        let mut annotations = self.extract_annotations(ctx, modifiers);
                        annotations.append(&mut decl.annotations);
                        decl.annotations = annotations;
                        decl.modifiers.extend(self.keyword_modifiers(modifiers, ctx.source));
                    }
                    result.declarations.push(decl);
                }
                _ => {}
            }
        }
    }

    fn extract_primary_constructor(
        &self,
        ctx: &FileContext,
        node: Node,
        class: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let decl = self.new_declaration(
            ctx,
            node,
            "constructor".to_string(),
            DeclarationKind::Constructor,
            Some(class.id.clone()),
        );
        let id = decl.id.clone();
        result.declarations.push(decl);

        let mut parameters = children_of_kind(node, "class_parameter");
        for list in children_of_kind(node, "class_parameters") {
            parameters.extend(children_of_kind(list, "class_parameter"));
        }

        for parameter in parameters {
            let Some(name_node) = child_of_kind(parameter, "simple_identifier") else {
                continue;
            };
            let name = node_text(name_node, ctx.source).to_string();
            let mut decl = self.new_declaration(
                ctx,
                parameter,
                name,
                DeclarationKind::Parameter,
                Some(id.clone()),
            );
            decl.modifiers.extend(self.binding_keyword(parameter, ctx.source));
            result.declarations.push(decl);
        }

        Ok(())
    }

    fn extract_secondary_constructor(
        &self,
        ctx: &FileContext,
        node: Node,
        class: &Declaration,
        result: &mut ParseResult,
    ) -> Result<()> {
        let decl = self.new_declaration(
            ctx,
            node,
            "constructor".to_string(),
            DeclarationKind::Constructor,
            Some(class.id.clone()),
        );
        let id = decl.id.clone();
        result.declarations.push(decl);

        if let Some(params) = child_of_kind(node, "function_value_parameters") {
            self.extract_value_parameters(ctx, params, &id, result);
        }

        Ok(())
    }

    fn extract_property(
        &self,
        ctx: &FileContext,
        node: Node,
        parent: Option<&Declaration>,
        result: &mut ParseResult,
    ) -> Result<()> {
        let Some(variable) = child_of_kind(node, "variable_declaration") else {
            // Destructuring declarations carry no property annotations
            return Ok(());
        };
        let Some(name_node) = child_of_kind(variable, "simple_identifier") else {
            return Ok(());
        };
        let name = node_text(name_node, ctx.source).to_string();

        let mut decl = self.new_declaration(
            ctx,
            node,
            name.clone(),
            DeclarationKind::Property,
            parent.map(|p| p.id.clone()),
        );
        if parent.is_none() {
            decl.fully_qualified_name = Some(build_fqn(&ctx.package, &name));
        }
        decl.modifiers.extend(self.binding_keyword(node, ctx.source));
        let id = decl.id.clone();
        result.declarations.push(decl);

        for accessor in self.find_accessors(node) {
            self.extract_accessor(ctx, accessor, &id, &name, result);
        }

        Ok(())
    }

    /// Getter/setter nodes of a property.
    ///
    /// Depending on the grammar version they are children of the
    /// property_declaration or its following siblings.
    fn find_accessors<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut accessors = children_of_kind(node, "getter");
        accessors.extend(children_of_kind(node, "setter"));

        let mut next = node.next_sibling();
        while let Some(sibling) = next {
            match sibling.kind() {
                "getter" | "setter" => {
                    accessors.push(sibling);
                    next = sibling.next_sibling();
                }
                _ => break,
            }
        }

        accessors
    }

    fn extract_accessor(
        &self,
        ctx: &FileContext,
        node: Node,
        property: &DeclarationId,
        property_name: &str,
        result: &mut ParseResult,
    ) {
        let (kind, name) = if node.kind() == "getter" {
            (DeclarationKind::Getter, format!("<get-{}>", property_name))
        } else {
            (DeclarationKind::Setter, format!("<set-{}>", property_name))
        };

        let decl = self.new_declaration(ctx, node, name, kind, Some(property.clone()));
        let id = decl.id.clone();
        result.declarations.push(decl);

        if kind != DeclarationKind::Setter {
            return;
        }

        // set(@Foo value) { ... }
        if let Some(parameter) = child_of_kind(node, "parameter_with_optional_type") {
            if let Some(name_node) = child_of_kind(parameter, "simple_identifier") {
                let name = node_text(name_node, ctx.source).to_string();
                let decl = self.new_declaration(
                    ctx,
                    parameter,
                    name,
                    DeclarationKind::Parameter,
                    Some(id),
                );
                result.declarations.push(decl);
            }
        }
    }

    fn extract_annotations(&self, ctx: &FileContext, node: Node) -> Vec<AnnotationInstance> {
        let mut raw = Vec::new();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "modifiers" | "parameter_modifiers" => {
                    for annotation in children_of_kind(child, "annotation") {
                        raw.extend(self.read_annotation(annotation, ctx.source));
                    }
                }
                "annotation" => raw.extend(self.read_annotation(child, ctx.source)),
                _ => {}
            }
        }

        // tree-sitter-kotlin sometimes places annotations of a top-level
        // declaration in a preceding prefix_expression sibling
        if let Some(prev) = node.prev_sibling() {
            if prev.kind() == "prefix_expression" {
                for annotation in children_of_kind(prev, "annotation") {
                    raw.extend(self.read_annotation(annotation, ctx.source));
                }
            }
        }

        resolve_annotations(raw, &ctx.scope)
    }

    /// One `annotation` node; `@[A B]` yields several annotations sharing
    /// the use-site target
    fn read_annotation(&self, node: Node, source: &str) -> Vec<RawAnnotation> {
        let target = child_of_kind(node, "use_site_target").and_then(|t| {
            let label = node_text(t, source).trim_end_matches(':').trim();
            UseSiteTarget::from_label(label)
        });

        let mut cursor = node.walk();
        let annotations = node
            .named_children(&mut cursor)
            .filter_map(|child| match child.kind() {
                "constructor_invocation" => {
                    let user_type = child_of_kind(child, "user_type")?;
                    let name = self.type_name(user_type, source);
                    let mut annotation = RawAnnotation::new(name, target);
                    if let Some(arguments) = child_of_kind(child, "value_arguments") {
                        annotation.arguments = self.read_value_arguments(arguments, source);
                    }
                    Some(annotation)
                }
                "user_type" => Some(RawAnnotation::new(self.type_name(child, source), target)),
                _ => None,
            })
            .collect();
        annotations
    }

    /// `androidx.room.Entity` from a user_type, without type arguments
    fn type_name(&self, user_type: Node, source: &str) -> String {
        children_of_kind(user_type, "type_identifier")
            .into_iter()
            .map(|segment| node_text(segment, source).trim_matches('`'))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn read_value_arguments(&self, node: Node, source: &str) -> Vec<RawArgument> {
        children_of_kind(node, "value_argument")
            .into_iter()
            .filter_map(|argument| {
                let mut cursor = argument.walk();
                let children: Vec<Node> = argument.children(&mut cursor).collect();

                // `name = value`; without `=` the only identifier is the value
                let name = if children.iter().any(|c| c.kind() == "=") {
                    children
                        .iter()
                        .find(|c| c.kind() == "simple_identifier")
                        .map(|n| node_text(*n, source).to_string())
                } else {
                    None
                };
                let value = children.iter().rev().find(|c| {
                    !matches!(c.kind(), "=" | "*" | "annotation") && !is_comment(c.kind())
                })?;

                Some(RawArgument {
                    name,
                    value: self.read_value(*value, source),
                })
            })
            .collect()
    }

    fn read_value(&self, node: Node, source: &str) -> RawValue {
        let text = node_text(node, source).trim();

        match node.kind() {
            "boolean_literal" => RawValue::Bool(text == "true"),
            "integer_literal" | "hex_literal" | "bin_literal" | "long_literal"
            | "unsigned_literal" | "real_literal" => {
                number_value(text).unwrap_or_else(|| RawValue::Expression(text.to_string()))
            }
            "prefix_expression" => {
                number_value(text).unwrap_or_else(|| RawValue::Expression(text.to_string()))
            }
            "character_literal" => {
                char_value(text).unwrap_or_else(|| RawValue::Expression(text.to_string()))
            }
            "string_literal" => self.read_string(node, source),
            "collection_literal" => RawValue::Array(self.read_elements(node, source)),
            "call_expression" => self.read_call(node, source),
            "parenthesized_expression" => match node.named_child(0) {
                Some(inner) => self.read_value(inner, source),
                None => RawValue::Expression(text.to_string()),
            },
            _ => {
                if let Some(class_name) = class_reference(text) {
                    RawValue::Class(class_name.to_string())
                } else if is_reference(text) {
                    RawValue::Constant(text.to_string())
                } else {
                    RawValue::Expression(text.to_string())
                }
            }
        }
    }

    /// Strings with `$` templates are kept as expression text
    fn read_string(&self, node: Node, source: &str) -> RawValue {
        let text = node_text(node, source);
        let mut cursor = node.walk();
        let parts: Vec<Node> = node.named_children(&mut cursor).collect();

        if parts.iter().any(|p| p.kind() != "string_content") {
            return RawValue::Expression(text.to_string());
        }

        let content: String = parts.iter().map(|p| node_text(*p, source)).collect();
        if text.starts_with("\"\"\"") {
            RawValue::String(content)
        } else {
            RawValue::String(unescape(&content))
        }
    }

    fn read_elements(&self, node: Node, source: &str) -> Vec<RawValue> {
        let mut cursor = node.walk();
        let elements = node
            .named_children(&mut cursor)
            .filter(|c| !is_comment(c.kind()))
            .map(|c| self.read_value(c, source))
            .collect();
        elements
    }

    /// `arrayOf(...)` or a nested annotation written as a constructor call
    fn read_call(&self, node: Node, source: &str) -> RawValue {
        let text = node_text(node, source).trim();
        let callee = node.named_child(0).map(|c| node_text(c, source).trim());
        let arguments = child_of_kind(node, "call_suffix")
            .and_then(|suffix| child_of_kind(suffix, "value_arguments"));

        let (Some(callee), Some(arguments)) = (callee, arguments) else {
            return RawValue::Expression(text.to_string());
        };
        if !is_reference(callee) {
            return RawValue::Expression(text.to_string());
        }

        let arguments = self.read_value_arguments(arguments, source);
        if is_array_factory(callee) {
            return RawValue::Array(arguments.into_iter().map(|a| a.value).collect());
        }

        RawValue::Annotation(RawAnnotation {
            name: callee.to_string(),
            target: None,
            arguments,
        })
    }

    /// Keyword modifiers (`private`, `lateinit`, `enum`, ...), without annotations
    fn extract_modifiers(&self, node: Node, source: &str) -> Vec<String> {
        match child_of_kind(node, "modifiers") {
            Some(modifiers) => self.keyword_modifiers(modifiers, source),
            None => Vec::new(),
        }
    }

    fn keyword_modifiers(&self, modifiers: Node, source: &str) -> Vec<String> {
        let mut cursor = modifiers.walk();
        modifiers
            .children(&mut cursor)
            .filter(|m| m.kind() != "annotation")
            .map(|m| node_text(m, source).trim().to_string())
            .filter(|text| !text.is_empty() && !text.starts_with('@'))
            .collect()
    }

    /// `val` or `var` on a property or constructor parameter
    fn binding_keyword(&self, node: Node, source: &str) -> Option<String> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find_map(|child| match child.kind() {
            "val" | "var" => Some(child.kind().to_string()),
            "binding_pattern_kind" => Some(node_text(child, source).trim().to_string()),
            _ => None,
        });
        found
    }

    fn determine_class_kind(&self, node: Node, source: &str) -> DeclarationKind {
        if child_of_kind(node, "interface").is_some() {
            return DeclarationKind::Interface;
        }
        let modifiers = self.extract_modifiers(node, source);
        for (keyword, kind) in CLASS_KIND_MODIFIERS {
            if modifiers.iter().any(|m| m == keyword) {
                return *kind;
            }
        }
        DeclarationKind::Class
    }

    fn get_type_name(&self, node: Node, source: &str) -> Result<String> {
        if let Some(name_node) = node.child_by_field_name("name") {
            return Ok(node_text(name_node, source).to_string());
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "type_identifier" | "simple_identifier" => {
                    return Ok(node_text(child, source).to_string());
                }
                _ => {}
            }
        }

        Err(miette::miette!("Could not find type name in node: {}", node.kind()))
    }

    /// Function name, skipping the receiver of extension functions
    fn extract_function_name(&self, node: Node, source: &str) -> String {
        if let Some(name_node) = node.child_by_field_name("name") {
            return node_text(name_node, source).to_string();
        }

        let mut cursor = node.walk();
        let mut found_fun = false;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "fun" => found_fun = true,
                "simple_identifier" if found_fun => {
                    return node_text(child, source).to_string();
                }
                _ => {}
            }
        }

        "<anonymous>".to_string()
    }

    fn nested_fqn(&self, ctx: &FileContext, parent: Option<&Declaration>, name: &str) -> String {
        match parent.and_then(|p| p.fully_qualified_name.as_ref()) {
            Some(outer) => format!("{}.{}", outer, name),
            None => build_fqn(&ctx.package, name),
        }
    }
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "multiline_comment")
}

impl Parser for KotlinParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_kotlin::language())
            .into_diagnostic()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Kotlin file"))?;

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
                Language::Kotlin,
                &self.resolution,
            ),
        };

        self.extract_declarations(&ctx, root, &mut result)?;

        debug!(
            "Parsed {}: {} declarations, {} annotations",
            path.display(),
            result.declarations.len(),
            result.annotation_count()
        );

        Ok(result)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}
