//! Declaration extraction over the tree-sitter Go grammar.

use tree_sitter::{Node, Parser};

use super::{DeclKind, FieldDecl, TypeDecl};

/// Declarations found in one file, before the package name is attached.
#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
    pub package: String,
    pub decls: Vec<TypeDecl>,
}

/// Why a file could not be parsed; `line` is 1-based when known.
#[derive(Debug)]
pub(crate) struct SyntaxError {
    pub line: Option<usize>,
    pub message: String,
}

pub(crate) fn parse_go(text: &str) -> Result<ParsedFile, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| SyntaxError {
            line: None,
            message: err.to_string(),
        })?;
    let tree = parser.parse(text, None).ok_or_else(|| SyntaxError {
        line: None,
        message: "parser returned no tree".to_owned(),
    })?;
    let root = tree.root_node();
    if let Some(broken) = first_error(root) {
        let message = if broken.is_missing() {
            format!("missing {}", broken.kind())
        } else {
            "invalid Go syntax".to_owned()
        };
        return Err(SyntaxError {
            line: Some(broken.start_position().row + 1),
            message,
        });
    }

    let mut file = ParsedFile::default();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" if file.package.is_empty() => {
                file.package = package_name(child, text);
            }
            "type_declaration" => collect_specs(child, text, &mut file.decls),
            _ => {}
        }
    }
    Ok(file)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(first_error)
}

fn text_of<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

fn package_name(clause: Node<'_>, source: &str) -> String {
    let mut cursor = clause.walk();
    clause
        .named_children(&mut cursor)
        .find(|child| child.kind() == "package_identifier")
        .map(|ident| text_of(ident, source).to_owned())
        .unwrap_or_default()
}

/// Ungrouped specs take the doc above `type`; grouped specs only their own.
fn collect_specs(decl: Node<'_>, source: &str, out: &mut Vec<TypeDecl>) {
    let mut cursor = decl.walk();
    let children: Vec<Node<'_>> = decl.children(&mut cursor).collect();
    let is_grouped = children.iter().any(|child| child.kind() == "(");
    let outer_doc = doc_comment(decl, source);
    for spec in children
        .into_iter()
        .filter(|child| matches!(child.kind(), "type_spec" | "type_alias"))
    {
        let doc = if is_grouped {
            doc_comment(spec, source)
        } else {
            outer_doc.clone()
        };
        if let Some(type_decl) = type_spec(spec, source, doc) {
            out.push(type_decl);
        }
    }
}

fn type_spec(spec: Node<'_>, source: &str, doc: String) -> Option<TypeDecl> {
    let name = text_of(spec.child_by_field_name("name")?, source).to_owned();
    let type_node = spec.child_by_field_name("type");
    let is_struct = spec.kind() == "type_spec"
        && type_node.is_some_and(|node| node.kind() == "struct_type");
    let (kind, fields) = match type_node {
        Some(node) if is_struct => (DeclKind::Struct, struct_fields(node, source)),
        _ => (DeclKind::Other, Vec::new()),
    };
    Some(TypeDecl {
        name,
        doc,
        kind,
        fields,
        ..TypeDecl::default()
    })
}

fn struct_fields(struct_type: Node<'_>, source: &str) -> Vec<FieldDecl> {
    let mut cursor = struct_type.walk();
    let Some(list) = struct_type
        .named_children(&mut cursor)
        .find(|child| child.kind() == "field_declaration_list")
    else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    let mut list_cursor = list.walk();
    for field in list
        .named_children(&mut list_cursor)
        .filter(|child| child.kind() == "field_declaration")
    {
        let tag = field
            .child_by_field_name("tag")
            .map(|literal| tag_text(literal, source))
            .unwrap_or_default();
        let mut name_cursor = field.walk();
        let names: Vec<String> = field
            .children_by_field_name("name", &mut name_cursor)
            .map(|ident| text_of(ident, source).to_owned())
            .collect();
        if names.is_empty() {
            if let Some(embedded) = field.child_by_field_name("type") {
                fields.push(FieldDecl {
                    name: embedded_name(text_of(embedded, source)),
                    tag,
                });
            }
        } else {
            fields.extend(names.into_iter().map(|name| FieldDecl {
                name,
                tag: tag.clone(),
            }));
        }
    }
    fields
}

/// `*pkg.Type[T]` is named `Type`.
fn embedded_name(type_text: &str) -> String {
    let bare = type_text.trim().trim_start_matches('*');
    let without_args = bare.split('[').next().unwrap_or(bare);
    without_args
        .rsplit('.')
        .next()
        .unwrap_or(without_args)
        .trim()
        .to_owned()
}

fn tag_text(literal: Node<'_>, source: &str) -> String {
    let raw = text_of(literal, source);
    match literal.kind() {
        "raw_string_literal" => raw.trim_matches('`').to_owned(),
        _ => raw
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(raw)
            .replace("\\\"", "\"")
            .replace("\\\\", "\\"),
    }
}

/// The comment group ending on the line directly above `node`.
///
/// A group that starts as a trailing comment on a code line belongs to that
/// line, not to the declaration below it.
fn doc_comment(node: Node<'_>, source: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_named_sibling();
    while let Some(comment) = current.filter(|sibling| sibling.kind() == "comment") {
        if comment.end_position().row + 1 < next_row {
            break;
        }
        let before = comment.prev_named_sibling();
        let is_trailing = before.is_some_and(|prev| {
            prev.kind() != "comment" && prev.end_position().row == comment.start_position().row
        });
        if is_trailing {
            lines.clear();
            break;
        }
        lines.extend(comment_lines(text_of(comment, source)).into_iter().rev());
        next_row = comment.start_position().row;
        current = before;
    }
    lines.reverse();
    lines.join("\n")
}

fn comment_lines(comment: &str) -> Vec<String> {
    if let Some(line) = comment.strip_prefix("//") {
        return vec![line.trim().to_owned()];
    }
    comment
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
