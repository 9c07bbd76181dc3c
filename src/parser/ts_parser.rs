use tree_sitter::{Node, Parser};

use crate::error::{Error, Result};
use crate::parser::expr::Expr;

/// A top-level `const`/`let`/`var` declaration with an initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Declared variable name.
    pub name: String,
    /// Lowered initializer expression.
    pub init: Expr,
}

/// Top-level declarations of one source file, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Name of the file the module was parsed from.
    pub file_name: String,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// Parse TypeScript source into its top-level declarations.
///
/// Any syntax error fails the whole file: tree-sitter recovers from errors,
/// but a recovered tree would silently drop columns or relations.
pub fn parse_module(file_name: &str, source: &str) -> Result<Module> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?;

    let tree = parser.parse(source, None).ok_or_else(|| Error::Parse {
        file: file_name.to_string(),
        line: 1,
        column: 1,
        snippet: String::new(),
    })?;

    let root = tree.root_node();
    let src = source.as_bytes();

    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let position = bad.start_position();
        return Err(Error::Parse {
            file: file_name.to_string(),
            line: position.row + 1,
            column: position.column + 1,
            snippet: text(bad, src).chars().take(40).collect(),
        });
    }

    let mut declarations = Vec::new();
    for statement in named_children(root) {
        collect_declarations(statement, src, &mut declarations);
    }

    Ok(Module {
        file_name: file_name.to_string(),
        declarations,
    })
}

/// Parse a single expression, mostly useful in tests.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let module = parse_module("<expr>", &format!("const __expr = {source};"))?;
    Ok(module
        .declarations
        .into_iter()
        .next()
        .map_or(Expr::Other("empty".to_string()), |d| d.init))
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn text<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or_default()
}

fn collect_declarations(node: Node<'_>, src: &[u8], out: &mut Vec<Declaration>) {
    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                collect_declarations(declaration, src, out);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            for declarator in named_children(node) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name) = declarator.child_by_field_name("name") else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                let Some(value) = declarator.child_by_field_name("value") else {
                    continue;
                };
                out.push(Declaration {
                    name: text(name, src).to_string(),
                    init: lower(value, src),
                });
            }
        }
        _ => {}
    }
}

fn lower(node: Node<'_>, src: &[u8]) -> Expr {
    match node.kind() {
        "string" => Expr::Str(unescape(strip_delimiters(text(node, src)))),
        "number" => parse_number(text(node, src))
            .map_or_else(|| Expr::Other("number".to_string()), Expr::Number),
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "null" | "undefined" => Expr::Null,
        "identifier" | "property_identifier" | "shorthand_property_identifier" => {
            Expr::Ident(text(node, src).to_string())
        }
        "template_string" => Expr::Template(strip_delimiters(text(node, src)).to_string()),
        "array" => Expr::Array(
            named_children(node)
                .into_iter()
                .map(|child| lower(child, src))
                .collect(),
        ),
        "object" => Expr::Object(lower_object(node, src)),
        "parenthesized_expression" => match named_children(node).first() {
            Some(inner) => Expr::Paren(Box::new(lower(*inner, src))),
            None => Expr::Other("parenthesized_expression".to_string()),
        },
        "call_expression" => lower_call(node, src),
        "member_expression" => {
            let (Some(object), Some(property)) = (
                node.child_by_field_name("object"),
                node.child_by_field_name("property"),
            ) else {
                return Expr::Other("member_expression".to_string());
            };
            Expr::Member {
                object: Box::new(lower(object, src)),
                property: text(property, src).to_string(),
            }
        }
        "arrow_function" => lower_arrow(node, src),
        "unary_expression" => {
            let operator = node
                .child_by_field_name("operator")
                .map(|op| text(op, src))
                .unwrap_or_default();
            let argument = node.child_by_field_name("argument").map(|arg| lower(arg, src));
            match (operator, argument) {
                ("-", Some(Expr::Number(value))) => Expr::Number(-value),
                ("+", Some(Expr::Number(value))) => Expr::Number(value),
                _ => Expr::Other("unary_expression".to_string()),
            }
        }
        "as_expression" | "satisfies_expression" | "non_null_expression" => {
            match named_children(node).first() {
                Some(inner) => lower(*inner, src),
                None => Expr::Other(node.kind().to_string()),
            }
        }
        other => Expr::Other(other.to_string()),
    }
}

fn lower_call(node: Node<'_>, src: &[u8]) -> Expr {
    let (Some(function), Some(arguments)) = (
        node.child_by_field_name("function"),
        node.child_by_field_name("arguments"),
    ) else {
        return Expr::Other("call_expression".to_string());
    };

    if arguments.kind() == "template_string" {
        return Expr::TaggedTemplate {
            tag: text(function, src).to_string(),
            text: strip_delimiters(text(arguments, src)).to_string(),
        };
    }

    Expr::Call {
        callee: Box::new(lower(function, src)),
        args: named_children(arguments)
            .into_iter()
            .map(|arg| lower(arg, src))
            .collect(),
    }
}

fn lower_object(node: Node<'_>, src: &[u8]) -> Vec<(String, Expr)> {
    let mut entries = Vec::new();
    for child in named_children(node) {
        match child.kind() {
            "pair" => {
                let (Some(key), Some(value)) = (
                    child.child_by_field_name("key"),
                    child.child_by_field_name("value"),
                ) else {
                    continue;
                };
                let key = match key.kind() {
                    "string" => unescape(strip_delimiters(text(key, src))),
                    _ => text(key, src).to_string(),
                };
                entries.push((key, lower(value, src)));
            }
            "shorthand_property_identifier" => {
                let name = text(child, src).to_string();
                entries.push((name.clone(), Expr::Ident(name)));
            }
            _ => {}
        }
    }
    entries
}

fn lower_arrow(node: Node<'_>, src: &[u8]) -> Expr {
    let params = if let Some(single) = node.child_by_field_name("parameter") {
        vec![text(single, src).to_string()]
    } else if let Some(list) = node.child_by_field_name("parameters") {
        named_children(list)
            .into_iter()
            .map(|param| {
                let pattern = match param.kind() {
                    "required_parameter" | "optional_parameter" => {
                        param.child_by_field_name("pattern").unwrap_or(param)
                    }
                    _ => param,
                };
                text(pattern, src).to_string()
            })
            .collect()
    } else {
        Vec::new()
    };

    let body = match node.child_by_field_name("body") {
        Some(body) if body.kind() == "statement_block" => named_children(body)
            .into_iter()
            .find(|statement| statement.kind() == "return_statement")
            .and_then(|ret| named_children(ret).into_iter().next())
            .map_or_else(|| Expr::Other("statement_block".to_string()), |e| lower(e, src)),
        Some(body) => lower(body, src),
        None => Expr::Other("arrow_function".to_string()),
    };

    Expr::Arrow {
        params,
        body: Box::new(body),
    }
}

fn strip_delimiters(raw: &str) -> &str {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            &raw[1..raw.len() - 1]
        }
        _ => raw,
    }
}

fn unescape(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let Some(&escape) = chars.get(i + 1) else {
            out.push('\\');
            break;
        };
        i += 2;
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' | 'u' => match decode_code_point(&chars, i, escape) {
                Some((ch, next)) => {
                    out.push(ch);
                    i = next;
                }
                // Malformed escapes are kept verbatim.
                None => {
                    out.push('\\');
                    out.push(escape);
                }
            },
            other => out.push(other),
        }
    }
    out
}

/// Decode the payload of a `\xHH`, `\uXXXX` or `\u{X...}` escape starting at
/// `start`, returning the character and the index just past the escape.
/// Surrogate pairs written as two `\uXXXX` escapes are combined.
fn decode_code_point(chars: &[char], start: usize, kind: char) -> Option<(char, usize)> {
    let hex = |from: usize, len: usize| -> Option<u32> {
        let digits: String = chars.get(from..from + len)?.iter().collect();
        if digits.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(&digits, 16).ok()
        } else {
            None
        }
    };

    match kind {
        'x' => Some((char::from_u32(hex(start, 2)?)?, start + 2)),
        _ if chars.get(start) == Some(&'{') => {
            let close = start + 1 + chars[start + 1..].iter().position(|&c| c == '}')?;
            let len = close - start - 1;
            if len == 0 || len > 6 {
                return None;
            }
            Some((char::from_u32(hex(start + 1, len)?)?, close + 1))
        }
        _ => {
            let unit = hex(start, 4)?;
            if (0xD800..0xDC00).contains(&unit)
                && chars.get(start + 4) == Some(&'\\')
                && chars.get(start + 5) == Some(&'u')
            {
                if let Some(low) = hex(start + 6, 4).filter(|low| (0xDC00..0xE000).contains(low)) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return Some((char::from_u32(combined)?, start + 10));
                }
            }
            Some((char::from_u32(unit)?, start + 4))
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches('n');
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(octal) = lower.strip_prefix("0o") {
        return i64::from_str_radix(octal, 8).ok().map(|v| v as f64);
    }
    if let Some(binary) = lower.strip_prefix("0b") {
        return i64::from_str_radix(binary, 2).ok().map(|v| v as f64);
    }
    lower.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_module_collects_exported_and_local_declarations() {
        let module = parse_module(
            "schema.ts",
            r#"
            import { pgTable, text } from "drizzle-orm/pg-core";
            // a comment between statements
            export const users = pgTable("users", { name: text("name") });
            const local = 1, other = "x";
            function ignored() {}
            "#,
        )
        .expect("valid TypeScript should parse");

        let names: Vec<&str> = module.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["users", "local", "other"]);
        assert_eq!(module.declarations[1].init, Expr::Number(1.0));
    }

    #[test]
    fn parse_module_reports_first_syntax_error_position() {
        let err = parse_module("broken.ts", "export const users = pgTable(\"users\", {\n  id: ,\n});")
            .expect_err("malformed source should fail");
        match err {
            Error::Parse { file, line, column, .. } => {
                assert_eq!(file, "broken.ts");
                assert!((1..=3).contains(&line), "unexpected error line {line}");
                assert!(column >= 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn lowers_literals_and_typescript_wrappers() {
        assert_eq!(parse_expression("'it\\'s'").unwrap(), Expr::Str("it's".to_string()));
        assert_eq!(parse_expression("-42").unwrap(), Expr::Number(-42.0));
        assert_eq!(parse_expression("1_000").unwrap(), Expr::Number(1000.0));
        assert_eq!(parse_expression("true as boolean").unwrap(), Expr::Bool(true));
        assert_eq!(parse_expression("null").unwrap(), Expr::Null);
    }

    #[test]
    fn decodes_hex_and_unicode_escapes() {
        assert_eq!(
            parse_expression(r#""caf\u00e9""#).unwrap(),
            Expr::Str("café".to_string())
        );
        assert_eq!(
            parse_expression(r#""\x41\u{1F600}\uD83D\uDE00""#).unwrap(),
            Expr::Str("A\u{1F600}\u{1F600}".to_string())
        );
        assert_eq!(unescape(r"bad\u12"), r"bad\u12");
    }

    #[test]
    fn lowers_tagged_templates_separately_from_calls() {
        let expr = parse_expression("sql`CURRENT_TIMESTAMP`").unwrap();
        assert_eq!(
            expr,
            Expr::TaggedTemplate {
                tag: "sql".to_string(),
                text: "CURRENT_TIMESTAMP".to_string(),
            }
        );
    }

    #[test]
    fn lowers_objects_arrays_and_arrows() {
        let expr = parse_expression("(t) => ({ pk: primaryKey({ columns: [t.a, t.b] }), name })")
            .unwrap();
        let (params, body) = expr.as_arrow().expect("arrow function");
        assert_eq!(params, ["t".to_string()]);

        let entries = body.as_object().expect("object body");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "pk");
        assert_eq!(entries[1], ("name".to_string(), Expr::Ident("name".to_string())));
    }

    #[test]
    fn lowers_block_bodied_arrows_to_their_return_value() {
        let expr = parse_expression("() => { return users.id; }").unwrap();
        let (params, body) = expr.as_arrow().expect("arrow function");
        assert!(params.is_empty());
        assert_eq!(body.member_root(), Some("users"));
        assert_eq!(body.member_property(), Some("id"));
    }
}
