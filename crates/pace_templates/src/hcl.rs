//! HCL formatting of built module inputs.

use std::collections::BTreeMap;

use pace_spec::{InputMap, InputValue, Value};

use crate::error::{TemplateError, TemplateResult};

const INDENT: &str = "  ";

/// Inputs arranged by dotted path.
enum Node<'a> {
    Leaf(&'a InputValue),
    Branch(BTreeMap<&'a str, Node<'a>>),
}

/// Render inputs as HCL arguments, one per line, indented by `depth` levels.
///
/// Dotted keys become nested object literals, so `versioning.enabled = true`
/// is emitted as `versioning = { enabled = true }`.
pub fn render_arguments(inputs: &InputMap, depth: usize) -> TemplateResult<String> {
    let tree = build_tree(inputs)?;
    let mut out = String::new();
    write_nodes(&mut out, &tree, depth);
    Ok(out)
}

fn build_tree(inputs: &InputMap) -> TemplateResult<BTreeMap<&str, Node<'_>>> {
    let mut root: BTreeMap<&str, Node<'_>> = BTreeMap::new();

    for (key, value) in inputs {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut level = &mut root;
        for (i, segment) in parents.iter().enumerate() {
            let node = level
                .entry(*segment)
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            level = match node {
                Node::Branch(children) => children,
                Node::Leaf(_) => {
                    return Err(TemplateError::Conflict {
                        key: segments[..=i].join("."),
                        nested: key.clone(),
                    })
                }
            };
        }

        if level.contains_key(last) {
            return Err(TemplateError::Conflict {
                key: key.clone(),
                nested: format!("{}.*", key),
            });
        }
        level.insert(*last, Node::Leaf(value));
    }

    Ok(root)
}

fn write_nodes(out: &mut String, nodes: &BTreeMap<&str, Node<'_>>, depth: usize) {
    let pad = INDENT.repeat(depth);
    for (key, node) in nodes {
        match node {
            Node::Leaf(value) => {
                out.push_str(&format!("{}{} = {}\n", pad, format_key(key), expression(value, depth)));
            }
            Node::Branch(children) => {
                out.push_str(&format!("{}{} = {{\n", pad, format_key(key)));
                write_nodes(out, children, depth + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
        }
    }
}

fn expression(value: &InputValue, depth: usize) -> String {
    match value {
        InputValue::Reference(address) => address.clone(),
        InputValue::Literal(literal) => format_value(literal, depth),
    }
}

/// Format a literal as an HCL expression.
pub fn format_value(value: &Value, depth: usize) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => v.to_string(),
        Value::Float(v) => quote(&v.to_string()),
        Value::String(s) => quote(s),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(|item| format_value(item, depth)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Map(entries) if entries.is_empty() => "{}".to_string(),
        Value::Map(entries) => {
            let pad = INDENT.repeat(depth);
            let inner = INDENT.repeat(depth + 1);
            let mut out = String::from("{\n");
            for (key, item) in entries {
                out.push_str(&format!(
                    "{}{} = {}\n",
                    inner,
                    format_key(key),
                    format_value(item, depth + 1)
                ));
            }
            out.push_str(&pad);
            out.push('}');
            out
        }
    }
}

/// Quote and escape a string literal, disabling template interpolation.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

/// Escape a string for use inside HCL double quotes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    };
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}
