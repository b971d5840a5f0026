//! Interpretation of the object literal passed to the route-construction call.

use crate::parser::StructuralQuery;
use crate::route::Route;
use log::debug;
use tree_sitter::Node;

/// Applies one `key: value` pair of the route configuration object to `route`.
///
/// Unknown keys are ignored. `identifiers` is the identifier sub-query; every identifier found
/// in `roles` or a schema section is recorded so its import can be hoisted later.
pub fn apply_pair(route: &mut Route, pair: Node<'_>, source: &str, identifiers: &StructuralQuery) {
    let (Some(key), Some(value)) = (
        pair.child_by_field_name("key"),
        pair.child_by_field_name("value"),
    ) else {
        return;
    };

    let key = property_name(node_text(key, source));
    let value_text = node_text(value, source);

    match key {
        "auth" => route.auth = is_true_literal(value),
        "roles" => {
            collect_identifiers(route, value, source, identifiers);
            route.is_admin = grants_admin(value, source);
        }
        "headers" => {
            collect_identifiers(route, value, source, identifiers);
            route.schema.headers = value_text.to_string();
        }
        "params" => {
            collect_identifiers(route, value, source, identifiers);
            route.schema.params = value_text.to_string();
        }
        "query" => {
            collect_identifiers(route, value, source, identifiers);
            route.schema.query = value_text.to_string();
        }
        "body" => {
            collect_identifiers(route, value, source, identifiers);
            route.schema.body = value_text.to_string();
        }
        other => debug!("{}: ignoring route option `{}`", route.path, other),
    }
}

/// Adds every identifier token under `node` to the route.
pub fn collect_identifiers(
    route: &mut Route,
    node: Node<'_>,
    source: &str,
    identifiers: &StructuralQuery,
) {
    for captures in identifiers.matches(node, source) {
        for capture in captures {
            route.identifiers.add(capture.text);
        }
    }
}

/// `auth: true`, with the literal recognised by node type rather than by text.
fn is_true_literal(value: Node<'_>) -> bool {
    value.kind() == "true"
}

/// `roles: [..., Role.Admin, ...]` in any order or formatting.
fn grants_admin(value: Node<'_>, source: &str) -> bool {
    if value.kind() != "array" {
        return false;
    }
    let mut cursor = value.walk();
    let found = value
        .named_children(&mut cursor)
        .any(|element| is_member(element, source, "Role", "Admin"));
    found
}

fn is_member(node: Node<'_>, source: &str, object: &str, property: &str) -> bool {
    if node.kind() != "member_expression" {
        return false;
    }
    match (
        node.child_by_field_name("object"),
        node.child_by_field_name("property"),
    ) {
        (Some(o), Some(p)) => node_text(o, source) == object && node_text(p, source) == property,
        _ => false,
    }
}

/// Key text with string-literal quotes removed (`"auth"` and `auth` are the same key).
fn property_name(raw: &str) -> &str {
    raw.trim_matches(|c| c == '"' || c == '\'')
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}
