//! Assembles the generated manifest module from extracted routes.
//!
//! The builder is the single consumer of parsed routes. It derives each route's key and URL
//! from its logical path, renders one descriptor per route and hoists the imports the schema
//! expressions depend on.

use crate::route::{HttpMethod, Route};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap, HashSet};

const HEADER: &str = "// THIS IS GENERATED FILE\n// DO NOT EDIT\n\n";

/// Methods whose file-name segment is folded into the route key. PATCH and OPTIONS handlers
/// keep theirs as an ordinary path segment.
const KEYED_METHODS: [HttpMethod; 4] = [
    HttpMethod::Get,
    HttpMethod::Delete,
    HttpMethod::Put,
    HttpMethod::Post,
];

/// Manifest document builder
pub struct ManifestBuilder {
    extension: String,
    api_prefix: String,
    preserve_order: bool,
    /// Rendered `(key, descriptor)` entries in arrival order
    entries: Vec<(String, String)>,
    keys: HashSet<String>,
    /// `(module path, identifier)`, ordered for output
    imports: BTreeSet<(String, String)>,
    /// Identifier -> first module path it was hoisted from
    hoisted_from: HashMap<String, String>,
}

impl ManifestBuilder {
    /// # Arguments
    ///
    /// * `extension` - Source file extension stripped from logical paths, without the dot
    /// * `api_prefix` - Segment removed once from the front of every key
    pub fn new(extension: impl Into<String>, api_prefix: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            api_prefix: api_prefix.into(),
            preserve_order: false,
            entries: Vec::new(),
            keys: HashSet::new(),
            imports: BTreeSet::new(),
            hoisted_from: HashMap::new(),
        }
    }

    /// Keep routes in the order they were added instead of sorting them by key.
    pub fn preserve_order(mut self, preserve: bool) -> Self {
        self.preserve_order = preserve;
        self
    }

    /// Number of routes in the manifest so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a route and the imports its schema expressions reference.
    ///
    /// Returns `false` if another route already produced the same key; the first one wins.
    pub fn add_route(&mut self, route: &Route) -> bool {
        let key = manifest_key(&route.path, &self.extension, &self.api_prefix);
        if !self.keys.insert(key.clone()) {
            warn!("Duplicate route key {:?} from {}, keeping the first", key, route.path);
            return false;
        }

        for (identifier, path) in route.hoisted_imports() {
            match self.hoisted_from.get(identifier) {
                Some(existing) if existing != path => warn!(
                    "{} is imported from both {:?} and {:?}",
                    identifier, existing, path
                ),
                Some(_) => {}
                None => {
                    self.hoisted_from
                        .insert(identifier.to_string(), path.to_string());
                }
            }
            self.imports.insert((path.to_string(), identifier.to_string()));
        }

        debug!("Adding route {:?}: {} {}", key, route.method, route.path);
        let descriptor = render_descriptor(route, &self.extension);
        self.entries.push((key, descriptor));
        true
    }

    /// Renders the complete manifest document.
    pub fn build(mut self) -> String {
        if !self.preserve_order {
            self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut doc = String::from(HEADER);
        for (path, identifier) in &self.imports {
            doc.push_str(&format!("import {{ {} }} from {}\n", identifier, js_string(path)));
        }
        doc.push('\n');

        if self.entries.is_empty() {
            doc.push_str("export default {}\n");
            return doc;
        }

        doc.push_str("export default {\n");
        for (key, descriptor) in &self.entries {
            doc.push_str(&format!("  {}: {},\n", js_string(key), descriptor));
        }
        doc.push_str("}\n");
        doc
    }
}

/// Logical path without `./`, without the extension and with a trailing `/get`, `/delete`,
/// `/put` or `/post` segment collapsed into `.<method>`.
///
/// `./api/v1/product/get.ts` becomes `api/v1/product.get`, `./api/v1/product/patch.ts` stays
/// `api/v1/product/patch`.
pub fn normalized_path(path: &str, extension: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path
        .strip_suffix(extension)
        .and_then(|p| p.strip_suffix('.'))
        .unwrap_or(path);

    for method in KEYED_METHODS {
        let collapsed = path
            .strip_suffix(method.file_stem())
            .and_then(|p| p.strip_suffix('/'))
            .filter(|base| !base.is_empty());
        if let Some(base) = collapsed {
            return format!("{}.{}", base, method.file_stem());
        }
    }
    path.to_string()
}

/// Key of a route in the manifest: the normalised path with `api_prefix` removed once from
/// the front.
pub fn manifest_key(path: &str, extension: &str, api_prefix: &str) -> String {
    let normalized = normalized_path(path, extension);
    match normalized.strip_prefix(api_prefix) {
        Some(rest) if !api_prefix.is_empty() => rest.to_string(),
        _ => normalized,
    }
}

/// URL of a route: the normalised path without its method suffix, dots turned into slashes.
pub fn route_url(path: &str, extension: &str) -> String {
    let normalized = normalized_path(path, extension);
    let base = KEYED_METHODS
        .into_iter()
        .find_map(|method| {
            normalized
                .strip_suffix(method.file_stem())
                .and_then(|p| p.strip_suffix('.'))
        })
        .unwrap_or(&normalized);
    base.replace('.', "/")
}

/// Renders the descriptor object literal of one route.
pub fn render_descriptor(route: &Route, extension: &str) -> String {
    let sections: String = route
        .schema
        .sections()
        .map(|(section, expr)| format!("{}: {},\n", section, expr))
        .collect();

    format!(
        "{{\n    method: {},\n    path: {},\n    url: {},\n    auth: {},\n    isAdmin: {},\n    schema: z.object({{\n{}}})\n  }}",
        js_string(route.method.as_str()),
        js_string(&route.path),
        js_string(&route_url(&route.path, extension)),
        route.auth,
        route.is_admin,
        sections
    )
}

/// Double-quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
