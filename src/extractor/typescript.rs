use super::config_object::apply_pair;
use super::RouteExtractor;
use crate::error::{Error, Result};
use crate::parser::{ParsedSource, SourceParser, StructuralQuery};
use crate::resolver::resolve;
use crate::route::{HttpMethod, Route};
use crate::scanner::SourceFile;
use log::debug;

/// `import { A, B } from "source"`: one match per named binding.
const NAMED_IMPORTS_QUERY: &str = r#"
(import_statement
  (import_clause
    (named_imports
      (import_specifier
        name: (identifier) @identifier)))
  source: (string
    (string_fragment) @path))
"#;

const IDENTIFIERS_QUERY: &str = "(identifier) @identifier";

/// `export default <function>({ key: value, ... })`: one match per pair.
fn route_call_query(function: &str) -> String {
    format!(
        r#"
(export_statement
  value: (call_expression
    function: (identifier) @function (#eq? @function "{}")
    arguments: (arguments
      (object
        (pair) @pair))) @call)
"#,
        function
    )
}

/// Extractor for TypeScript route handlers declared with a route-construction call.
///
/// The three queries are compiled once and shared by every parse task; each call to
/// [`RouteExtractor::extract`] creates its own tree-sitter parser.
pub struct TypeScriptExtractor {
    extension: String,
    imports: StructuralQuery,
    route_call: StructuralQuery,
    identifiers: StructuralQuery,
}

impl TypeScriptExtractor {
    /// # Arguments
    ///
    /// * `route_function` - Name of the exported route-construction function
    /// * `extension` - Source file extension, without the dot
    ///
    /// # Errors
    ///
    /// Returns `Error::QueryError` if a query does not compile, e.g. because
    /// `route_function` contains characters that break the pattern.
    pub fn new(route_function: &str, extension: &str) -> Result<Self> {
        Ok(Self {
            extension: extension.to_string(),
            imports: StructuralQuery::new(NAMED_IMPORTS_QUERY)?,
            route_call: StructuralQuery::new(&route_call_query(route_function))?,
            identifiers: StructuralQuery::new(IDENTIFIERS_QUERY)?,
        })
    }

    fn collect_imports(&self, parsed: &ParsedSource<'_>, route: &mut Route) {
        for captures in self.imports.matches(parsed.root(), parsed.source) {
            let identifier = captures.iter().find(|c| c.name == "identifier");
            let path = captures.iter().find(|c| c.name == "path");
            if let (Some(identifier), Some(path)) = (identifier, path) {
                route
                    .imports
                    .add(identifier.text, resolve(path.text, &parsed.path));
            }
        }
    }

    /// Applies the pairs of the first exported route call; later calls are ignored.
    fn apply_route_call(&self, parsed: &ParsedSource<'_>, route: &mut Route) {
        let mut first_call = None;

        for captures in self.route_call.matches(parsed.root(), parsed.source) {
            let Some(call) = captures.iter().find(|c| c.name == "call") else {
                continue;
            };
            if *first_call.get_or_insert(call.node.id()) != call.node.id() {
                continue;
            }
            for pair in captures.iter().filter(|c| c.name == "pair") {
                apply_pair(route, pair.node, parsed.source, &self.identifiers);
            }
        }

        if first_call.is_none() {
            debug!("{}: no route call found, using defaults", parsed.path);
        }
    }
}

impl RouteExtractor for TypeScriptExtractor {
    fn extract(&self, file: &SourceFile) -> Result<Route> {
        let method = HttpMethod::from_path(&file.path, &self.extension).ok_or_else(|| {
            Error::UnrecognizedMethod {
                path: file.path.clone(),
            }
        })?;

        let mut parser = SourceParser::new()?;
        let parsed = parser.parse(&file.path, &file.content)?;

        let mut route = Route::new(file.path.clone(), method);
        self.collect_imports(&parsed, &mut route);
        self.apply_route_call(&parsed, &mut route);

        debug!(
            "Extracted {} {} ({} imports, {} identifiers)",
            route.method,
            route.path,
            route.imports.len(),
            route.identifiers.len()
        );
        Ok(route)
    }
}
