//! Route records produced by the extractor and consumed by the manifest builder.
//!
//! Every parse task owns its `Route`, including the identifier set and import map attached to
//! it, so none of these types need synchronisation. The builder is the only place where
//! routes from different files meet.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Content type advertised for every route.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP methods recognised from a route file's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
    ];

    /// Upper-case name used in the generated descriptor.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lower-case name as it appears in file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
        }
    }

    /// Derives the method from the literal suffix `<method>.<extension>` of a path.
    ///
    /// Only the end of the path is inspected, so `product/get.ts` and `product/forget.ts`
    /// both resolve to GET.
    pub fn from_path(path: &str, extension: &str) -> Option<HttpMethod> {
        let stem = path.strip_suffix(extension)?.strip_suffix('.')?;
        HttpMethod::ALL
            .into_iter()
            .find(|method| stem.ends_with(method.file_stem()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation schema sections of a route.
///
/// Each field holds the verbatim source text of the expression, or is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSchema {
    pub body: String,
    pub params: String,
    pub headers: String,
    pub query: String,
}

impl RouteSchema {
    /// Non-empty sections in rendering order.
    pub fn sections(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("body", self.body.as_str()),
            ("params", self.params.as_str()),
            ("headers", self.headers.as_str()),
            ("query", self.query.as_str()),
        ]
        .into_iter()
        .filter(|(_, expr)| !expr.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.sections().next().is_none()
    }
}

/// Identifier tokens referenced by a route's configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers(BTreeSet<String>);

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.0.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Imported name -> resolved module path, for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports(HashMap<String, String>);

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding; a later import of the same name replaces the earlier one.
    pub fn add(&mut self, id: impl Into<String>, path: impl Into<String>) {
        self.0.insert(id.into(), path.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the manifest needs to know about one route file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub content_type: &'static str,
    pub is_admin: bool,
    pub auth: bool,
    pub schema: RouteSchema,
    /// Logical path of the source file
    pub path: String,
    pub identifiers: Identifiers,
    pub imports: Imports,
}

impl Route {
    /// A route with no auth, no roles and no schema sections.
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            method,
            content_type: CONTENT_TYPE_JSON,
            is_admin: false,
            auth: false,
            schema: RouteSchema::default(),
            path: path.into(),
            identifiers: Identifiers::new(),
            imports: Imports::new(),
        }
    }

    /// `(identifier, module path)` pairs that have to be imported by the manifest.
    pub fn hoisted_imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.identifiers
            .iter()
            .filter_map(|id| self.imports.get(id).map(|path| (id, path)))
    }
}
