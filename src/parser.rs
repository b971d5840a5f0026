use crate::error::{Error, Result};
use log::debug;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

/// The TypeScript grammar every route file is parsed with.
pub fn typescript() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

/// Syntax parser for route handler sources.
///
/// `SourceParser` wraps a tree-sitter parser loaded with the TypeScript grammar. A parser
/// instance is cheap but not shareable between threads, so every parse task creates its own.
///
/// # Example
///
/// ```no_run
/// use route_manifest::parser::SourceParser;
///
/// let mut parser = SourceParser::new().unwrap();
/// let parsed = parser.parse("./api/v1/product/get.ts", b"export default createRoute({})").unwrap();
/// println!("{}", parsed.root().to_sexp());
/// ```
pub struct SourceParser {
    parser: Parser,
}

/// A successfully parsed source file together with the text its tree points into.
pub struct ParsedSource<'src> {
    /// Logical path of the source file
    pub path: String,
    /// UTF-8 source text
    pub source: &'src str,
    /// The error-free syntax tree
    pub tree: Tree,
}

impl<'src> ParsedSource<'src> {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

impl SourceParser {
    /// Creates a parser loaded with the TypeScript grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar is incompatible with the linked tree-sitter runtime.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&typescript())?;
        Ok(Self { parser })
    }

    /// Parses `content` into a syntax tree.
    ///
    /// # Arguments
    ///
    /// * `path` - Logical path of the file, used in error messages
    /// * `content` - Raw file content
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseError` if:
    /// - The content is not valid UTF-8
    /// - The tree contains syntax errors (the first one is reported as `line:column`)
    pub fn parse<'src>(&mut self, path: &str, content: &'src [u8]) -> Result<ParsedSource<'src>> {
        debug!("Parsing file: {}", path);

        let source = std::str::from_utf8(content).map_err(|e| Error::ParseError {
            path: path.to_string(),
            message: format!("content is not valid UTF-8: {}", e),
        })?;

        let tree = self.parser.parse(source, None).ok_or_else(|| Error::ParseError {
            path: path.to_string(),
            message: "parser produced no tree".to_string(),
        })?;

        if let Some(node) = first_error(tree.root_node()) {
            let at = node.start_position();
            return Err(Error::ParseError {
                path: path.to_string(),
                message: format!("syntax error at {}:{}", at.row + 1, at.column + 1),
            });
        }

        Ok(ParsedSource {
            path: path.to_string(),
            source,
            tree,
        })
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/// One captured node of a structural query match.
#[derive(Debug, Clone, Copy)]
pub struct Capture<'q, 'tree> {
    /// Capture name from the pattern, without the `@`
    pub name: &'q str,
    /// Grammar node type
    pub kind: &'static str,
    /// Verbatim source text of the node
    pub text: &'tree str,
    pub node: Node<'tree>,
}

/// A declarative tree-sitter pattern compiled once against the TypeScript grammar.
///
/// Queries are immutable after compilation and can be shared across parse tasks.
pub struct StructuralQuery {
    query: Query,
}

impl StructuralQuery {
    pub fn new(pattern: &str) -> Result<Self> {
        let query = Query::new(&typescript(), pattern)?;
        Ok(Self { query })
    }

    /// Runs the pattern over the subtree rooted at `node`.
    ///
    /// Returns one capture list per match, in document order. Text predicates such as `#eq?`
    /// are already applied.
    pub fn matches<'q, 'tree>(
        &'q self,
        node: Node<'tree>,
        source: &'tree str,
    ) -> Vec<Vec<Capture<'q, 'tree>>> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, node, source.as_bytes());

        let mut results = Vec::new();
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|c| Capture {
                    name: names[c.index as usize],
                    kind: c.node.kind(),
                    text: c.node.utf8_text(source.as_bytes()).unwrap_or(""),
                    node: c.node,
                })
                .collect();
            results.push(captures);
        }
        results
    }
}
