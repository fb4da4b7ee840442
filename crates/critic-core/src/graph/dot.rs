//! Dependency topology import from Graphviz DOT.
//!
//! # Overview
//!
//! The dependency graph is produced by `depgraph-maven-plugin`, which emits a
//! `digraph` whose node IDs are Maven coordinates and whose edges point from
//! a module to the modules it depends on:
//!
//! ```text
//! digraph "dhis" {
//!   node [shape="box",style="rounded",fontname="Helvetica",fontsize="14"]
//!   edge [fontsize="10",fontname="Helvetica"]
//!
//!   // Node Definitions:
//!   "org.hisp.dhis:dhis-api:jar"[label=<dhis-api>]
//!   "org.hisp.dhis:dhis-web:war"[label=<dhis-web>]
//!
//!   // Edge Definitions:
//!   "org.hisp.dhis:dhis-web:war" -> "org.hisp.dhis:dhis-api:jar"
//! }
//! ```
//!
//! Only the subset of DOT such files use is understood: node and edge
//! statements (including edge chains), attribute lists, default attribute
//! statements, `ID = ID` graph attributes and comments. Subgraphs and
//! undirected edges are rejected.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A **depends on** B". Edge weights default to `1.0`
//! and are only informational: the DAG builder replaces them with build
//! durations.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

use crate::error::CriticError;

const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// DependencyTopology
// ---------------------------------------------------------------------------

/// An imported dependency graph.
///
/// Nodes are labelled with the node ID from the DOT file (the module
/// coordinates). An edge `A → B` means "A depends on B". The graph is
/// guaranteed to be free of parallel edges, self-loops and cycles.
#[derive(Debug, Clone)]
pub struct DependencyTopology {
    /// Directed graph: nodes = coordinate labels, edges = dependencies.
    pub graph: DiGraph<String, f64>,
    /// Mapping from label to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Graph ID, when the DOT file names its graph.
    pub name: Option<String>,
}

impl DependencyTopology {
    /// Parse a DOT document.
    ///
    /// # Errors
    ///
    /// - [`CriticError::InvalidDot`] for syntax outside the supported subset.
    /// - [`CriticError::SelfLoop`] when a module depends on itself.
    /// - [`CriticError::CyclicDependencyGraph`] when the edges form a cycle.
    #[instrument(skip(input), fields(bytes = input.len()))]
    pub fn parse(input: &str) -> Result<Self, CriticError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser::new(tokens);
        let topology = parser.parse_graph()?;
        topology.ensure_acyclic()?;
        debug!(
            nodes = topology.node_count(),
            edges = topology.edge_count(),
            "imported dependency topology"
        );
        Ok(topology)
    }

    /// Build a topology from labels and `(dependent, dependency)` pairs.
    ///
    /// Labels mentioned only by edges are added in first-mention order.
    ///
    /// # Errors
    ///
    /// Same as [`DependencyTopology::parse`], minus syntax errors.
    pub fn from_edges(nodes: &[&str], edges: &[(&str, &str)]) -> Result<Self, CriticError> {
        let mut topology = Self::empty(None);
        for node in nodes {
            topology.ensure_node(node);
        }
        for (from, to) in edges {
            topology.add_dependency(from, to, DEFAULT_EDGE_WEIGHT)?;
        }
        topology.ensure_acyclic()?;
        Ok(topology)
    }

    fn empty(name: Option<String>) -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            name,
        }
    }

    /// Return the number of nodes (modules) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges (dependencies) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a label.
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(label).copied()
    }

    /// Return the label of a node.
    #[must_use]
    pub fn label(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.node_map.insert(label.to_string(), idx);
        idx
    }

    fn add_dependency(&mut self, from: &str, to: &str, weight: f64) -> Result<(), CriticError> {
        if from == to {
            return Err(CriticError::SelfLoop(from.to_string()));
        }
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        // No parallel edges: a repeated dependency keeps its first weight.
        if self.graph.contains_edge(a, b) {
            debug!(from, to, "ignoring duplicate dependency edge");
        } else {
            self.graph.add_edge(a, b, weight);
        }
        Ok(())
    }

    fn ensure_acyclic(&self) -> Result<(), CriticError> {
        toposort(&self.graph, None).map(|_| ()).map_err(|cycle| {
            let label = self.label(cycle.node_id()).unwrap_or_default();
            CriticError::CyclicDependencyGraph(label.to_string())
        })
    }
}

/// Read and parse a DOT file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_topology(path: &Path) -> Result<DependencyTopology> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    DependencyTopology::parse(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Unquoted identifier or numeral; may be a keyword.
    Bare(String),
    /// Quoted or HTML string; never a keyword.
    Quoted(String),
    Arrow,
    UndirectedEdge,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semicolon,
    Comma,
}

impl Token {
    fn id(&self) -> Option<&str> {
        match self {
            Self::Bare(s) | Self::Quoted(s) => Some(s),
            _ => None,
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Bare(s) if s.eq_ignore_ascii_case(keyword))
    }
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, reason: impl Into<String>) -> CriticError {
        CriticError::InvalidDot {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, CriticError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.chars.peek() {
            let line = self.line;
            let token = match c {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    self.skip_line();
                    continue;
                }
                '/' => {
                    self.bump();
                    match self.chars.peek().copied() {
                        Some('/') => self.skip_line(),
                        Some('*') => self.skip_block_comment()?,
                        _ => return Err(self.error("unexpected '/'")),
                    }
                    continue;
                }
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '=' => self.single(Token::Equals),
                ';' => self.single(Token::Semicolon),
                ',' => self.single(Token::Comma),
                '"' => Token::Quoted(self.quoted()?),
                '<' => Token::Quoted(self.html()?),
                '-' => self.dash()?,
                c if is_id_char(c) => Token::Bare(self.bare()),
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            };
            tokens.push((token, line));
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), CriticError> {
        self.bump(); // '*'
        let mut prev = '\0';
        while let Some(c) = self.bump() {
            if prev == '*' && c == '/' {
                return Ok(());
            }
            prev = c;
        }
        Err(self.error("unterminated comment"))
    }

    fn quoted(&mut self) -> Result<String, CriticError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\n') => {}
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated string"))
    }

    fn html(&mut self) -> Result<String, CriticError> {
        self.bump(); // opening '<'
        let mut depth = 1usize;
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }
        Err(self.error("unterminated HTML string"))
    }

    fn dash(&mut self) -> Result<Token, CriticError> {
        self.bump(); // '-'
        match self.chars.peek().copied() {
            Some('>') => Ok(self.single(Token::Arrow)),
            Some('-') => Ok(self.single(Token::UndirectedEdge)),
            Some(c) if c.is_ascii_digit() || c == '.' => {
                Ok(Token::Bare(format!("-{}", self.bare())))
            }
            _ => Err(self.error("unexpected '-'")),
        }
    }

    fn bare(&mut self) -> String {
        let mut value = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_id_char(c) {
                break;
            }
            value.push(c);
            self.bump();
        }
        value
    }
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    const fn new(tokens: Vec<(Token, usize)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn error(&self, reason: impl Into<String>) -> CriticError {
        CriticError::InvalidDot {
            line: self.line(),
            reason: reason.into(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), CriticError> {
        match self.peek() {
            Some(t) if t == expected => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    fn expect_id(&mut self, what: &str) -> Result<String, CriticError> {
        match self.peek().and_then(Token::id) {
            Some(id) => {
                let id = id.to_string();
                self.pos += 1;
                Ok(id)
            }
            None => Err(self.error(format!("expected {what}"))),
        }
    }

    fn parse_graph(&mut self) -> Result<DependencyTopology, CriticError> {
        if self.peek().is_some_and(|t| t.is_keyword("strict")) {
            self.pos += 1;
        }
        match self.next() {
            Some(t) if t.is_keyword("digraph") => {}
            Some(t) if t.is_keyword("graph") => {
                return Err(self.error("undirected graphs are not supported"));
            }
            _ => return Err(self.error("expected 'digraph'")),
        }

        let name = match self.peek() {
            Some(Token::LBrace) => None,
            _ => Some(self.expect_id("graph id")?),
        };
        self.expect(&Token::LBrace, "'{'")?;

        let mut topology = DependencyTopology::empty(name);
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Semicolon) => self.pos += 1,
                Some(_) => self.parse_statement(&mut topology)?,
                None => return Err(self.error("expected '}'")),
            }
        }

        if self.peek().is_some() {
            return Err(self.error("unexpected content after graph body"));
        }
        Ok(topology)
    }

    fn parse_statement(&mut self, topology: &mut DependencyTopology) -> Result<(), CriticError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("expected statement"));
        };

        if token.is_keyword("subgraph") || token == Token::LBrace {
            return Err(self.error("subgraphs are not supported"));
        }
        if ["graph", "node", "edge"].iter().any(|k| token.is_keyword(k)) {
            self.pos += 1;
            // Default attributes carry no topology.
            self.parse_attributes()?;
            return Ok(());
        }

        let head = self.expect_id("node id")?;

        if self.peek() == Some(&Token::Equals) {
            self.pos += 1;
            self.expect_id("attribute value")?;
            return Ok(());
        }

        let mut chain = vec![head];
        loop {
            match self.peek() {
                Some(Token::Arrow) => {
                    self.pos += 1;
                    chain.push(self.expect_id("edge target")?);
                }
                Some(Token::UndirectedEdge) => {
                    return Err(self.error("undirected edges are not supported"));
                }
                _ => break,
            }
        }

        let attributes = self.parse_attributes()?;

        if chain.len() == 1 {
            topology.ensure_node(&chain[0]);
            return Ok(());
        }

        let weight = match attributes.get("weight") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| self.error(format!("invalid edge weight '{raw}'")))?,
            None => DEFAULT_EDGE_WEIGHT,
        };

        for pair in chain.windows(2) {
            topology.add_dependency(&pair[0], &pair[1], weight)?;
        }
        Ok(())
    }

    /// Parse zero or more `[a=b, c=d]` lists, last value per key wins.
    fn parse_attributes(&mut self) -> Result<HashMap<String, String>, CriticError> {
        let mut attributes = HashMap::new();
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            loop {
                match self.peek() {
                    Some(Token::RBracket) => {
                        self.pos += 1;
                        break;
                    }
                    Some(Token::Comma | Token::Semicolon) => self.pos += 1,
                    Some(_) => {
                        let key = self.expect_id("attribute name")?;
                        self.expect(&Token::Equals, "'='")?;
                        let value = self.expect_id("attribute value")?;
                        attributes.insert(key, value);
                    }
                    None => return Err(self.error("expected ']'")),
                }
            }
        }
        Ok(attributes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
