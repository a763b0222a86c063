use oxiri::Iri;
use rio_api::model::{Literal, Subject, Term as RioTerm, Triple as RioTriple};
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::graph::{Term, Triple, TripleGraph};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("No parser available for {0} input")]
    ParserUnavailable(OntologyFormat),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Syntax error: {0}")]
    Syntax(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OntologyFormat {
    Turtle,
    NTriples,
}

impl OntologyFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" | "ntriples" => Some(Self::NTriples),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/turtle" | "application/x-turtle" => Some(Self::Turtle),
            "application/n-triples" => Some(Self::NTriples),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> ParseResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ParseError::UnsupportedFormat("no extension".into()))?;

        Self::from_extension(ext).ok_or_else(|| ParseError::UnsupportedFormat(ext.into()))
    }

    /// Format named by the extension; anything unrecognised is read as Turtle.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        Self::from_path(path).unwrap_or(Self::Turtle)
    }
}

impl std::fmt::Display for OntologyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Turtle => f.write_str("turtle"),
            Self::NTriples => f.write_str("n-triples"),
        }
    }
}

#[async_trait::async_trait]
pub trait OntologyParser: Send + Sync {
    fn supported_formats(&self) -> &[OntologyFormat];

    fn can_parse(&self, format: OntologyFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    /// Relative IRIs in the document resolve against `base_iri` when given.
    async fn parse_bytes(
        &self,
        data: &[u8],
        format: OntologyFormat,
        base_iri: Option<&str>,
    ) -> ParseResult<TripleGraph>;

    /// Checks parser availability before the file is touched, then existence.
    /// The file's own `file://` URL is the base for relative IRIs.
    async fn parse_file(&self, path: &Path) -> ParseResult<TripleGraph> {
        let format = OntologyFormat::detect(path);

        if !self.can_parse(format) {
            return Err(ParseError::ParserUnavailable(format));
        }

        if !tokio::fs::try_exists(path).await? {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }

        let absolute = tokio::fs::canonicalize(path).await?;
        let base = url::Url::from_file_path(&absolute).ok().map(String::from);
        if base.is_none() {
            tracing::warn!(path = %absolute.display(), "no file URL for path");
        }

        let data = tokio::fs::read(path).await?;
        self.parse_bytes(&data, format, base.as_deref()).await
    }
}

/// Turtle and N-Triples parsing backed by `rio_turtle`.
pub struct TurtleParser;

impl TurtleParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TurtleParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OntologyParser for TurtleParser {
    fn supported_formats(&self) -> &[OntologyFormat] {
        &[OntologyFormat::Turtle, OntologyFormat::NTriples]
    }

    async fn parse_bytes(
        &self,
        data: &[u8],
        format: OntologyFormat,
        base_iri: Option<&str>,
    ) -> ParseResult<TripleGraph> {
        std::str::from_utf8(data).map_err(|e| ParseError::Encoding(e.to_string()))?;

        let graph = match format {
            OntologyFormat::Turtle => parse_turtle(data, base_iri)?,
            OntologyFormat::NTriples => parse_ntriples(data)?,
        };

        tracing::debug!(
            triples = graph.len(),
            namespaces = graph.namespaces().len(),
            "parsed {format} document"
        );
        Ok(graph)
    }
}

fn parse_turtle(data: &[u8], base_iri: Option<&str>) -> ParseResult<TripleGraph> {
    let base = base_iri
        .map(|base| {
            Iri::parse(base.to_string())
                .map_err(|e| ParseError::Syntax(format!("invalid base IRI <{base}>: {e}")))
        })
        .transpose()?;

    let mut graph = TripleGraph::new();
    let mut parser = rio_turtle::TurtleParser::new(data, base);

    parser
        .parse_all(&mut |triple| {
            if let Some(triple) = convert_triple(&triple) {
                graph.insert(triple);
            }
            Ok(()) as Result<(), TurtleError>
        })
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    for (prefix, iri) in parser.prefixes() {
        graph.add_namespace(prefix.clone(), iri.clone());
    }

    Ok(graph)
}

fn parse_ntriples(data: &[u8]) -> ParseResult<TripleGraph> {
    let mut graph = TripleGraph::new();
    let mut parser = NTriplesParser::new(data);

    parser
        .parse_all(&mut |triple| {
            if let Some(triple) = convert_triple(&triple) {
                graph.insert(triple);
            }
            Ok(()) as Result<(), TurtleError>
        })
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    Ok(graph)
}

/// Quoted (RDF-star) triples carry no ontology structure and are skipped.
fn convert_triple(triple: &RioTriple<'_>) -> Option<Triple> {
    let subject = match triple.subject {
        Subject::NamedNode(n) => Term::Iri(n.iri.to_string()),
        Subject::BlankNode(n) => Term::BlankNode(n.id.to_string()),
        Subject::Triple(_) => return None,
    };

    let object = match triple.object {
        RioTerm::NamedNode(n) => Term::Iri(n.iri.to_string()),
        RioTerm::BlankNode(n) => Term::BlankNode(n.id.to_string()),
        RioTerm::Literal(Literal::Simple { value }) => Term::literal(value),
        RioTerm::Literal(Literal::LanguageTaggedString { value, language }) => Term::Literal {
            value: value.to_string(),
            datatype: None,
            language: Some(language.to_string()),
        },
        RioTerm::Literal(Literal::Typed { value, datatype }) => Term::Literal {
            value: value.to_string(),
            datatype: Some(datatype.iri.to_string()),
            language: None,
        },
        RioTerm::Triple(_) => return None,
    };

    Some(Triple::new(subject, triple.predicate.iri, object))
}

pub struct CompositeParser {
    parsers: Vec<Box<dyn OntologyParser>>,
}

impl CompositeParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn OntologyParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn add_parser(&mut self, parser: Box<dyn OntologyParser>) {
        self.parsers.push(parser);
    }

    fn find_parser(&self, format: OntologyFormat) -> Option<&dyn OntologyParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(format))
            .map(AsRef::as_ref)
    }
}

impl Default for CompositeParser {
    fn default() -> Self {
        Self::new().with_parser(Box::new(TurtleParser::new()))
    }
}

#[async_trait::async_trait]
impl OntologyParser for CompositeParser {
    fn supported_formats(&self) -> &[OntologyFormat] {
        &[OntologyFormat::Turtle, OntologyFormat::NTriples]
    }

    fn can_parse(&self, format: OntologyFormat) -> bool {
        self.find_parser(format).is_some()
    }

    async fn parse_bytes(
        &self,
        data: &[u8],
        format: OntologyFormat,
        base_iri: Option<&str>,
    ) -> ParseResult<TripleGraph> {
        let parser = self
            .find_parser(format)
            .ok_or(ParseError::ParserUnavailable(format))?;

        parser.parse_bytes(data, format, base_iri).await
    }
}
