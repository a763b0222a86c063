mod extractor;
mod graph;
mod parser;
mod pipeline;

pub use extractor::{ExtractionError, ExtractionResult, TripleExtractor};
pub use graph::{Term, Triple, TripleGraph};
pub use parser::{
    CompositeParser, OntologyFormat, OntologyParser, ParseError, ParseResult, TurtleParser,
};
pub use pipeline::{BatchResult, OntologyPipeline, PipelineError, PipelineOutput, PipelineResult};
