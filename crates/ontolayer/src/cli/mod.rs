pub mod classify;
pub mod import;
pub mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use ontolayer_core::{OntologyPipeline, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "ontolayer",
    about = "Ontology extraction and semantic layer classification",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the classified entity model as JSON
    Classify {
        /// Turtle or N-Triples file
        path: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Show extraction and layer statistics
    Stats {
        /// Turtle or N-Triples file
        path: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Build payload bundles and submit them (dry run, one JSON line per episode)
    Import {
        /// Ontology file(s) or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Overrides for values otherwise read from `ONTOLAYER_*` variables.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Domain enhancer: governance (cobit5) or laboratory (iso17025)
    #[arg(short = 'f', long)]
    pub framework: Option<String>,
    /// Framework name used in bundle names
    #[arg(long)]
    pub framework_name: Option<String>,
    /// Target knowledge-base group
    #[arg(short = 'g', long)]
    pub group_id: Option<String>,
    /// JSON file replacing the built-in classifier lexicon
    #[arg(long)]
    pub lexicon: Option<PathBuf>,
    /// Relationship references needed for the core layer
    #[arg(long)]
    pub relationship_threshold: Option<usize>,
}

impl PipelineArgs {
    pub fn config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::from_env()?;

        if let Some(framework) = &self.framework {
            config = config.with_framework(framework.parse()?);
        }
        if let Some(name) = &self.framework_name {
            config = config.with_framework_name(name);
        }
        if let Some(group_id) = &self.group_id {
            config = config.with_group_id(group_id);
        }
        if let Some(path) = &self.lexicon {
            config = config.with_lexicon_path(path);
        }
        if let Some(threshold) = self.relationship_threshold {
            config.relationship_threshold = threshold;
        }

        Ok(config)
    }

    pub fn pipeline(&self) -> Result<OntologyPipeline> {
        let config = self.config()?;
        tracing::debug!(?config, "pipeline configuration");
        Ok(OntologyPipeline::from_config(&config)?)
    }
}
