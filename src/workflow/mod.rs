// Workflow configuration extraction: turns a pipeline directory into a
// flat key → value map.
mod flat;
mod nextflow;

pub use flat::{FlatConfig, parse_flat_config, unquote};
pub use nextflow::{NextflowCli, StaticConfig};

use std::path::Path;

use anyhow::Result;

/// Produces the flattened configuration of a pipeline.
///
/// An error means the configuration could not be extracted at all; the lint
/// run cannot continue without it.
pub trait WorkflowConfigSource {
    fn fetch(&self, pipeline_dir: &Path) -> Result<FlatConfig>;
}
