use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use console::style;
use ontolayer_core::sink::{SinkReceipt, SinkResult};
use ontolayer_core::{KnowledgeSink, OntologyImporter, PayloadBundle};

use super::PipelineArgs;

/// Writes each episode to stdout as one JSON line instead of submitting it.
struct StdoutSink;

#[async_trait::async_trait]
impl KnowledgeSink for StdoutSink {
    async fn submit(&self, episode: &PayloadBundle) -> SinkResult<SinkReceipt> {
        let line = serde_json::to_string(episode)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")?;
        Ok(SinkReceipt::new(&episode.name))
    }
}

pub async fn run(paths: &[PathBuf], args: &PipelineArgs) -> Result<()> {
    let pipeline = args.pipeline()?;
    let importer = OntologyImporter::new(Arc::new(StdoutSink));

    let mut outputs = Vec::new();
    let mut failed = 0;

    for path in paths {
        if path.is_dir() {
            let batch = pipeline.process_directory(path).await?;
            failed += batch.failure_count();
            for (file, error) in &batch.failed {
                eprintln!("{} {}: {error}", style("✗").red().bold(), file.display());
            }
            outputs.extend(batch.successful);
        } else {
            match pipeline.process_file(path).await {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    eprintln!("{} {}: {e}", style("✗").red().bold(), path.display());
                    failed += 1;
                }
            }
        }
    }

    let mut submitted = 0;
    for output in &outputs {
        let report = importer.import(&output.payloads).await;
        let name = output
            .path
            .as_ref()
            .map_or_else(|| "(input)".to_string(), |p| p.display().to_string());

        eprintln!(
            "{} {name}: {} of {} episodes, {} entities",
            style("✓").green(),
            report.succeeded(),
            report.attempted(),
            output.entity_count()
        );
        for failure in report.failures() {
            eprintln!(
                "  {} {}: {}",
                style("✗").red(),
                failure.name,
                style(failure.error.as_deref().unwrap_or("unknown error")).dim()
            );
        }

        submitted += report.succeeded();
        failed += report.failed();
    }

    eprintln!("Submitted {submitted} episodes from {} files", outputs.len());

    if failed > 0 {
        bail!("{failed} failure(s) during import");
    }
    Ok(())
}
