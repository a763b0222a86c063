use std::path::Path;

use anyhow::Result;

use super::PipelineArgs;

pub async fn run(path: &Path, args: &PipelineArgs, pretty: bool) -> Result<()> {
    let pipeline = args.pipeline()?;
    let output = pipeline.process_file(path).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&output.model)?
    } else {
        serde_json::to_string(&output.model)?
    };
    println!("{json}");

    Ok(())
}
