use std::path::Path;

use anyhow::Result;
use ontolayer_core::model::LayerCounts;
use ontolayer_core::{ClassifiedModel, Layer};

use super::PipelineArgs;

pub async fn run(path: &Path, args: &PipelineArgs) -> Result<()> {
    let pipeline = args.pipeline()?;
    let output = pipeline.process_file(path).await?;
    let model = &output.model;

    print_extraction(model);
    print_layers(model);

    if let Some(analysis) = &model.analysis {
        println!(
            "Framework: {} (coverage {:.1}%, readiness {})",
            analysis.framework, analysis.coverage_percentage, analysis.readiness
        );
        if !analysis.codes_found.is_empty() {
            println!("  Codes: {}", analysis.codes_found.join(", "));
        }
    }

    println!("Bundles: {}", output.payloads.summary.episodes);
    Ok(())
}

fn print_extraction(model: &ClassifiedModel) {
    let stats = &model.statistics;

    println!(
        "Ontology: {}",
        model.metadata.uri.as_deref().unwrap_or("(undeclared)")
    );
    if let Some(title) = &model.metadata.title {
        println!("  Title: {title}");
    }
    println!("Triples: {}", stats.total_triples);
    println!("Namespaces: {}", stats.namespaces);
    println!("Classes: {}", stats.classes);
    println!(
        "Properties: {} (object {}, datatype {}, annotation {})",
        stats.properties(),
        stats.object_properties,
        stats.datatype_properties,
        stats.annotation_properties
    );
    println!("Individuals: {}", stats.individuals);
    println!("Relationships: {}", stats.relationships);
}

fn print_layers(model: &ClassifiedModel) {
    let layers = &model.layer_statistics;

    println!("Layers:");
    for layer in [Layer::Business, Layer::Technical, Layer::Core] {
        print_counts(layer.as_str(), layers.layer(layer));
    }
    print_counts("multi-layer", &layers.multi_layer);
}

fn print_counts(label: &str, counts: &LayerCounts) {
    println!(
        "  {label}: {} (classes {}, properties {}, individuals {})",
        counts.total, counts.classes, counts.properties, counts.individuals
    );
}
