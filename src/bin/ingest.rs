use anyhow::Context;

use pdfrag::core::config::TaggingMode;
use pdfrag::ingest::{build_transformer, IngestionPipeline};
use pdfrag::loader::PdfLoader;
use pdfrag::state::AppState;
use pdfrag::tagging::MetadataSchema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize("ingest")?;
    let config = &state.config;

    let generator = match config.ingest.tagging {
        TaggingMode::Llm => state.generator()?,
        TaggingMode::Placeholder | TaggingMode::Off => None,
    };
    let transformer = build_transformer(
        config.ingest.tagging,
        MetadataSchema::document_default(),
        generator,
    )?;

    let embedder = state.load_embedder().await?;
    let store = state.connect_store().await?;
    let loader = PdfLoader::new(state.resolve(&config.ingest.source_pdf));

    let result = async {
        let mut pipeline = IngestionPipeline::new(&embedder, &store, &config.ingest)?;
        if let Some(transformer) = transformer.as_deref() {
            pipeline = pipeline.with_transformer(transformer);
        }
        pipeline.ingest_pdf(&loader).await
    }
    .await;
    store.close().await;

    let report = result
        .with_context(|| format!("Failed to ingest {}", loader.path().display()))?;
    tracing::info!(
        run = %report.run_id,
        pages = report.pages_kept,
        chunks = report.chunks,
        "Ingestion finished"
    );
    println!(
        "✅ Successfully stored {} documents in MongoDB Atlas",
        report.stored
    );
    Ok(())
}
