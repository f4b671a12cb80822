use pdfrag::retrieval::RetrievalPipeline;
use pdfrag::state::AppState;

const QUESTION: &str = "When did MongoDB begin supporting multi-document transactions?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize("demo")?;
    let embedder = state.load_embedder().await?;
    let store = state.connect_store().await?;

    let result = async {
        let pipeline = RetrievalPipeline::new(&embedder, &store, &state.config.retrieval)?;
        pipeline.retrieve(QUESTION).await
    }
    .await;
    store.close().await;

    let documents: Vec<_> = result?.into_iter().map(|hit| hit.document).collect();
    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}
