use pdfrag::diagnostics::format_hit;
use pdfrag::retrieval::RetrievalPipeline;
use pdfrag::state::AppState;

const QUESTION: &str = "Provide skills of the person.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize("retrieve_simple")?;

    println!("Loading embeddings model...");
    let embedder = state.load_embedder().await?;
    println!("Connecting to MongoDB Atlas...");
    let store = state.connect_store().await?;

    println!("Running query: {}", QUESTION);
    let result = async {
        let pipeline = RetrievalPipeline::new(&embedder, &store, &state.config.retrieval)?;
        println!("\nSearching for: {}", QUESTION);
        pipeline.retrieve(QUESTION).await
    }
    .await;
    store.close().await;

    let hits = result?;
    println!("\nFound {} relevant documents:", hits.len());
    println!("{}", "=".repeat(80));
    for (position, hit) in hits.iter().enumerate() {
        println!("{}", format_hit(position + 1, hit, 500));
    }
    Ok(())
}
