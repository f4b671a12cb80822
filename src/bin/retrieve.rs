use pdfrag::diagnostics::format_hit;
use pdfrag::retrieval::{Answer, RetrievalPipeline};
use pdfrag::state::AppState;

const QUESTIONS: [&str; 2] = [
    "When did MongoDB begin supporting multi-document transactions?",
    "Why is the sky blue?",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize("retrieve")?;
    let generator = state.generator()?;
    let embedder = state.load_embedder().await?;
    let store = state.connect_store().await?;

    let result = async {
        let mut pipeline = RetrievalPipeline::new(&embedder, &store, &state.config.retrieval)?;
        if let Some(generator) = generator.as_deref() {
            pipeline = pipeline.with_generator(generator);
        }

        for (i, question) in QUESTIONS.iter().enumerate() {
            if i > 0 {
                println!("{}", "=".repeat(57));
            }
            println!("Running query: {}", question);
            match pipeline.answer(question).await? {
                Answer::Generated(text) => println!("{}", text),
                Answer::Documents(hits) => {
                    for (position, hit) in hits.iter().enumerate() {
                        println!("{}", format_hit(position + 1, hit, 500));
                    }
                }
            }
        }
        Ok::<_, pdfrag::core::errors::RagError>(())
    }
    .await;
    store.close().await;

    result?;
    Ok(())
}
