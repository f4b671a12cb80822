use pdfrag::diagnostics::{describe_sample, index_instructions, inspect};
use pdfrag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize("check_db")?;
    let store = state.connect_store().await?;

    let status = inspect(&store).await;
    store.close().await;
    let status = status?;

    println!("Total documents in collection: {}", status.count);
    if status.count == 0 {
        println!("\nNo documents found. Run ingest first!");
        return Ok(());
    }

    if let Some(sample) = &status.sample {
        println!("\nSample document:");
        println!("{}", describe_sample(sample));
    }
    println!();
    println!(
        "{}",
        index_instructions(&state.config.database, state.config.embedding.dimensions)
    );
    Ok(())
}
