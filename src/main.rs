#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = learnpath::run().await {
        eprintln!("learnpath fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
