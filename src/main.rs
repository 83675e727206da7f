#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wikisearch::run().await
}
