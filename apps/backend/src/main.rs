#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skilldrill_backend::run().await
}
