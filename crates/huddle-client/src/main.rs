#[tokio::main]
async fn main() -> anyhow::Result<()> {
    huddle_client::run().await
}
