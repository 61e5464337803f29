#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wallet_engine::start(std::env::args()).await
}
