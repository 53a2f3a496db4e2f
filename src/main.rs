#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    copyforge::server::run().await
}
