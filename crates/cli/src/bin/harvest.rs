use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    harvest_cli::main_entry().await
}
