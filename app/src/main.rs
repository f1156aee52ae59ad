//! Headless clipboard overlay driven from the terminal.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clip_pop_lib::run().await
}
