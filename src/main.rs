use anyhow::Result;
use glassbox::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let app = Application::new().await?;
    app.run().await?;

    Ok(())
}
