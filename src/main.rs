use {color_eyre::eyre::Result, tagcomplete::app::TcApp};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    if let Some(app) = TcApp::init().await? {
        app.run().await?;
    }

    Ok(())
}
