use anyhow::Result;
use eval_form_submit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    eval_form_submit::logger::init();

    let config = Config::from_env();

    let app = App::initialize(config).await?;
    app.run().await?;

    Ok(())
}
