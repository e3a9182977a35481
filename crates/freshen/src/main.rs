use clap::Parser;

use crate::cli::App;

mod cli;
mod dirs;
mod logging;
mod settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    logging::init(app.verbose)?;
    app.run().await
}
