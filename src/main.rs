mod cli;
mod domain;
mod ledger;
mod store;

use std::env;

use crate::cli::Shell;
use crate::ledger::Ledger;
use crate::store::TextFileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // log to stderr so the interactive menu on stdout stays readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let data_dir = env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let store = TextFileStore::new(data_dir)?;
    let ledger = Ledger::load(store)?;

    Shell::new(ledger).run().await?;
    Ok(())
}
