// Vocabulary - headless sync runner
// Entry point: one sync with the persisted settings, then exit

use anyhow::Context;
use vocabulary::app::AppState;
use vocabulary::config::AppConfig;
use vocabulary::logging::{self, LogBuffer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let log_buffer = LogBuffer::global();
    logging::init(&config.log_filter, log_buffer).context("failed to initialize logging")?;

    tracing::info!("Starting vocabulary v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::initialize(config).await?;
    let settings = state.load_settings().await?;
    tracing::info!("Settings: {}", settings);

    let outcome = state.sync(&settings).await?;

    println!("{}", outcome.message);
    for vocabulary in &outcome.vocabularies {
        println!("{} - {}", vocabulary.english_word, vocabulary.foreign_word);
    }

    let about = state.about().await?;
    println!("Last updated: {}", about.last_updated);
    for (language, count) in &about.counts {
        println!("{}: {}", language, count);
    }

    state.close().await;

    let log_path = state.config.log_path();
    log_buffer.flush_to(&log_path).await?;
    log_buffer.close();

    Ok(())
}
