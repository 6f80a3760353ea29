pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod notifier;
pub mod pipeline;
pub mod scraper;
pub mod watchlist;

use tracing::error;

use config::Config;
use error::Result;
use notifier::TelegramClient;
use pipeline::{CheckOutcome, Pipeline};
use scraper::{HttpFetcher, http_client};
use watchlist::CsvWatchlist;

/// Run one check with the real HTTP fetcher, CSV watchlist and Telegram transport.
///
/// Returns `None` only when the HTTP clients could not be constructed.
pub fn run(config: &Config) -> Option<CheckOutcome> {
    match build_and_run(config) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("Error during check: {}", e);
            None
        }
    }
}

fn build_and_run(config: &Config) -> Result<CheckOutcome> {
    let client = http_client()?;
    let watchlist = CsvWatchlist::new(config.watchlist.clone(), client.clone());
    let fetcher = HttpFetcher::new()?;
    let transport = TelegramClient::new(&config.telegram, client);

    Ok(Pipeline::new(&config.target_url, &watchlist, &fetcher, &transport).run())
}
