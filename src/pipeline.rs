use chrono::Local;
use tracing::{error, info};

use crate::matcher::find_matches;
use crate::models::MatchResult;
use crate::notifier::{AlertTransport, Delivery, notify};
use crate::scraper::{PageFetcher, extract_visible_text};
use crate::watchlist::WatchlistProvider;

/// Result of one check, for callers that want more than the log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    FetchFailed,
    NoMatches,
    Alerted {
        matches: Vec<MatchResult>,
        delivery: Delivery,
    },
}

/// Loader -> fetcher -> matcher -> notifier, run once.
pub struct Pipeline<'a> {
    target_url: &'a str,
    watchlist: &'a dyn WatchlistProvider,
    fetcher: &'a dyn PageFetcher,
    transport: &'a dyn AlertTransport,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        target_url: &'a str,
        watchlist: &'a dyn WatchlistProvider,
        fetcher: &'a dyn PageFetcher,
        transport: &'a dyn AlertTransport,
    ) -> Self {
        Self {
            target_url,
            watchlist,
            fetcher,
            transport,
        }
    }

    pub fn run(&self) -> CheckOutcome {
        let entries = self.watchlist.load();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        info!("[{}] Checking for: {:?}", Local::now().format("%H:%M"), names);

        let html = match self.fetcher.fetch(self.target_url) {
            Ok(html) => html,
            Err(e) => {
                error!("Error reaching site: {}", e);
                return CheckOutcome::FetchFailed;
            }
        };

        let page_text = extract_visible_text(&html);
        let matches = find_matches(&page_text, &entries);
        let delivery = notify(&matches, self.target_url, self.transport);

        if matches.is_empty() {
            CheckOutcome::NoMatches
        } else {
            CheckOutcome::Alerted { matches, delivery }
        }
    }
}
