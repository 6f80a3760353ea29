use once_cell::sync::Lazy;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Request timeout for every client the tracker builds.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                  AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/131.0.0.0 Safari/537.36";

/// Elements whose text never reaches the screen.
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Lowercased `<title>` prefixes served by common anti-bot interstitials.
const CHALLENGE_TITLES: [&str; 4] = [
    "just a moment",
    "attention required",
    "checking your browser",
    "access denied",
];

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

/// Plain client shared by the watchlist loader and the alert transport.
pub fn http_client() -> Result<Client> {
    Ok(Client::builder().timeout(HTTP_TIMEOUT).build()?)
}

/// Retrieves the raw HTML behind a URL.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Single-shot GET with browser-like headers and a cookie jar.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "Fetching page");
        let response = self.client.get(url).send()?;

        let status = response.status();
        let mitigated = response
            .headers()
            .get("cf-mitigated")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("challenge"));

        let html = response.text()?;

        if mitigated || is_challenge_page(&html) {
            return Err(AppError::Challenge(url.to_string()));
        }
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(url, bytes = html.len(), "Fetched page");
        Ok(html)
    }
}

/// True when the document is an anti-bot interstitial rather than real content.
pub fn is_challenge_page(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Some(title) = document.select(&TITLE_SELECTOR).next() else {
        return false;
    };
    let title = title.text().collect::<String>().trim().to_lowercase();
    CHALLENGE_TITLES.iter().any(|marker| title.starts_with(marker))
}

/// Strip all markup and return the text a reader would see, in document order.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }

    text
}
