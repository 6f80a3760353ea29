use encoding_rs::{UTF_8, WINDOWS_1252};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::WatchlistSource;
use crate::error::{AppError, Result};
use crate::models::WatchlistEntry;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes Windows-1252 leaves unassigned.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Used when the local watchlist file does not exist.
pub fn default_watchlist() -> Vec<WatchlistEntry> {
    vec![WatchlistEntry::new("Beluga", ""), WatchlistEntry::new("A3ST", "")]
}

/// Supplies the ordered watchlist for one run. Never fails; problems are logged.
pub trait WatchlistProvider {
    fn load(&self) -> Vec<WatchlistEntry>;
}

impl WatchlistProvider for Vec<WatchlistEntry> {
    fn load(&self) -> Vec<WatchlistEntry> {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with a leading byte-order mark stripped if present.
    Utf8Sig,
    Windows1252,
    Latin1,
}

/// Decode attempts, in preference order.
pub const DECODE_ORDER: [TextEncoding; 3] = [
    TextEncoding::Utf8Sig,
    TextEncoding::Windows1252,
    TextEncoding::Latin1,
];

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Try each encoding in `DECODE_ORDER` until one accepts the bytes.
pub fn decode_table(bytes: &[u8]) -> Result<(TextEncoding, String)> {
    DECODE_ORDER
        .iter()
        .find_map(|&encoding| encoding.decode(bytes).map(|text| (encoding, text)))
        .ok_or(AppError::DecodeError)
}

/// Column 0 is the name, column 1 an optional description. Blank rows and
/// rows without a name are skipped; unreadable rows are logged and skipped.
pub fn parse_entries(text: &str) -> Vec<WatchlistEntry> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row = index + 1, "Skipping unreadable watchlist row: {}", AppError::from(e));
                continue;
            }
        };

        let entry = WatchlistEntry::new(record.get(0).unwrap_or(""), record.get(1).unwrap_or(""));
        if entry.name.is_empty() {
            continue;
        }
        entries.push(entry);
    }

    entries
}

/// Decode raw table bytes and parse them into entries.
pub fn entries_from_bytes(bytes: &[u8]) -> Result<Vec<WatchlistEntry>> {
    let (encoding, text) = decode_table(bytes)?;
    debug!(?encoding, "Decoded watchlist");
    Ok(parse_entries(&text))
}

/// Watchlist read from a CSV file on disk or a raw CSV URL.
pub struct CsvWatchlist {
    source: WatchlistSource,
    client: Client,
}

impl CsvWatchlist {
    pub fn new(source: WatchlistSource, client: Client) -> Self {
        Self { source, client }
    }

    fn load_local(&self, path: &Path) -> Vec<WatchlistEntry> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} not found. Using default list.", path.display());
                return default_watchlist();
            }
            Err(e) => {
                error!("Error reading {}: {}", path.display(), AppError::from(e));
                return Vec::new();
            }
        };

        entries_from_bytes(&bytes).unwrap_or_else(|e| {
            error!("Could not read CSV {}: {}", path.display(), e);
            Vec::new()
        })
    }

    fn load_remote(&self, url: &str) -> Vec<WatchlistEntry> {
        info!(url, "Fetching latest plane list");
        match self.fetch_remote(url).and_then(|bytes| entries_from_bytes(&bytes)) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error reading online CSV: {}", e);
                Vec::new()
            }
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl WatchlistProvider for CsvWatchlist {
    fn load(&self) -> Vec<WatchlistEntry> {
        match &self.source {
            WatchlistSource::LocalFile(path) => self.load_local(path),
            WatchlistSource::Remote(url) => self.load_remote(url),
        }
    }
}
