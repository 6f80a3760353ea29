use std::fmt;

/// One aircraft identifier to look for on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub name: String,
    pub description: String,
}

impl WatchlistEntry {
    pub fn new(name: impl AsRef<str>, description: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            description: description.as_ref().trim().to_string(),
        }
    }
}

/// A watchlist entry whose name was found in the page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub name: String,
    pub description: String,
}

impl From<&WatchlistEntry> for MatchResult {
    fn from(entry: &WatchlistEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}, {}", self.name, self.description)
        }
    }
}

pub const ALERT_HEADER: &str = "✈️ ALERT! Found aircraft:";

/// The single message sent for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage(String);

impl AlertMessage {
    pub fn compose(matches: &[MatchResult], source_url: &str) -> Self {
        let lines = matches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        let mut text = String::with_capacity(ALERT_HEADER.len() + lines.len() + source_url.len() + 16);
        text.push_str(ALERT_HEADER);
        text.push_str("\n\n");
        text.push_str(&lines);
        text.push_str("\n\nCheck now: ");
        text.push_str(source_url);
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_fields_are_trimmed() {
        let entry = WatchlistEntry::new("  Beluga ", "\tTransport ");
        assert_eq!(entry.name, "Beluga");
        assert_eq!(entry.description, "Transport");
    }

    #[test]
    fn match_line_omits_empty_description() {
        let with = MatchResult::from(&WatchlistEntry::new("Beluga", "Transport"));
        let without = MatchResult::from(&WatchlistEntry::new("A3ST", ""));
        assert_eq!(with.to_string(), "Beluga, Transport");
        assert_eq!(without.to_string(), "A3ST");
    }

    #[test]
    fn alert_message_layout() {
        let matches = vec![
            MatchResult::from(&WatchlistEntry::new("Beluga", "Transport")),
            MatchResult::from(&WatchlistEntry::new("A3ST", "")),
        ];
        let message = AlertMessage::compose(&matches, "https://example.test/live");
        assert_eq!(
            message.as_str(),
            "✈️ ALERT! Found aircraft:\n\nBeluga, Transport\nA3ST\n\nCheck now: https://example.test/live"
        );
    }
}
