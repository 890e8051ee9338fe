//! Parsing of serialized history entries.

/// One replayed conversation turn from `/chats`.
///
/// Entries arrive as `"<user>|<bot>"`. Only the first two `|`-separated
/// parts are kept, matching the wire format; a missing delimiter leaves the
/// bot half absent and the caller renders it as empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub user: String,
    pub bot: Option<String>,
}

impl HistoryEntry {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('|');
        let user = parts.next().unwrap_or_default().to_string();
        let bot = parts.next().map(str::to_string);
        Self { user, bot }
    }
}
