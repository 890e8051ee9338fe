pub mod api;
pub mod history;
pub mod http;

pub use api::{ChatBackend, ChatReply, HistoryPayload};
pub use history::HistoryEntry;
pub use http::HttpBackend;
