pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::PenchatApp;
pub use state::{AppState, SharedView};
pub use theme::Theme;
