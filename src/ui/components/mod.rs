mod input_bar;
mod message_list;

pub use input_bar::InputBar;
pub use message_list::MessageList;
