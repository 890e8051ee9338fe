pub mod storage;
pub mod types;

pub use storage::MessageStorage;
pub use types::{
    AudioAttachment, AudioClip, AudioSource, ImageData, Message, MessageContent, Sender,
};
