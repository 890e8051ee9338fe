//! Narrow UI port the dispatch and recording layers render through.

use crate::messages::{AudioAttachment, ImageData, Sender};

/// The rendering surface for conversation output.
///
/// The egui-backed adapter ([`crate::ui::SharedView`]) is one implementation;
/// tests substitute an in-memory one. Implementations append to the visible
/// list and keep the newest entry in view.
pub trait ChatView: Send + Sync {
    /// Append a text message tagged with the sender's role.
    fn append_message(&self, sender: Sender, text: String);

    /// Append a playable audio control. When the attachment's `autoplay`
    /// flag is set, playback starts immediately; a missing output device is
    /// logged, not an error.
    fn append_audio(&self, sender: Sender, audio: AudioAttachment);

    /// Append a locally displayed image.
    fn append_image(&self, image: ImageData);

    /// Reflect the recording controller's state in the toggle affordance.
    fn set_recording_indicator(&self, active: bool);

    /// Clear the text input field.
    fn clear_input(&self);
}
