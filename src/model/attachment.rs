//! Attachments extracted from a message.

/// A binary part that will be uploaded next to the chat post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Derived filename. Never empty: falls back to `"image"`.
    pub filename: String,

    /// Decoded content bytes.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}
