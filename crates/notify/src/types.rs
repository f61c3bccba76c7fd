use serde::Serialize;

/// Body of a `sendMessage` call.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'static str,
}

/// Which Bot API method carries an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentMethod {
    Photo,
    Document,
}

impl AttachmentMethod {
    pub fn for_content_type(content_type: &str) -> Self {
        if sharebox_core::notify::is_photo(content_type) {
            Self::Photo
        } else {
            Self::Document
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Document => "sendDocument",
        }
    }

    /// Multipart field holding the file.
    pub fn field(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Document => "document",
        }
    }
}
