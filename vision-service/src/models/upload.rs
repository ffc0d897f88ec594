use axum::body::Bytes;

/// Media type assumed when the multipart part declares none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// A file received on `/describe-image`, fully buffered. Lives for one request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub media_type: String,
    pub content: Bytes,
}

impl Upload {
    pub fn new(media_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
