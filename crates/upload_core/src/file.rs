use bytes::Bytes;

/// A file handed to the uploader by a file input, a drop, or a caller.
///
/// The content is reference counted, so cloning a `RawFile` never copies the
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    name: String,
    mime_type: Option<String>,
    content: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Lowercased extension including the leading dot, e.g. `.png`.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_ascii_lowercase()))
    }
}
