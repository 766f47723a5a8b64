use std::collections::BTreeMap;
use std::time::Duration;

/// Request shape for every upload issued by an `Uploader`.
///
/// The form fields, headers and field name are passed through to the
/// transport untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub endpoint: String,
    /// Multipart field name for the file part.
    pub field_name: String,
    /// Extra multipart text fields.
    pub fields: BTreeMap<String, String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Send and store cookies for this endpoint.
    pub with_credentials: bool,
    /// When false, only the first file of a batch is processed.
    pub allow_multiple: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            endpoint: "/".to_string(),
            field_name: "file".to_string(),
            fields: BTreeMap::new(),
            headers: BTreeMap::new(),
            with_credentials: false,
            allow_multiple: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestSettings {
    /// Quiet period after the last keystroke before a fetch is issued.
    pub debounce: Duration,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}
