use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    /// Non-2xx response. `body` is already truncated.
    #[error("Upload failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Upload error: {0}")]
    Network(#[from] reqwest::Error),
}

impl UploadError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Status { status, .. } => Some(*status),
            UploadError::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }
}
