use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid service-account key: {0}")]
    InvalidKey(String),
    #[error("failed to sign token assertion")]
    Signing,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
