use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Requested node or page \"{page}\" not found{}", detail_suffix(.detail))]
    NotFound { page: String, detail: Option<String> },

    #[error("NLU API error (status {status}): {message}")]
    NluApi { status: u16, message: String },

    #[error("Label API error: {0}")]
    LabelApi(String),

    #[error("Content is empty after text extraction")]
    EmptyContent,

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}
