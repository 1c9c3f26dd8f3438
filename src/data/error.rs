/// Failure talking to the market-data provider.
///
/// Clone so one in-flight result can be handed to every waiting caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FeedError::Status(status.as_u16())
        } else if err.is_decode() {
            FeedError::Decode(err.to_string())
        } else {
            FeedError::Transport(err.to_string())
        }
    }
}
